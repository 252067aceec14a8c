//! HTTP server for the liveness and readiness endpoints.
//!
//! Plain HTTP/1.1 on hyper, one task per connection. The configured probe
//! paths are dispatched to [`HealthHandler`]; anything else answers 404.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use health_probe::health::HealthHandler;
//!
//! let handler = Arc::new(HealthHandler::default());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:9090").await?;
//! health_probe::server::serve(listener, handler).await?;
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::health::HealthHandler;

/// Serve probe requests on a bound listener until an accept error occurs.
///
/// Checks are synchronous, so every probe runs on tokio's blocking pool and
/// a slow check only holds up its own request.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<HealthHandler>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let handler = Arc::clone(&handler);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let h = Arc::clone(&handler);
                async move { handle_probe_request(req, h).await }
            });

            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(peer = %peer, error = %e, "Probe connection closed with error");
            }
        });
    }
}

/// Route a request to the matching probe endpoint.
async fn handle_probe_request(
    req: Request<IncomingBody>,
    handler: Arc<HealthHandler>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    // Probes carry no body; keep only the head for the blocking task
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts, ());

    let response =
        tokio::task::spawn_blocking(move || handler.route(&req).unwrap_or_else(not_found)).await;

    Ok(response.unwrap_or_else(|e| {
        error!(error = %e, "Probe task failed");
        plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }))
}

fn not_found() -> Response<Full<Bytes>> {
    plain_response(StatusCode::NOT_FOUND, "Not Found")
}

fn plain_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
