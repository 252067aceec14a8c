//! Test helpers and utilities

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use health_probe::health::{CheckError, HandlerOptions, HealthHandler};
use reqwest::{Client, Method, Response, StatusCode};
use tokio::net::TcpListener;

/// In-process probe server
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub handler: Arc<HealthHandler>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a server with default paths and no metadata
    pub async fn start() -> Self {
        Self::start_with(HandlerOptions::default()).await
    }

    /// Start a server with the given handler options
    pub async fn start_with(options: HandlerOptions) -> Self {
        let handler = Arc::new(HealthHandler::new(options));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(health_probe::server::serve(listener, Arc::clone(&handler)));

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            handler,
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path).await
    }

    /// Make a request with an arbitrary method
    pub async fn request(&self, method: Method, path: &str) -> Response {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET a `?full=1` endpoint and parse the JSON body
    pub async fn get_full(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let response = self.get(path).await;
        let status = response.status();
        let body = response.json().await.expect("Body is not valid JSON");
        (status, body)
    }
}

/// Metadata map from string pairs
pub fn metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn ok() -> Result<(), CheckError> {
    Ok(())
}

pub fn failing(reason: &'static str) -> impl Fn() -> Result<(), CheckError> + Send + Sync {
    move || Err(CheckError::new(reason))
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}
