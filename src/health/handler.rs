//! Liveness and readiness HTTP endpoints.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use tracing::debug;

use super::{AggregateStatus, Check, CheckRegistry, CheckResults, ProbeType};

/// Default liveness endpoint path.
pub const DEFAULT_LIVENESS_PATH: &str = "/live";
/// Default readiness endpoint path.
pub const DEFAULT_READINESS_PATH: &str = "/ready";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const EMPTY_BODY: &str = "{}\n";

/// Paths the two probe endpoints are served on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePaths {
    pub liveness: String,
    pub readiness: String,
}

impl Default for ProbePaths {
    fn default() -> Self {
        Self {
            liveness: DEFAULT_LIVENESS_PATH.to_string(),
            readiness: DEFAULT_READINESS_PATH.to_string(),
        }
    }
}

/// Construction options for [`HealthHandler`].
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    /// Static key/value data echoed in every `?full=1` response.
    pub metadata: BTreeMap<String, String>,
    /// Endpoint paths.
    pub paths: ProbePaths,
}

/// Serves liveness and readiness probes over a [`CheckRegistry`].
///
/// The handler owns its registry; checks are added through
/// [`add_liveness_check`](Self::add_liveness_check) and
/// [`add_readiness_check`](Self::add_readiness_check), which are safe to call
/// while probes are being served.
pub struct HealthHandler {
    registry: CheckRegistry,
    paths: ProbePaths,
}

impl HealthHandler {
    pub fn new(options: HandlerOptions) -> Self {
        Self {
            registry: CheckRegistry::new(options.metadata),
            paths: options.paths,
        }
    }

    /// Register (or replace) a liveness check.
    pub fn add_liveness_check(&self, name: impl Into<String>, check: impl Check + 'static) {
        self.registry.add_liveness_check(name, check);
    }

    /// Register (or replace) a readiness check.
    pub fn add_readiness_check(&self, name: impl Into<String>, check: impl Check + 'static) {
        self.registry.add_readiness_check(name, check);
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn paths(&self) -> &ProbePaths {
        &self.paths
    }

    /// Liveness probe: aggregates the liveness checks only.
    pub fn live_endpoint<B>(&self, req: &Request<B>) -> Response<Full<Bytes>> {
        self.handle(req, ProbeType::Liveness)
    }

    /// Readiness probe: aggregates the readiness and liveness checks.
    ///
    /// A service that is not alive is never ready.
    pub fn ready_endpoint<B>(&self, req: &Request<B>) -> Response<Full<Bytes>> {
        self.handle(req, ProbeType::Readiness)
    }

    /// Dispatch a request to the endpoint registered for its path.
    ///
    /// Returns `None` when the path matches neither probe.
    pub fn route<B>(&self, req: &Request<B>) -> Option<Response<Full<Bytes>>> {
        let path = req.uri().path();
        if path == self.paths.liveness {
            Some(self.live_endpoint(req))
        } else if path == self.paths.readiness {
            Some(self.ready_endpoint(req))
        } else {
            None
        }
    }

    fn handle<B>(&self, req: &Request<B>, probe: ProbeType) -> Response<Full<Bytes>> {
        if req.method() != Method::GET {
            return method_not_allowed();
        }

        let mut results = CheckResults::new(self.registry.metadata());
        let mut status = AggregateStatus::Ok;
        for set in probe.check_sets() {
            self.registry.collect_checks(*set, &mut results, &mut status);
        }

        let code = status.status_code();
        debug!(
            target: "probe",
            probe = %probe,
            status = code.as_u16(),
            checks = results.checks.len(),
            failed = results.failed(),
            "Probe completed"
        );

        // Orchestrators only look at the status code, so the body stays
        // empty unless ?full=1 asks for details.
        let body = if query_param(req.uri().query(), "full").as_deref() == Some("1") {
            render_full(&results)
        } else {
            Bytes::from_static(EMPTY_BODY.as_bytes())
        };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = code;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response
    }
}

impl Default for HealthHandler {
    fn default() -> Self {
        Self::new(HandlerOptions::default())
    }
}

/// Pretty-print the results with 4-space indentation and a trailing newline.
///
/// Encoding errors are ignored: the values are plain strings, and whatever was
/// written before a failure is sent as-is.
fn render_full(results: &CheckResults<'_>) -> Bytes {
    let mut buf = Vec::with_capacity(256);
    let formatter = HtmlSafeFormatter(PrettyFormatter::with_indent(b"    "));
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    let _ = results.serialize(&mut ser);
    buf.push(b'\n');
    Bytes::from(buf)
}

/// Pretty formatter that also writes `<`, `>`, `&`, U+2028 and U+2029 as
/// `\uXXXX` escapes, so reasons can be embedded in HTML as-is.
struct HtmlSafeFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for HtmlSafeFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped: &[u8] = match c {
                '<' => b"\\u003c",
                '>' => b"\\u003e",
                '&' => b"\\u0026",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(&fragment.as_bytes()[start..i])?;
            writer.write_all(escaped)?;
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(b"method not allowed\n")));
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// First value of a query parameter, percent-decoded with `+` as space.
fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<Cow<'a, str>> {
    query?
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| decode(k) == key)
        .map(|(_, v)| decode(v))
}

fn decode(s: &str) -> Cow<'_, str> {
    if !s.contains(['%', '+']) {
        return Cow::Borrowed(s);
    }
    let s = s.replace('+', " ");
    Cow::Owned(
        percent_encoding::percent_decode_str(&s)
            .decode_utf8_lossy()
            .into_owned(),
    )
}
