//! Liveness and readiness endpoint tests

use health_probe::health::{CheckError, CheckSet, HandlerOptions, ProbePaths};
use reqwest::{Method, StatusCode};
use serde_json::json;

use crate::helpers::{assert_header, assert_status, failing, metadata, ok, TestServer};

#[tokio::test]
async fn test_liveness_all_pass() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", ok);
    server.handler.add_liveness_check("cache", ok);

    let response = server.get("/live").await;
    assert_status(&response, StatusCode::OK);
    assert_header(&response, "content-type", "application/json; charset=utf-8");
    assert_eq!(response.text().await.unwrap(), "{}\n");
}

#[tokio::test]
async fn test_liveness_failure_keeps_empty_body() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", failing("timeout"));

    let response = server.get("/live").await;
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);
    assert_header(&response, "content-type", "application/json; charset=utf-8");
    assert_eq!(response.text().await.unwrap(), "{}\n");
}

#[tokio::test]
async fn test_liveness_full_reports_each_check() {
    let server = TestServer::start_with(HandlerOptions {
        metadata: metadata(&[("version", "1.2.3"), ("region", "eu")]),
        ..Default::default()
    })
    .await;
    server.handler.add_liveness_check("db", failing("timeout"));
    server.handler.add_liveness_check("cache", ok);
    server.handler.add_liveness_check("disk", ok);

    let (status, body) = server.get_full("/live?full=1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({
            "checks": {"db": "timeout", "cache": "OK", "disk": "OK"},
            "metadata": {"version": "1.2.3", "region": "eu"}
        })
    );
}

#[tokio::test]
async fn test_full_body_is_indented() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", ok);

    let body = server.get("/live?full=1").await.text().await.unwrap();
    assert_eq!(
        body,
        "{\n    \"checks\": {\n        \"db\": \"OK\"\n    },\n    \"metadata\": {}\n}\n"
    );
}

#[tokio::test]
async fn test_readiness_fails_on_liveness_failure() {
    let server = TestServer::start_with(HandlerOptions {
        metadata: metadata(&[("version", "1.2.3")]),
        ..Default::default()
    })
    .await;
    server.handler.add_liveness_check("db", failing("timeout"));

    let (status, body) = server.get_full("/ready?full=1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({
            "checks": {"db": "timeout"},
            "metadata": {"version": "1.2.3"}
        })
    );
}

#[tokio::test]
async fn test_readiness_merges_both_sets() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("process", ok);
    server.handler.add_readiness_check("queue", ok);

    let (status, body) = server.get_full("/ready?full=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"], json!({"process": "OK", "queue": "OK"}));

    server.handler.add_readiness_check("upstream", failing("connection refused"));
    let (status, body) = server.get_full("/ready?full=1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["upstream"], "connection refused");

    // Liveness is unaffected by readiness failures
    let response = server.get("/live").await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_name_collision() {
    let server = TestServer::start().await;
    server.handler.add_readiness_check("shared", failing("not ready"));
    server.handler.add_liveness_check("shared", ok);

    let (status, body) = server.get_full("/ready?full=1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"], json!({"shared": "OK"}));
}

#[tokio::test]
async fn test_non_get_methods_rejected() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", ok);

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        for path in ["/live", "/ready?full=1"] {
            let response = server.request(method.clone(), path).await;
            assert_status(&response, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.text().await.unwrap().trim_end(), "method not allowed");
        }
    }

    assert_eq!(server.handler.registry().names(CheckSet::Liveness), vec!["db"]);
    assert!(server.handler.registry().is_empty(CheckSet::Readiness));
}

#[tokio::test]
async fn test_full_flag_must_be_one() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", ok);

    for path in ["/live?full=0", "/live?full=true", "/live?details=1"] {
        let body = server.get(path).await.text().await.unwrap();
        assert_eq!(body, "{}\n", "{}", path);
    }
}

#[tokio::test]
async fn test_reregistration_replaces_check() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("db", failing("down"));
    assert_status(&server.get("/live").await, StatusCode::SERVICE_UNAVAILABLE);

    server.handler.add_liveness_check("db", ok);
    let (status, body) = server.get_full("/live?full=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"], json!({"db": "OK"}));
}

#[tokio::test]
async fn test_panicking_check_reported_as_failure() {
    let server = TestServer::start().await;
    server
        .handler
        .add_liveness_check("broken", || -> Result<(), CheckError> { panic!("index out of bounds") });

    let (status, body) = server.get_full("/live?full=1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["broken"], "check panicked: index out of bounds");

    // Server keeps serving afterwards
    assert_status(&server.get("/ready").await, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_custom_paths() {
    let server = TestServer::start_with(HandlerOptions {
        paths: ProbePaths {
            liveness: "/healthz".into(),
            readiness: "/readyz".into(),
        },
        ..Default::default()
    })
    .await;

    assert_status(&server.get("/healthz").await, StatusCode::OK);
    assert_status(&server.get("/readyz").await, StatusCode::OK);
    assert_status(&server.get("/live").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path() {
    let server = TestServer::start().await;
    let response = server.get("/metrics").await;
    assert_status(&response, StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "Not Found");
}
