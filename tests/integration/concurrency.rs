//! Probing while checks are being registered

use std::time::Duration;

use health_probe::health::checks;
use reqwest::StatusCode;

use crate::helpers::{failing, ok, TestServer};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_during_probing() {
    let server = TestServer::start().await;
    server.handler.add_liveness_check("stable", ok);

    let handler = server.handler.clone();
    let writer = tokio::task::spawn_blocking(move || {
        for i in 0..500 {
            let name = format!("flip-{}", i % 8);
            if i % 2 == 0 {
                handler.add_liveness_check(name, ok);
            } else {
                handler.add_readiness_check(name, failing("flaky"));
            }
        }
    });

    let mut probes = Vec::new();
    for i in 0..40 {
        let client = server.client.clone();
        let path = if i % 2 == 0 { "/live?full=1" } else { "/ready?full=1" };
        let url = format!("{}{}", server.base_url, path);
        probes.push(tokio::spawn(async move {
            let response = client.get(url).send().await.expect("Probe failed");
            let status = response.status();
            let body: serde_json::Value = response.json().await.expect("Invalid JSON");
            (status, body)
        }));
    }

    for probe in probes {
        let (status, body) = probe.await.unwrap();
        assert!(
            status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
            "unexpected status {}",
            status
        );
        assert_eq!(body["checks"]["stable"], "OK");
        for value in body["checks"].as_object().unwrap().values() {
            assert!(value == "OK" || value == "flaky", "torn result: {}", value);
        }
    }

    writer.await.unwrap();
    assert_eq!(server.get("/live").await.status(), StatusCode::OK);
    assert_eq!(server.get("/ready").await.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_check_does_not_block_other_connections() {
    let server = TestServer::start().await;
    server.handler.add_readiness_check(
        "slow",
        checks::timeout(
            || -> Result<(), health_probe::CheckError> {
                std::thread::sleep(Duration::from_secs(2));
                Ok(())
            },
            Duration::from_millis(200),
        ),
    );

    let slow = {
        let client = server.client.clone();
        let url = format!("{}/ready?full=1", server.base_url);
        tokio::spawn(async move { client.get(url).send().await.unwrap() })
    };

    // Liveness answers while the readiness probe is waiting on its check
    assert_eq!(server.get("/live").await.status(), StatusCode::OK);

    let response = slow.await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["checks"]["slow"]
        .as_str()
        .unwrap()
        .starts_with("timed out after"));
}
