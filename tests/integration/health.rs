//! Health and metrics endpoint integration tests
//!
//! - GET /health - Liveness with a fixed body
//! - GET /metrics - Prometheus exposition

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::ProxyTestHarness;

#[tokio::test]
async fn test_health_endpoint_returns_fixed_body() {
    let harness = ProxyTestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json, json!({"status": "ok", "service": "llm-proxy"}));
}

#[tokio::test]
async fn test_health_endpoint_accepts_get_only() {
    let harness = ProxyTestHarness::new().await;

    let response = harness.server.post("/health").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_does_not_touch_upstreams() {
    let harness = ProxyTestHarness::new().await;

    harness.server.get("/health").await.assert_status_ok();

    assert!(harness.upstream.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    llm_proxy::routes::metrics::init_metrics();
    let harness = ProxyTestHarness::new().await;
    harness.upstream.mock_list_models().await;

    harness
        .server
        .get("/llm/openai/v1/models")
        .await
        .assert_status_ok();

    let response = harness.server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().contains("llm_proxy_requests_total"));
}
