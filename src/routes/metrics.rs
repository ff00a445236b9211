//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "llm_proxy_requests_total",
        "Total number of proxied requests"
    );
    metrics::describe_histogram!(
        "llm_proxy_request_duration_seconds",
        "Time until the upstream response head was relayed"
    );
    metrics::describe_counter!(
        "llm_proxy_upstream_errors_total",
        "Requests that failed before the upstream responded"
    );
}

/// Prometheus metrics endpoint handler
///
/// Returns metrics in Prometheus text format for scraping.
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a proxied request
pub fn record_request(provider: &str, status: &str, duration_secs: f64) {
    metrics::counter!(
        "llm_proxy_requests_total",
        "provider" => provider.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("llm_proxy_request_duration_seconds", "provider" => provider.to_string())
        .record(duration_secs);
}

/// Record an upstream failure
pub fn record_upstream_error(provider: &str, kind: &str) {
    metrics::counter!(
        "llm_proxy_upstream_errors_total",
        "provider" => provider.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}
