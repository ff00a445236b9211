//! Health check endpoint
//!
//! `GET /health` answers as long as the process is serving; it does not
//! probe upstream providers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "llm-proxy";

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: &'static str,
}

/// Liveness endpoint
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: HealthStatus::Ok,
            service: SERVICE_NAME,
        }),
    )
}
