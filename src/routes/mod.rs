//! HTTP routes for the LLM proxy
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod health;
pub mod metrics;
pub mod proxy;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::{error::AppError, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let prefix = state.config.route_prefix.clone();

    // Bare `/<prefix>` reaches the handler too, so that a missing provider
    // gets the JSON error. `/<prefix>/` can't sit next to the catch-all and
    // is answered by the fallback instead.
    // No compression layer here: it would hold back streamed chunks.
    let proxy_routes = Router::new()
        .route(&format!("/{}", prefix), any(proxy::proxy_request))
        .route(&format!("/{}/*path", prefix), any(proxy::proxy_request));

    // Public routes (health checks, metrics)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(proxy_routes)
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}

/// JSON answer for paths no route matched
async fn fallback(State(state): State<Arc<AppState>>, uri: Uri) -> AppError {
    if uri.path() == format!("/{}/", state.config.route_prefix) {
        AppError::MissingProvider
    } else {
        AppError::RouteNotFound(uri.path().to_string())
    }
}

/// Convert a handler panic into a JSON 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "Request handler panicked");

    AppError::Internal(anyhow::anyhow!(detail)).into_response()
}
