//! Provider proxy handler
//!
//! Catches everything under `/<prefix>/`, picks the provider from the first
//! path segment and hands the request to the forwarding engine.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    response::Response,
};
use tracing::warn;

use crate::{
    error::AppError,
    routes::metrics::{record_request, record_upstream_error},
    AppState,
};

/// Metrics label for requests whose provider isn't registered
const UNKNOWN_PROVIDER_LABEL: &str = "unknown";

/// Provider segment of a proxied path, if there is one.
///
/// `/<prefix>/<provider>/...` yields `<provider>`; `/<prefix>`,
/// `/<prefix>/` and `/<prefix>//...` yield `None`.
pub fn provider_segment<'a>(route_prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix('/')?.strip_prefix(route_prefix)?;
    let rest = rest.strip_prefix('/')?;

    rest.split('/').next().filter(|provider| !provider.is_empty())
}

/// Forward a request to the provider named in its path
pub async fn proxy_request(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let start_time = Instant::now();

    let provider = provider_segment(&state.config.route_prefix, request.uri().path())
        .map(str::to_string)
        .ok_or_else(|| {
            warn!(path = %request.uri().path(), "Rejecting request without provider");
            AppError::MissingProvider
        })?;

    let target = match state.registry.resolve(&provider) {
        Ok(target) => target,
        Err(e) => {
            warn!(provider = %provider, "Unknown provider requested");
            let err = AppError::from(e);
            record_request(
                UNKNOWN_PROVIDER_LABEL,
                err.status_and_category().0.as_str(),
                start_time.elapsed().as_secs_f64(),
            );
            return Err(err);
        }
    };

    match state.engine.forward(target, request).await {
        Ok(response) => {
            // Measured to the response head; the body may stream much longer
            record_request(
                &provider,
                response.status().as_str(),
                start_time.elapsed().as_secs_f64(),
            );
            Ok(response)
        }
        Err(e) => {
            record_upstream_error(&provider, e.kind());
            let err = AppError::from(e);
            record_request(
                &provider,
                err.status_and_category().0.as_str(),
                start_time.elapsed().as_secs_f64(),
            );
            Err(err)
        }
    }
}
