//! Streaming-intent detection
//!
//! Decides from the inbound request whether the client asked for a
//! server-sent event response, so the forwarder can adjust headers for
//! providers that need an explicit `Accept: text/event-stream`.

use axum::http::{HeaderMap, Method};
use serde_json::{Map, Value};

use super::headers::content_type;

/// Whether the request body must be read and inspected before forwarding.
///
/// Only JSON POSTs can carry the `stream` flag.
pub fn should_inspect_body(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::POST && content_type(headers).contains("application/json")
}

/// Whether a JSON body carries a top-level `"stream": true`.
///
/// Anything that isn't a JSON object with a boolean `true` there (other
/// value types, invalid JSON, empty bodies) counts as non-streaming. With a
/// repeated key the last occurrence wins.
pub fn body_requests_stream(body: &[u8]) -> bool {
    serde_json::from_slice::<Map<String, Value>>(body)
        .ok()
        .and_then(|object| object.get("stream").and_then(Value::as_bool))
        .unwrap_or(false)
}
