//! Header utilities for upstream forwarding
//!
//! Client headers pass through to the provider untouched, apart from the
//! hop-by-hop set and the few headers the proxy owns (Host, streaming Accept,
//! anti-buffering hint).

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Hop-by-hop headers that must never be forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Non-standard but widely sent hop-by-hop header
const KEEP_ALIVE: &str = "keep-alive";

/// Tells nginx-style intermediaries not to buffer the response
pub const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

pub const EVENT_STREAM: &str = "text/event-stream";

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name) || name.as_str() == KEEP_ALIVE
}

/// Headers named in the `Connection` header are hop-by-hop for this message too
fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect()
}

/// Build the header set for the upstream request.
///
/// Everything the client sent is kept except hop-by-hop headers; `Host` is
/// replaced with the upstream authority.
pub fn build_upstream_headers(incoming: &HeaderMap, upstream_host: &str) -> HeaderMap {
    let listed = connection_listed(incoming);
    let mut headers = HeaderMap::with_capacity(incoming.len());

    for (name, value) in incoming {
        if is_hop_by_hop_header(name) || listed.contains(name) || *name == header::HOST {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Ok(host) = HeaderValue::from_str(upstream_host) {
        headers.insert(header::HOST, host);
    }

    headers
}

/// Filter hop-by-hop headers from an upstream response
///
/// Used when converting provider responses back to client responses.
pub fn filter_response_headers(response_headers: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(response_headers);
    let mut filtered = HeaderMap::with_capacity(response_headers.len());

    for (name, value) in response_headers {
        if !is_hop_by_hop_header(name) && !listed.contains(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}

/// Content-Type of a header map, or an empty string
pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Whether the headers declare a server-sent event stream
pub fn is_event_stream(headers: &HeaderMap) -> bool {
    content_type(headers).contains(EVENT_STREAM)
}

/// Mark an event-stream response so intermediaries don't buffer it
pub fn apply_anti_buffering(headers: &mut HeaderMap) {
    if is_event_stream(headers) {
        headers.insert(X_ACCEL_BUFFERING, HeaderValue::from_static("no"));
    }
}
