//! Request logging utilities for upstream forwarding
//!
//! Provides structured logging with correlation IDs so every event of one
//! forwarded exchange can be grouped together.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Context for tracking a forwarded request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Provider handling this request
    pub provider: String,
    /// HTTP method
    pub method: String,
    /// Path as the client sent it
    pub original_path: String,
    /// Whether the client asked for an event stream
    pub streaming: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: &str, method: &str, original_path: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            provider: provider.to_string(),
            method: method.to_string(),
            original_path: original_path.to_string(),
            streaming: false,
        }
    }

    /// Mark this as a streaming request
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log the rewrite from the client path to the upstream URL
    pub fn log_forward(&self, target_url: &str) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            method = %self.method,
            path = %self.original_path,
            target = %target_url,
            streaming = %self.streaming,
            "Forwarding request"
        );
    }

    /// Log that the streaming Accept header was injected
    pub fn log_event_stream_accept(&self) {
        debug!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            "Requesting event-stream response from upstream"
        );
    }

    /// Log response headers received from upstream
    pub fn log_upstream_response(&self, status: u16, content_type: &str, transfer_encoding: &str) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            status = %status,
            content_type = %content_type,
            transfer_encoding = %transfer_encoding,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log the end of a relayed response body
    pub fn log_stream_ended(&self, chunks: usize, bytes: usize) {
        debug!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            chunks = %chunks,
            bytes = %bytes,
            elapsed_ms = %self.elapsed_ms(),
            "Response body relayed"
        );
    }

    /// Log an upstream failure after the response started
    pub fn log_stream_truncated(&self, error: &str, chunks: usize) {
        warn!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            chunks = %chunks,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Upstream stream failed, response truncated"
        );
    }

    /// Log a failure that happened before the upstream answered
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }
}
