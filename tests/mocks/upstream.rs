//! Mock LLM provider for testing
//!
//! Wiremock-based stand-in for an upstream provider API. One instance can
//! back several provider names at once, since the proxy only swaps scheme
//! and host.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::upstream::MockUpstream;
//!
//! #[tokio::test]
//! async fn test_with_upstream_mock() {
//!     let upstream = MockUpstream::start().await;
//!     upstream.mock_list_models().await;
//!
//!     // Use upstream.uri() as a provider base URL
//!     // ...
//! }
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// SSE body shaped like an OpenAI chat completion stream
pub const CHAT_COMPLETION_STREAM: &str = concat!(
    "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"!\"}}]}\n\n",
    "data: [DONE]\n\n"
);

/// SSE body shaped like an Anthropic messages stream
pub const MESSAGES_STREAM: &str = concat!(
    "event: message_start\n",
    "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_test\"}}\n\n",
    "event: content_block_delta\n",
    "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
    "event: message_stop\n",
    "data: {\"type\":\"message_stop\"}\n\n"
);

/// Mock provider server wrapper
pub struct MockUpstream {
    server: MockServer,
}

impl MockUpstream {
    /// Start a new mock provider server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Get the mock server address (host:port)
    pub fn address(&self) -> String {
        self.server.address().to_string()
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// The only request received, panicking if there were zero or several
    pub async fn single_request(&self) -> wiremock::Request {
        let mut requests = self.received_requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.remove(0)
    }

    /// Access the underlying server for custom mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Models list
    pub fn models_body() -> Value {
        json!({
            "object": "list",
            "data": [
                {"id": "gpt-4o", "object": "model", "created": 1706745600, "owned_by": "openai"},
                {"id": "gpt-4o-mini", "object": "model", "created": 1706745600, "owned_by": "openai"}
            ]
        })
    }

    /// GET /v1/models
    pub async fn mock_list_models(&self) {
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::models_body()))
            .mount(&self.server)
            .await;
    }

    /// Any request answered with a fixed status and JSON body
    pub async fn mock_any_json(&self, status: u16, body: Value) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// POST `endpoint` answered with an event stream
    pub async fn mock_event_stream(&self, endpoint: &str, body: &'static str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// POST `endpoint` that only matches when `Accept: text/event-stream` was sent
    pub async fn mock_event_stream_requiring_accept(&self, endpoint: &str, body: &'static str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("accept", "text/event-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}
