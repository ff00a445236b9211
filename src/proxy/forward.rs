//! Forwarding engine
//!
//! Rewrites one inbound request onto a provider's upstream and relays the
//! upstream response back chunk by chunk. Nothing is retried: a failure
//! before the response starts becomes a [`ForwardError`], a failure after it
//! started truncates the relayed body.
//!
//! The upstream URI is built as an `http::Uri` and handed to hyper as is, so
//! the path and query reach the provider exactly as the client sent them
//! (no dot-segment removal, no re-encoding).

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, uri::InvalidUri, HeaderValue, Request, Response, Uri, Version};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use super::headers::{
    apply_anti_buffering, build_upstream_headers, content_type, filter_response_headers,
    EVENT_STREAM,
};
use super::logging::RequestContext;
use super::registry::ProviderTarget;
use super::streaming::{body_requests_stream, should_inspect_body};

/// Pooled HTTP/1.1 client used for every upstream call
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the shared upstream client.
///
/// Only connecting is bounded by a timeout; event streams may stay open for
/// minutes. Redirects are never followed.
pub fn build_client(connect_timeout: Duration) -> Result<UpstreamClient, rustls::Error> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(connect_timeout));

    let https = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Ok(Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(100)
        .build(https))
}

/// Errors raised before any response byte reached the client
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("invalid upstream URL: {0}")]
    InvalidTarget(String),

    #[error("{message}")]
    Dispatch { kind: &'static str, message: String },
}

impl ForwardError {
    fn dispatch(err: &hyper_util::client::legacy::Error) -> Self {
        let kind = if err.is_connect() {
            if caused_by_timeout(err) {
                "timeout"
            } else {
                "connect"
            }
        } else {
            "dispatch"
        };

        ForwardError::Dispatch {
            kind,
            message: error_chain(err),
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::RequestBody(_) => "request_body",
            ForwardError::InvalidTarget(_) => "invalid_target",
            ForwardError::Dispatch { kind, .. } => *kind,
        }
    }
}

fn caused_by_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Render an error with all of its sources, outermost first.
///
/// The client's own message only says which stage failed; the cause
/// (connection refused, DNS failure, ...) sits further down the chain.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Upstream path and query for an inbound URI.
///
/// Strips the leading `/<prefix>/<provider>` and keeps the rest byte for
/// byte; an empty remainder becomes `/`.
pub fn rewrite_path(route_prefix: &str, provider: &str, uri: &Uri) -> String {
    let path = uri.path();
    let routed = format!("/{}/{}", route_prefix, provider);

    let rest = match path.strip_prefix(routed.as_str()) {
        Some("") => "/",
        Some(rest) => rest,
        None => path,
    };

    match uri.query() {
        Some(query) => format!("{}?{}", rest, query),
        None => rest.to_string(),
    }
}

/// Forwards requests for any provider through one shared HTTP client
#[derive(Debug, Clone)]
pub struct ForwardingEngine {
    client: UpstreamClient,
    route_prefix: String,
}

impl ForwardingEngine {
    pub fn new(client: UpstreamClient, route_prefix: impl Into<String>) -> Self {
        Self {
            client,
            route_prefix: route_prefix.into(),
        }
    }

    /// Full upstream URL for an inbound URI
    pub fn upstream_url(&self, target: &ProviderTarget, uri: &Uri) -> String {
        format!(
            "{}{}",
            target.origin(),
            rewrite_path(&self.route_prefix, &target.name, uri)
        )
    }

    /// Forward one request to `target` and return the streamed response.
    pub async fn forward(
        &self,
        target: &ProviderTarget,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();
        let mut ctx = RequestContext::new(&target.name, parts.method.as_str(), parts.uri.path());

        let target_url = self.upstream_url(target, &parts.uri);
        let uri: Uri = target_url.parse().map_err(|e: InvalidUri| {
            ForwardError::InvalidTarget(format!("{}: {}", target_url, e))
        })?;

        let mut headers = build_upstream_headers(&parts.headers, &target.host);

        let upstream_body = if should_inspect_body(&parts.method, &parts.headers) {
            // The body is needed twice: once to look for the stream flag and
            // once for the upstream call.
            let bytes: Bytes = body
                .collect()
                .await
                .map_err(ForwardError::RequestBody)?
                .to_bytes();

            ctx = ctx.with_streaming(body_requests_stream(&bytes));
            if ctx.streaming && target.requires_event_stream_accept() {
                headers.insert(header::ACCEPT, HeaderValue::from_static(EVENT_STREAM));
                ctx.log_event_stream_accept();
            }

            Body::from(bytes)
        } else {
            body
        };

        ctx.log_forward(&target_url);

        let mut upstream_request = Request::new(upstream_body);
        *upstream_request.method_mut() = parts.method;
        *upstream_request.uri_mut() = uri;
        *upstream_request.version_mut() = Version::HTTP_11;
        *upstream_request.headers_mut() = headers;

        let upstream = self.client.request(upstream_request).await.map_err(|e| {
            let err = ForwardError::dispatch(&e);
            ctx.log_connection_error(&err.to_string(), &target_url);
            err
        })?;

        Ok(relay_response(upstream, ctx))
    }
}

/// Turn the upstream response into the client response.
///
/// Status and body are relayed verbatim; only hop-by-hop headers are dropped
/// and event streams get the anti-buffering hint.
fn relay_response(upstream: Response<Incoming>, ctx: RequestContext) -> Response<Body> {
    let (parts, body) = upstream.into_parts();

    let transfer_encoding = parts
        .headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    ctx.log_upstream_response(
        parts.status.as_u16(),
        content_type(&parts.headers),
        transfer_encoding,
    );

    let mut headers = filter_response_headers(&parts.headers);
    apply_anti_buffering(&mut headers);

    let mut response = Response::new(Body::from_stream(relay_body(body, ctx)));
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers;
    response
}

/// Yield each upstream chunk as soon as it arrives.
///
/// An upstream error ends the stream with an error, which aborts the
/// client response mid-body.
fn relay_body(
    body: Incoming,
    ctx: RequestContext,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
    async_stream::stream! {
        let chunks = body.into_data_stream();
        futures::pin_mut!(chunks);

        let mut count = 0usize;
        let mut total = 0usize;

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    count += 1;
                    total += bytes.len();
                    yield Ok(bytes);
                }
                Err(e) => {
                    ctx.log_stream_truncated(&error_chain(&e), count);
                    yield Err(io::Error::other(e));
                    return;
                }
            }
        }

        ctx.log_stream_ended(count, total);
    }
}
