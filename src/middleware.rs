//! Request pipeline middleware.
//!
//! Two layers wrap the route table:
//!
//! - `json_body_layer` parses size-capped JSON bodies before anything else
//!   runs. Parse failures short-circuit straight to the error response.
//! - `access_log_layer` emits one structured line per request, after the
//!   response body has been fully handed to the connection.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::Instrument;

use crate::config::MAX_JSON_BODY_BYTES;
use crate::error::AppError;

/// Parsed JSON request body, available to handlers as a request extension.
#[derive(Clone, Debug)]
pub struct JsonBody(pub serde_json::Value);

// =============================================================================
// Body Parsing
// =============================================================================

/// Middleware that parses JSON request bodies.
///
/// Only bodies on methods that may carry one and that declare a JSON content
/// type are touched. Bodies over `MAX_JSON_BODY_BYTES`, malformed JSON and
/// top-level scalars are rejected with an `AppError`.
pub async fn json_body_layer(request: Request, next: Next) -> Result<Response, AppError> {
    if !expects_json_body(request.method(), request.headers()) {
        return Ok(next.run(request).await);
    }

    if let Some(length) = declared_length(request.headers()) {
        if length > MAX_JSON_BODY_BYTES {
            return Err(AppError::PayloadTooLarge {
                limit: MAX_JSON_BODY_BYTES,
            });
        }
    }

    let (parts, body) = request.into_parts();
    // Chunked bodies that overrun the limit surface as a read error
    let bytes = axum::body::to_bytes(body, MAX_JSON_BODY_BYTES)
        .await
        .map_err(AppError::BodyRead)?;

    if bytes.is_empty() {
        return Ok(next.run(Request::from_parts(parts, Body::empty())).await);
    }

    let value = parse_strict(&bytes)?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(JsonBody(value));
    Ok(next.run(request).await)
}

/// Parse a body that must be a JSON object or array.
fn parse_strict(bytes: &[u8]) -> Result<serde_json::Value, AppError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if value.is_object() || value.is_array() {
        Ok(value)
    } else {
        Err(AppError::NotComposite)
    }
}

fn expects_json_body(method: &Method, headers: &HeaderMap) -> bool {
    let may_carry_body = matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );
    may_carry_body
        && headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type)
}

/// Matches `application/json` and `application/*+json`, ignoring parameters.
fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

// =============================================================================
// Access Logging
// =============================================================================

/// Middleware that logs one access line per request.
///
/// The line is deferred until the response body is dropped by the
/// connection, so `duration_ms` covers the full response and the timestamp is
/// the finalization time.
pub async fn access_log_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = original_url(request.uri());

    let mut record = AccessRecord {
        method: method.clone(),
        path: path.clone(),
        status: 0,
        ip: client_ip(&request),
        user_agent: request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };

    let span = tracing::info_span!("request", method = %method, path = %path);

    async move {
        let response = next.run(request).await;
        record.status = response.status().as_u16();

        let (parts, body) = response.into_parts();
        Response::from_parts(parts, Body::new(Observed::new(body, record, start)))
    }
    .instrument(span)
    .await
}

/// Path plus query string, exactly as received.
fn original_url(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned())
}

/// Client address, trusting the first `X-Forwarded-For` hop when present.
fn client_ip(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_owned()),
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
    }
}

/// Fields of a single access log line.
#[derive(Debug)]
struct AccessRecord {
    method: Method,
    path: String,
    status: u16,
    ip: Option<String>,
    user_agent: Option<String>,
}

impl AccessRecord {
    fn emit(self, elapsed: Duration) {
        tracing::info!(
            method = %self.method,
            path = %self.path,
            status = self.status,
            duration_ms = elapsed.as_millis() as u64,
            ip = self.ip.as_deref(),
            user_agent = self.user_agent.as_deref()
        );
    }
}

/// Response body wrapper that emits the access line exactly once when dropped.
///
/// The connection drops the body after the last frame is written, or early
/// if the client disconnects; either way the line is logged once.
pub struct Observed {
    inner: Body,
    record: Option<AccessRecord>,
    start: Instant,
}

impl Observed {
    fn new(inner: Body, record: AccessRecord, start: Instant) -> Self {
        Self {
            inner,
            record: Some(record),
            start,
        }
    }
}

impl HttpBody for Observed {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for Observed {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            record.emit(self.start.elapsed());
        }
    }
}
