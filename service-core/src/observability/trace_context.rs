//! Correlation headers for outbound HTTP calls.
//!
//! Every call leaving a service carries the W3C `traceparent` of the current
//! span (https://www.w3.org/TR/trace-context/) and, when the call is made on
//! behalf of an inbound request, that request's `x-request-id`.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Write the current span's context as `traceparent`.
///
/// Nothing is written when the span has no valid context, which is the case
/// whenever OTLP export is off.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let context = Span::current().context();
    let span_context = context.span().span_context().clone();

    if !span_context.is_valid() {
        return;
    }

    // version-trace_id-span_id-trace_flags
    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );

    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }
}

/// [`inject_trace_context`] plus the caller's request id, when there is one.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    inject_trace_context(headers);

    if let Some(value) = request_id.and_then(|id| HeaderValue::from_str(id).ok()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Request id of an inbound request, as set by the request-id middleware.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Outbound request that gets correlation headers when sent.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
    request_id: Option<String>,
}

impl TracedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self {
            request,
            request_id: None,
        }
    }

    /// Forward the inbound request id on this call.
    pub fn request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(str::to_string);
        self
    }

    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.request = self.request.json(json);
        self
    }

    pub fn bearer_auth<T: std::fmt::Display>(mut self, token: T) -> Self {
        self.request = self.request.bearer_auth(token);
        self
    }

    /// Per-request timeout, overriding the client default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.timeout(timeout);
        self
    }

    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, self.request_id.as_deref());

        self.request.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced_get(&self, url: &str) -> TracedRequest;
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_get(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.get(url))
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_span_means_no_traceparent() {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn request_id_is_forwarded() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("req-7"));

        assert_eq!(headers[REQUEST_ID_HEADER], "req-7");
        assert!(!headers.contains_key(TRACEPARENT_HEADER));
    }

    #[test]
    fn unusable_request_id_is_dropped() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("bad\nid"));
        assert!(headers.is_empty());
    }

    #[test]
    fn extracts_inbound_request_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(extract_request_id(&headers).as_deref(), Some("abc-123"));
    }
}
