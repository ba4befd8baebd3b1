//! Request tracing.
//!
//! Every HTTP request runs inside an `api_request` span carrying a fresh
//! request id and, when the caller sent a W3C `traceparent` header, the
//! caller's trace and span ids.

use axum::{body::Body, http::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{field, info_span, Instrument, Span};
use uuid::Uuid;

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let span = info_span!(
            "api_request",
            request_id = %Uuid::new_v4(),
            http.method = %req.method(),
            http.target = %req.uri().path(),
            trace_id = field::Empty,
            parent_span_id = field::Empty,
            http.status = field::Empty,
        );

        if let Some(parent) = TraceParent::from_request(&req) {
            span.record("trace_id", parent.trace_id.as_str());
            span.record("parent_span_id", parent.parent_id.as_str());
        }

        Box::pin(
            async move {
                let result = inner.call(req).await;

                if let Ok(response) = &result {
                    Span::current().record("http.status", response.status().as_u16());
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Parsed W3C `traceparent` header
#[derive(Debug, PartialEq, Eq)]
struct TraceParent {
    trace_id: String,
    parent_id: String,
}

impl TraceParent {
    /// `version-trace_id-parent_id-flags`
    fn from_request<B>(req: &Request<B>) -> Option<Self> {
        let header = req.headers().get("traceparent")?.to_str().ok()?;
        let parts: Vec<&str> = header.split('-').collect();
        if parts.len() != 4 || parts[1].len() != 32 || parts[2].len() != 16 {
            return None;
        }

        Some(Self {
            trace_id: parts[1].to_string(),
            parent_id: parts[2].to_string(),
        })
    }
}
