//! Request validation.
//!
//! Rejects oversized bodies, oversized batches and anything that is not a
//! structurally valid JSON-RPC 2.0 request before it reaches a handler.

use crate::domain::config::LimitsConfig;
use crate::domain::error::{codes, ApiError};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Max method name length
const MAX_METHOD_LEN: usize = 256;

#[derive(Clone)]
pub struct ValidationLayer {
    limits: Arc<LimitsConfig>,
}

impl ValidationLayer {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            limits: Arc::new(limits),
        }
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            limits: Arc::clone(&self.limits),
        }
    }
}

#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    limits: Arc<LimitsConfig>,
}

impl<S> Service<Request<Body>> for ValidationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limits = Arc::clone(&self.limits);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Only JSON-RPC calls carry a body worth checking
            if req.method() != Method::POST {
                return inner.call(req).await;
            }

            if let Some(len) = declared_length(&req) {
                if len > limits.max_request_size {
                    warn!(size = len, max = limits.max_request_size, "Request too large");
                    return Ok(error_response(ApiError::limit_exceeded(format!(
                        "request size {} exceeds limit {}",
                        len, limits.max_request_size
                    ))));
                }
            }

            let (parts, body) = req.into_parts();
            let body = match read_body_with_limit(body, limits.max_request_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "Failed to read request body");
                    return Ok(error_response(e));
                }
            };

            if let Err(e) = validate_jsonrpc(&body, &limits) {
                warn!(error = %e, "Invalid JSON-RPC request");
                return Ok(error_response(e));
            }

            inner.call(Request::from_parts(parts, Body::from(body))).await
        })
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<usize> {
    req.headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

async fn read_body_with_limit(body: Body, max_size: usize) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, max_size)
        .await
        .map_err(|e| ApiError::limit_exceeded(format!("failed to read body: {}", e)))
}

/// Validate JSON-RPC request structure (single or batch)
pub fn validate_jsonrpc(body: &[u8], limits: &LimitsConfig) -> Result<(), ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::parse_error(e.to_string()))?;

    match value {
        Value::Object(obj) => validate_single_request(&obj),
        Value::Array(batch) => {
            if batch.is_empty() {
                return Err(ApiError::invalid_request("empty batch"));
            }
            if batch.len() > limits.max_batch_size {
                return Err(ApiError::limit_exceeded(format!(
                    "batch size {} exceeds limit {}",
                    batch.len(),
                    limits.max_batch_size
                )));
            }
            for (idx, item) in batch.iter().enumerate() {
                let obj = item.as_object().ok_or_else(|| {
                    ApiError::invalid_request(format!("batch item {} is not an object", idx))
                })?;
                validate_single_request(obj).map_err(|e| {
                    ApiError::invalid_request(format!("batch item {}: {}", idx, e.message))
                })?;
            }
            Ok(())
        }
        _ => Err(ApiError::invalid_request(
            "request must be an object or array",
        )),
    }
}

fn validate_single_request(obj: &Map<String, Value>) -> Result<(), ApiError> {
    match obj.get("jsonrpc") {
        Some(Value::String(v)) if v == "2.0" => {}
        Some(_) => return Err(ApiError::invalid_request("jsonrpc must be \"2.0\"")),
        None => return Err(ApiError::invalid_request("missing jsonrpc field")),
    }

    match obj.get("method") {
        Some(Value::String(method)) if method.is_empty() => {
            return Err(ApiError::invalid_request("method cannot be empty"))
        }
        Some(Value::String(method)) if method.len() > MAX_METHOD_LEN => {
            return Err(ApiError::invalid_request("method name too long"))
        }
        Some(Value::String(_)) => {}
        Some(_) => return Err(ApiError::invalid_request("method must be a string")),
        None => return Err(ApiError::invalid_request("missing method field")),
    }

    // Stricter id rules are applied per call by the service
    if let Some(id) = obj.get("id") {
        if !matches!(id, Value::String(_) | Value::Number(_) | Value::Null) {
            return Err(ApiError::invalid_request(
                "id must be string, number, or null",
            ));
        }
    }

    if let Some(params) = obj.get("params") {
        if !matches!(params, Value::Array(_) | Value::Object(_)) {
            return Err(ApiError::invalid_request("params must be array or object"));
        }
    }

    Ok(())
}

fn error_response(error: ApiError) -> Response {
    let status = if error.code == codes::LIMIT_EXCEEDED {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    };

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "error": error,
        "id": null
    });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
