//! HTTP middleware.
//!
//! Layer order: Request → Tracing → Validation → CORS → Handler

pub mod cors;
pub mod metrics;
pub mod tracing;
pub mod validation;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer};
pub use tracing::TracingLayer;
pub use validation::{validate_jsonrpc, ValidationLayer};

use crate::domain::config::GatewayConfig;
use std::sync::Arc;

/// Middleware stack builder
pub struct MiddlewareStack {
    pub validation: ValidationLayer,
    pub tracing: TracingLayer,
    pub cors: tower_http::cors::CorsLayer,
    pub metrics: Arc<GatewayMetrics>,
}

impl MiddlewareStack {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            validation: ValidationLayer::new(config.limits.clone()),
            tracing: TracingLayer::new(),
            cors: create_cors_layer(&config.cors),
            metrics: Arc::new(GatewayMetrics::new()),
        }
    }

    /// Get shared metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }
}
