//! Gateway metrics, exported as JSON on `GET /metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,
    pub write_requests_total: AtomicU64,

    // Relay pipeline
    pub relays_submitted: AtomicU64,
    pub relays_rejected: AtomicU64,
    pub relays_failed: AtomicU64,
    pub decode_failures: AtomicU64,
    pub directives_dispatched: AtomicU64,

    // Token Authority
    pub authorizations_granted: AtomicU64,
    pub authorizations_denied: AtomicU64,

    // Latency
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request
    pub fn record_request(&self, success: bool, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }

        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Transaction reached the execution node
    pub fn record_relay_submitted(&self) {
        self.relays_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// A directive failed, nothing was submitted
    pub fn record_relay_rejected(&self) {
        self.relays_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Submission attempted and failed
    pub fn record_relay_failed(&self) {
        self.relays_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directive_dispatched(&self) {
        self.directives_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a Token Authority answer
    pub fn record_authorization(&self, granted: bool) {
        if granted {
            self.authorizations_granted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.authorizations_denied.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "error": self.requests_error.load(Ordering::Relaxed),
                "writes": self.write_requests_total.load(Ordering::Relaxed),
            },
            "relay": {
                "submitted": self.relays_submitted.load(Ordering::Relaxed),
                "rejected": self.relays_rejected.load(Ordering::Relaxed),
                "failed": self.relays_failed.load(Ordering::Relaxed),
                "decode_failures": self.decode_failures.load(Ordering::Relaxed),
                "directives_dispatched": self.directives_dispatched.load(Ordering::Relaxed),
            },
            "authority": {
                "granted": self.authorizations_granted.load(Ordering::Relaxed),
                "denied": self.authorizations_denied.load(Ordering::Relaxed),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
    is_write: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>, is_write: bool) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            is_write,
        }
    }

    pub fn finish(self, success: bool) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics
            .record_request(success, self.is_write, latency_ms);
    }
}
