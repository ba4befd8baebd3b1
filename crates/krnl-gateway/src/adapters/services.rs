//! Directive service invokers.
//!
//! [`HttpServiceInvoker`] posts each directive to a single service endpoint
//! that resolves the named service itself. [`LoggingServiceInvoker`] is the
//! fallback when no endpoint is configured: it records the request and
//! accepts it.

use crate::domain::config::ServicesConfig;
use crate::domain::error::{GatewayError, InvocationError};
use crate::domain::types::TransactionContext;
use crate::ports::ServiceInvoker;
use crate::tx::{DecodedTransaction, Directive};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Body posted to the service endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvocationRequest<'a> {
    service: &'a str,
    request: &'a str,
    transaction: TransactionContext,
}

pub struct HttpServiceInvoker {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpServiceInvoker {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| GatewayError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }
}

#[async_trait]
impl ServiceInvoker for HttpServiceInvoker {
    async fn invoke(
        &self,
        directive: &Directive,
        tx: &DecodedTransaction,
    ) -> Result<(), InvocationError> {
        let request = directive
            .as_str()
            .ok_or_else(|| InvocationError::Malformed("directive is not valid UTF-8".into()))?;
        let body = InvocationRequest {
            service: directive.service().unwrap_or_default(),
            request,
            transaction: tx.context(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvocationError::Timeout(self.timeout)
                } else {
                    InvocationError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(service = body.service, status = status.as_u16(), "Service accepted directive");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(InvocationError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Accepts every directive after logging it
#[derive(Debug, Default)]
pub struct LoggingServiceInvoker;

#[async_trait]
impl ServiceInvoker for LoggingServiceInvoker {
    async fn invoke(
        &self,
        directive: &Directive,
        tx: &DecodedTransaction,
    ) -> Result<(), InvocationError> {
        info!(
            index = directive.index(),
            request = %directive.to_string_lossy(),
            hash = %tx.hash_hex(),
            "Service call (no endpoint configured)"
        );
        Ok(())
    }
}

/// Invoker for the given configuration
pub fn service_invoker(config: &ServicesConfig) -> Result<Arc<dyn ServiceInvoker>, GatewayError> {
    Ok(match &config.endpoint {
        Some(endpoint) => Arc::new(HttpServiceInvoker::new(endpoint.clone(), config.timeout)?),
        None => Arc::new(LoggingServiceInvoker),
    })
}
