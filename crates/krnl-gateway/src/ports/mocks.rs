//! In-memory port implementations that record every call.

use super::outbound::{ExecutionClient, ServiceInvoker};
use crate::domain::error::{InvocationError, RelayError};
use crate::tx::{DecodedTransaction, Directive};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Service invoker that succeeds unless told otherwise
#[derive(Default)]
pub struct MockServiceInvoker {
    /// Directive text of every invocation, in call order
    pub calls: Mutex<Vec<String>>,
    failures: HashMap<String, InvocationError>,
    delay: Option<Duration>,
}

impl MockServiceInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail invocations of `directive` with `error`
    pub fn failing(mut self, directive: &str, error: InvocationError) -> Self {
        self.failures.insert(directive.to_string(), error);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn invoked(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ServiceInvoker for MockServiceInvoker {
    async fn invoke(
        &self,
        directive: &Directive,
        _tx: &DecodedTransaction,
    ) -> Result<(), InvocationError> {
        let text = directive.to_string_lossy().into_owned();
        self.calls.lock().push(text.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.get(&text) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Execution node that accepts everything unless told otherwise
#[derive(Default)]
pub struct MockExecutionClient {
    /// Raw envelopes of every submission
    pub submissions: Mutex<Vec<Vec<u8>>>,
    /// (method, params) of every forwarded call
    pub forwarded: Mutex<Vec<(String, serde_json::Value)>>,
    failure: Option<RelayError>,
    responses: HashMap<String, serde_json::Value>,
    delay: Option<Duration>,
}

impl MockExecutionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission and forwarded call with `error`
    pub fn failing(mut self, error: RelayError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Canned `result` for a forwarded method
    pub fn with_response(mut self, method: &str, result: serde_json::Value) -> Self {
        self.responses.insert(method.to_string(), result);
        self
    }

    /// Sleep before answering a submission
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

#[async_trait]
impl ExecutionClient for MockExecutionClient {
    async fn send_transaction(&self, tx: &DecodedTransaction) -> Result<String, RelayError> {
        self.submissions.lock().push(tx.raw.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(tx.hash_hex()),
        }
    }

    async fn forward(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RelayError> {
        self.forwarded
            .lock()
            .push((method.to_string(), params.clone()));
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self
            .responses
            .get(method)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }
}
