//! Outbound ports of the relay pipeline.
//!
//! Both collaborators are reached over the network in production; the relay
//! core only sees these traits.

use crate::domain::error::{InvocationError, RelayError};
use crate::tx::{DecodedTransaction, Directive};
use async_trait::async_trait;

/// Executes one directive against an external service.
///
/// Implementations own service resolution. The dispatcher bounds every call
/// with its own timeout on top of whatever the implementation does.
#[async_trait]
pub trait ServiceInvoker: Send + Sync {
    async fn invoke(
        &self,
        directive: &Directive,
        tx: &DecodedTransaction,
    ) -> Result<(), InvocationError>;
}

/// Execution-layer node.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Submit the transaction. Returns the hash reported by the node.
    async fn send_transaction(&self, tx: &DecodedTransaction) -> Result<String, RelayError>;

    /// Forward an arbitrary JSON-RPC call and return its `result`.
    async fn forward(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RelayError>;
}
