//! eth JSON-RPC methods.
//!
//! `eth_sendRawTransaction` goes through the relay pipeline so wallets
//! pointed at this node get their directives executed. Everything else is
//! forwarded to the execution node.

use super::ExecutionProxy;
use crate::domain::error::ApiResult;
use crate::relay::Relayer;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// eth RPC methods handler
pub struct EthRpc {
    relayer: Arc<Relayer>,
    proxy: ExecutionProxy,
}

impl EthRpc {
    pub fn new(relayer: Arc<Relayer>, proxy: ExecutionProxy) -> Self {
        Self { relayer, proxy }
    }

    /// eth_sendRawTransaction - Same pipeline as krnl_sendRawTransaction
    #[instrument(skip(self, raw_tx), fields(raw_len = raw_tx.len()))]
    pub async fn send_raw_transaction(&self, raw_tx: &str) -> ApiResult<String> {
        Ok(self.relayer.relay(raw_tx).await?)
    }

    /// Any read-only eth_* method
    #[instrument(skip(self, params))]
    pub async fn forward(&self, method: &str, params: Value) -> ApiResult<Value> {
        self.proxy.forward(method, params).await
    }
}
