//! JSON-RPC client for the execution-layer node.

use crate::domain::config::ExecutionConfig;
use crate::domain::error::{GatewayError, RelayError};
use crate::domain::types::to_hex_prefixed;
use crate::ports::ExecutionClient;
use crate::tx::DecodedTransaction;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

pub struct JsonRpcExecutionClient {
    client: Client,
    url: String,
    timeout: Duration,
    request_id: AtomicU64,
}

impl JsonRpcExecutionClient {
    pub fn new(config: &ExecutionConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout: config.timeout,
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RelayError> {
        let id = self.next_id();
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Calling execution node");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let rpc: RpcResponse = match serde_json::from_slice(&bytes) {
            Ok(rpc) => rpc,
            Err(_) if !status.is_success() => {
                return Err(RelayError::Unavailable(format!(
                    "{} answered {}",
                    self.url, status
                )))
            }
            Err(e) => return Err(RelayError::Protocol(e.to_string())),
        };

        if let Some(error) = rpc.error {
            return Err(RelayError::Node {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        if !status.is_success() {
            return Err(RelayError::Unavailable(format!(
                "{} answered {}",
                self.url, status
            )));
        }

        Ok(rpc.result.unwrap_or(Value::Null))
    }

    fn transport_error(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::Timeout(self.timeout)
        } else {
            RelayError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl ExecutionClient for JsonRpcExecutionClient {
    async fn send_transaction(&self, tx: &DecodedTransaction) -> Result<String, RelayError> {
        let result = self
            .call("eth_sendRawTransaction", json!([to_hex_prefixed(&tx.raw)]))
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RelayError::Protocol(format!("expected transaction hash, got {}", result)))
    }

    async fn forward(&self, method: &str, params: Value) -> Result<Value, RelayError> {
        self.call(method, params).await
    }
}
