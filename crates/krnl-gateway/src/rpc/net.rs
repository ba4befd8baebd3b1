//! net JSON-RPC methods.

use super::ExecutionProxy;
use crate::domain::error::{ApiError, ApiResult};
use serde_json::{json, Value};
use tracing::instrument;

/// net RPC methods handler
pub struct NetRpc {
    proxy: ExecutionProxy,
}

impl NetRpc {
    pub fn new(proxy: ExecutionProxy) -> Self {
        Self { proxy }
    }

    /// net_version - Network ID as reported by the execution node
    #[instrument(skip(self))]
    pub async fn version(&self) -> ApiResult<String> {
        match self.proxy.forward("net_version", json!([])).await? {
            Value::String(version) => Ok(version),
            Value::Number(version) => Ok(version.to_string()),
            other => Err(ApiError::internal(format!(
                "unexpected net_version result: {}",
                other
            ))),
        }
    }
}
