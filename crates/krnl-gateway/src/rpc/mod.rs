//! RPC method handlers for JSON-RPC API.

pub mod eth;
pub mod krnl;
pub mod net;
pub mod web3;

pub use eth::EthRpc;
pub use krnl::KrnlRpc;
pub use net::NetRpc;
pub use web3::Web3Rpc;

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, ApiResult};
use crate::ports::ExecutionClient;
use crate::relay::{AuthorizationClient, Relayer};
use serde_json::Value;
use std::sync::Arc;

/// Forwards calls to the execution node when proxying is enabled
#[derive(Clone)]
pub struct ExecutionProxy {
    execution: Arc<dyn ExecutionClient>,
    enabled: bool,
}

impl ExecutionProxy {
    pub fn new(execution: Arc<dyn ExecutionClient>, enabled: bool) -> Self {
        Self { execution, enabled }
    }

    pub async fn forward(&self, method: &str, params: Value) -> ApiResult<Value> {
        if !self.enabled {
            return Err(ApiError::method_not_supported(method));
        }
        Ok(self.execution.forward(method, params).await?)
    }
}

/// All RPC handlers
pub struct RpcHandlers {
    pub krnl: KrnlRpc,
    pub eth: EthRpc,
    pub net: NetRpc,
    pub web3: Web3Rpc,
}

impl RpcHandlers {
    pub fn new(
        config: &GatewayConfig,
        relayer: Arc<Relayer>,
        authority: Arc<AuthorizationClient>,
        execution: Arc<dyn ExecutionClient>,
    ) -> Self {
        let proxy = ExecutionProxy::new(execution, config.execution.proxy_enabled);
        Self {
            krnl: KrnlRpc::new(Arc::clone(&relayer), authority),
            eth: EthRpc::new(relayer, proxy.clone()),
            net: NetRpc::new(proxy),
            web3: Web3Rpc::new(config.chain.client_version.clone()),
        }
    }
}
