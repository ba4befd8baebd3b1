use crate::domain::error::ApiError;
use crate::domain::methods::{get_method_info, MethodHandling, Namespace};
use crate::domain::types::{strip_hex_prefix, TransactionRequest};
use crate::middleware::GatewayMetrics;
use crate::rpc::RpcHandlers;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub rpc_handlers: Arc<RpcHandlers>,
    pub metrics: Arc<GatewayMetrics>,
}

/// Route JSON-RPC method to appropriate handler.
///
/// The method registry decides where a call goes:
/// - Relay: krnl_sendRawTransaction, eth_sendRawTransaction
/// - Authority: krnl_transactionRequest (+ alias), krnl_registerNewDapp
/// - Proxy: read-only eth_* and net_version, forwarded to the node
/// - Local: web3_*
pub async fn route_method(
    state: &AppState,
    method: &str,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    let info = get_method_info(method).ok_or_else(|| ApiError::method_not_found(method))?;
    let handlers = &state.rpc_handlers;

    match info.handling {
        MethodHandling::Relay => {
            let raw_tx: String = parse_param(params, 0)?;
            let hash = match info.namespace {
                Namespace::Krnl => handlers.krnl.send_raw_transaction(&raw_tx).await?,
                _ => handlers.eth.send_raw_transaction(&raw_tx).await?,
            };
            Ok(Value::String(hash))
        }
        MethodHandling::Authority => route_authority(handlers, method, params).await,
        MethodHandling::Proxy => match info.namespace {
            Namespace::Net => handlers.net.version().await.map(Value::String),
            _ => {
                let params = params.cloned().unwrap_or_else(|| json!([]));
                handlers.eth.forward(method, params).await
            }
        },
        MethodHandling::Local => route_web3(handlers, method, params).await,
    }
}

async fn route_authority(
    handlers: &RpcHandlers,
    method: &str,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    match method {
        "krnl_registerNewDapp" => {
            let dapp_name = match param_at(params, 0) {
                Some(Value::Object(obj)) => str_field(obj, "dappName"),
                _ => parse_param::<String>(params, 0)?,
            };
            to_json(handlers.krnl.register_new_dapp(&dapp_name).await?)
        }
        _ => {
            let request = transaction_request_param(params)?;
            to_json(handlers.krnl.transaction_request(request).await?)
        }
    }
}

async fn route_web3(
    handlers: &RpcHandlers,
    method: &str,
    params: Option<&Value>,
) -> Result<Value, ApiError> {
    match method {
        "web3_sha3" => {
            let data: String = parse_param(params, 0)?;
            let bytes = hex::decode(strip_hex_prefix(&data))
                .map_err(|e| ApiError::invalid_params(format!("invalid hex data: {}", e)))?;
            handlers.web3.sha3(&bytes).await.map(Value::String)
        }
        _ => handlers.web3.client_version().await.map(Value::String),
    }
}

/// `[{"accessToken": .., "message": ..}]` or `[accessToken, message]`.
///
/// Absent fields become empty strings so the authorization client reports
/// exactly which one is missing.
fn transaction_request_param(params: Option<&Value>) -> Result<TransactionRequest, ApiError> {
    match param_at(params, 0) {
        Some(Value::Object(obj)) => Ok(TransactionRequest::new(
            str_field(obj, "accessToken"),
            str_field(obj, "message"),
        )),
        Some(Value::String(access_token)) => Ok(TransactionRequest::new(
            access_token.clone(),
            parse_param_optional::<String>(params, 1).unwrap_or_default(),
        )),
        Some(_) => Err(ApiError::invalid_params(
            "expected {accessToken, message} or [accessToken, message]",
        )),
        None => Err(ApiError::invalid_params("Missing parameter at index 0")),
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Positional parameter; a bare object counts as parameter 0.
fn param_at(params: Option<&Value>, index: usize) -> Option<&Value> {
    params.and_then(|p| {
        if p.is_array() {
            p.get(index)
        } else if index == 0 {
            Some(p)
        } else {
            None
        }
    })
}

/// Parse a required parameter from JSON-RPC params.
fn parse_param<T: serde::de::DeserializeOwned>(
    params: Option<&Value>,
    index: usize,
) -> Result<T, ApiError> {
    let param = param_at(params, index).ok_or_else(|| {
        ApiError::invalid_params(format!("Missing parameter at index {}", index))
    })?;

    serde_json::from_value(param.clone()).map_err(|e| {
        ApiError::invalid_params(format!("Invalid parameter at index {}: {}", index, e))
    })
}

/// Parse an optional parameter from JSON-RPC params.
fn parse_param_optional<T: serde::de::DeserializeOwned>(
    params: Option<&Value>,
    index: usize,
) -> Option<T> {
    param_at(params, index).and_then(|v| serde_json::from_value(v.clone()).ok())
}
