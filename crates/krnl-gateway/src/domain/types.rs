//! Wire types exchanged with callers and with the Token Authority.
//!
//! Field names follow the Token Authority's camelCase JSON contract.

use serde::{Deserialize, Serialize};

pub use primitive_types::{H160 as Address, H256 as Hash, U256};

/// Body of `POST <authority>/tx-request`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub access_token: String,
    pub message: String,
}

impl TransactionRequest {
    pub fn new(access_token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            message: message.into(),
        }
    }
}

/// Capability issued by the Token Authority. Opaque to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureToken {
    pub signature_token: String,
    pub hash: String,
}

/// Body of `POST <authority>/register-dapp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDapp {
    pub dapp_name: String,
}

/// Credentials handed out for a newly registered dApp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDapp {
    pub access_token: String,
    pub token_authority_public_key: String,
}

/// Transaction summary forwarded to directive services alongside the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionContext {
    /// 0x-prefixed keccak256 of the raw envelope
    pub hash: String,
    #[serde(rename = "type")]
    pub tx_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub to: Option<Address>,
    pub value: U256,
    /// 0x-prefixed calldata, directives included
    pub input: String,
}

/// Format bytes the way Ethereum JSON-RPC does (`0x` + lowercase hex)
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
