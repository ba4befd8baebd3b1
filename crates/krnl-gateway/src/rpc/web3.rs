//! web3 JSON-RPC methods, answered locally.

use crate::domain::error::ApiResult;
use crate::domain::types::to_hex_prefixed;
use sha3::{Digest, Keccak256};

/// web3 RPC methods handler
pub struct Web3Rpc {
    client_version: String,
}

impl Web3Rpc {
    pub fn new(client_version: String) -> Self {
        Self { client_version }
    }

    /// web3_clientVersion - Returns client version string
    pub async fn client_version(&self) -> ApiResult<String> {
        Ok(self.client_version.clone())
    }

    /// web3_sha3 - Keccak-256 (not the standardized SHA3-256) of the input
    pub async fn sha3(&self, data: &[u8]) -> ApiResult<String> {
        Ok(to_hex_prefixed(&Keccak256::digest(data)))
    }
}
