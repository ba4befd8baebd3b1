//! krnl JSON-RPC methods.

use crate::domain::error::ApiResult;
use crate::domain::types::{RegisteredDapp, SignatureToken, TransactionRequest};
use crate::relay::{AuthorizationClient, Relayer};
use std::sync::Arc;
use tracing::instrument;

/// krnl RPC methods handler
pub struct KrnlRpc {
    relayer: Arc<Relayer>,
    authority: Arc<AuthorizationClient>,
}

impl KrnlRpc {
    pub fn new(relayer: Arc<Relayer>, authority: Arc<AuthorizationClient>) -> Self {
        Self { relayer, authority }
    }

    /// krnl_sendRawTransaction - Runs embedded directives, then relays
    #[instrument(skip(self, raw_tx), fields(raw_len = raw_tx.len()))]
    pub async fn send_raw_transaction(&self, raw_tx: &str) -> ApiResult<String> {
        Ok(self.relayer.relay(raw_tx).await?)
    }

    /// krnl_transactionRequest - Signature token from the Token Authority
    #[instrument(skip(self, request))]
    pub async fn transaction_request(
        &self,
        request: TransactionRequest,
    ) -> ApiResult<SignatureToken> {
        Ok(self
            .authority
            .request_transaction_authorization(&request.access_token, &request.message)
            .await?)
    }

    /// krnl_registerNewDapp - Access token for a new dApp
    #[instrument(skip(self))]
    pub async fn register_new_dapp(&self, dapp_name: &str) -> ApiResult<RegisteredDapp> {
        Ok(self.authority.register_dapp(dapp_name).await?)
    }
}
