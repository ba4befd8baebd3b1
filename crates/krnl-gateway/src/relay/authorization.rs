//! Token Authority client.
//!
//! One POST per call, no caching and no retry. A 401 is a definitive
//! rejection; everything else that is not a parseable 2xx answer is reported
//! as the authority being unavailable or misbehaving, never as an empty
//! token.

use crate::domain::config::AuthorityConfig;
use crate::domain::error::{AuthorizationError, GatewayError};
use crate::domain::types::{RegisterDapp, RegisteredDapp, SignatureToken, TransactionRequest};
use crate::middleware::GatewayMetrics;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const TX_REQUEST_PATH: &str = "/tx-request";
const REGISTER_DAPP_PATH: &str = "/register-dapp";

pub struct AuthorizationClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl AuthorizationClient {
    pub fn new(config: &AuthorityConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Exchange an access token and a message for a signature token.
    #[instrument(skip(self, access_token), fields(message_len = message.len()))]
    pub async fn request_transaction_authorization(
        &self,
        access_token: &str,
        message: &str,
    ) -> Result<SignatureToken, AuthorizationError> {
        if access_token.is_empty() {
            return Err(AuthorizationError::MissingField("accessToken"));
        }
        if message.is_empty() {
            return Err(AuthorizationError::MissingField("message"));
        }

        let body = TransactionRequest::new(access_token, message);
        let result = self.post::<_, SignatureToken>(TX_REQUEST_PATH, &body).await;

        match &result {
            Ok(token) => {
                debug!(hash = %token.hash, "Transaction authorized");
                self.record(true);
            }
            Err(AuthorizationError::InvalidAccessToken) => {
                warn!("Token Authority rejected access token");
                self.record(false);
            }
            Err(e) => warn!(error = %e, "Transaction authorization failed"),
        }

        result
    }

    /// Register a dApp and obtain its access token.
    #[instrument(skip(self))]
    pub async fn register_dapp(&self, dapp_name: &str) -> Result<RegisteredDapp, AuthorizationError> {
        if dapp_name.is_empty() {
            return Err(AuthorizationError::MissingField("dappName"));
        }

        let body = RegisterDapp {
            dapp_name: dapp_name.to_string(),
        };
        self.post(REGISTER_DAPP_PATH, &body).await
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AuthorizationError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthorizationError::InvalidAccessToken);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(AuthorizationError::AuthorityUnavailable(format!(
                "{} answered {}: {}",
                url,
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AuthorizationError::AuthorityProtocol(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> AuthorizationError {
        if e.is_timeout() {
            AuthorizationError::AuthorityTimeout(self.timeout)
        } else {
            AuthorizationError::AuthorityUnavailable(e.to_string())
        }
    }

    fn record(&self, granted: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_authorization(granted);
        }
    }
}
