//! Gateway configuration with validation.
//!
//! Every outbound collaborator (Token Authority, execution node, directive
//! services) is addressed through this struct; nothing in the library reads
//! the environment.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Inbound JSON-RPC server
    pub http: HttpConfig,
    /// Token Authority endpoint
    pub authority: AuthorityConfig,
    /// Execution-layer node
    pub execution: ExecutionConfig,
    /// Directive service endpoint
    pub services: ServicesConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
    pub chain: ChainConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port cannot be 0".into()));
        }

        validate_url("authority.url", &self.authority.url)?;
        validate_url("execution.url", &self.execution.url)?;
        if let Some(endpoint) = &self.services.endpoint {
            validate_url("services.endpoint", endpoint)?;
        }

        for (name, timeout) in [
            ("authority.timeout", self.authority.timeout),
            ("execution.timeout", self.execution.timeout),
            ("services.timeout", self.services.timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!("{} cannot be 0", name)));
            }
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.limits.max_batch_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_batch_size cannot be 0".into(),
            ));
        }

        if self.limits.max_transaction_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_transaction_size cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::InvalidUrl(format!("{} is empty", field)));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must be an http(s) URL, got {}",
            field, url
        )));
    }
    Ok(())
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 1234)
    pub port: u16,
    /// Enable HTTP server
    pub enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 1234,
            enabled: true,
        }
    }
}

/// Token Authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Base URL, paths such as `/tx-request` are appended
    pub url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8181".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Execution node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// JSON-RPC endpoint of the node
    pub url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Forward read-only eth_*/net_* calls to the node
    pub proxy_enabled: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            timeout: Duration::from_secs(10),
            proxy_enabled: true,
        }
    }
}

/// Directive service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Endpoint receiving directive invocations. `None` logs and accepts.
    pub endpoint: Option<String>,
    /// Upper bound for a single directive invocation
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 1MB)
    pub max_request_size: usize,
    /// Max batch size (number of requests in batch)
    pub max_batch_size: usize,
    /// Max decoded transaction size in bytes (default: 128KB)
    pub max_transaction_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
            max_batch_size: 100,
            max_transaction_size: 128 * 1024,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache, seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: 86400,
        }
    }
}

/// Chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Client version string for web3_clientVersion
    pub client_version: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            client_version: crate::client_version(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
