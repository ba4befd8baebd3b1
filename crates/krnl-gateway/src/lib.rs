#![allow(missing_docs)]

//! krnl gateway - transaction interception and relay over JSON-RPC.
//!
//! The gateway sits between a signer and an execution node. Signed raw
//! transactions arriving through `krnl_sendRawTransaction` (or the
//! `eth_sendRawTransaction` alias) are decoded, any directives embedded in
//! their calldata are dispatched to external services, and only then is the
//! transaction submitted to the node.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         KRNL GATEWAY                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │   HTTP POST /  (JSON-RPC 2.0, batch)   GET /health  /metrics   │
//! │          │                                                     │
//! │   Tracing → Validation → CORS                                  │
//! │          │                                                     │
//! │   ┌──────┴──────┬───────────────────┬───────────────┐          │
//! │   │ krnl_*      │ eth_send*         │ eth_* / net_* │          │
//! │   │ (authority) │ (relay pipeline)  │ (proxy)       │          │
//! │   └──────┬──────┴─────────┬─────────┴───────┬───────┘          │
//! │          │      decode → extract → dispatch → submit            │
//! └──────────┼────────────────┼─────────────────┼──────────────────┘
//!            ▼                ▼                 ▼
//!     Token Authority   Directive services   Execution node
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use krnl_gateway::{GatewayConfig, GatewayService};
//!
//! let config = GatewayConfig::default();
//! let mut service = GatewayService::new(config)?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod relay;
pub mod router;
pub mod rpc;
pub mod service;
pub mod tx;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::error::{
    ApiError, ApiResult, AuthorizationError, DecodeError, DirectiveFailure, GatewayError,
    InvocationError, RelayError, SendTransactionError,
};
pub use domain::methods::{get_method_info, is_method_supported, MethodHandling, MethodInfo};
pub use domain::types::*;
pub use middleware::GatewayMetrics;
pub use ports::{ExecutionClient, ServiceInvoker};
pub use relay::{AuthorizationClient, Dispatcher, Relayer};
pub use service::GatewayService;
pub use tx::{decode_raw_transaction, extract_directives, DecodedTransaction, Directive};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client version string for web3_clientVersion
pub fn client_version() -> String {
    format!("krnl-node/v{}/rust", VERSION)
}
