//! Domain types for the relay gateway.
//!
//! Configuration, error taxonomy, wire types and the method registry.

pub mod config;
pub mod error;
pub mod methods;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, GatewayConfig, LimitsConfig};
pub use error::{
    ApiError, ApiResult, AuthorizationError, DecodeError, DirectiveFailure, GatewayError,
    InvocationError, RelayError, SendTransactionError,
};
pub use methods::{get_method_info, is_method_supported, MethodHandling, MethodInfo, Namespace};
pub use types::*;
