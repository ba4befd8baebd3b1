//! Gateway error types with JSON-RPC 2.0 error codes.
//!
//! Two layers live here: the pipeline errors returned by the relay core
//! (`DecodeError`, `DirectiveFailure`, `RelayError`, `AuthorizationError`)
//! and the wire-level `ApiError` every RPC method reports to its caller.
//! Conversions between the two are in `adapters::error_conversions`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i32 = -32000;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    pub const TRANSACTION_REJECTED: i32 = -32003;
    pub const METHOD_NOT_SUPPORTED: i32 = -32004;
    pub const LIMIT_EXCEEDED: i32 = -32005;
    pub const TIMEOUT: i32 = -32006;

    // Token Authority rejected the caller's credential
    pub const UNAUTHORIZED: i32 = -32010;
}

/// JSON-RPC error object returned to callers
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// JSON-RPC error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error - invalid JSON
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - not a valid JSON-RPC request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    /// Generic server error
    pub fn server_error(details: impl Into<String>) -> Self {
        Self::new(codes::SERVER_ERROR, details.into())
    }

    /// Downstream service (authority, execution node) not reachable
    pub fn resource_unavailable(details: impl Into<String>) -> Self {
        Self::new(
            codes::RESOURCE_UNAVAILABLE,
            format!("Resource unavailable: {}", details.into()),
        )
    }

    pub fn method_not_supported(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_SUPPORTED,
            format!("Method not supported: {}", method),
        )
    }

    /// Limit exceeded (request size, batch size, transaction size)
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            codes::TIMEOUT,
            format!("Request timeout: {}", operation.into()),
        )
    }

    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::new(codes::UNAUTHORIZED, details.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ErrorHelper {
            code: i32,
            message: String,
            data: Option<serde_json::Value>,
        }

        let helper = ErrorHelper::deserialize(deserializer)?;
        Ok(ApiError {
            code: helper.code,
            message: helper.message,
            data: helper.data,
        })
    }
}

/// Result type for RPC methods
pub type ApiResult<T> = Result<T, ApiError>;

/// Malformed hex or malformed transaction encoding.
///
/// Always fatal to the single call, never to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("empty transaction")]
    Empty,
    #[error("transaction size {size} exceeds limit {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("unsupported transaction type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("malformed transaction: {0}")]
    Malformed(String),
    #[error("invalid directive segment {index}: {reason}")]
    InvalidDirective { index: usize, reason: String },
}

/// Why a single directive's external invocation failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("malformed directive: {0}")]
    Malformed(String),
    #[error("service timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("service rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// A directive failed; the remaining pipeline was aborted and nothing was relayed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("directive {index} ({directive:?}) failed: {cause}")]
pub struct DirectiveFailure {
    /// Zero-based position of the directive in the payload
    pub index: usize,
    /// Directive text (lossy UTF-8)
    pub directive: String,
    pub cause: InvocationError,
}

/// Submission to the execution layer failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("execution node rejected transaction [{code}]: {message}")]
    Node {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },
    #[error("execution node timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("execution node unavailable: {0}")]
    Unavailable(String),
    #[error("malformed execution node response: {0}")]
    Protocol(String),
}

/// Everything `sendRawTransaction` can fail with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendTransactionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Directive(#[from] DirectiveFailure),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("relay cancelled before submission")]
    Cancelled,
}

/// Token Authority round-trip failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// Caller contract violation, rejected before any network call
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid access token")]
    InvalidAccessToken,
    #[error("token authority unavailable: {0}")]
    AuthorityUnavailable(String),
    #[error("token authority timed out after {}ms", .0.as_millis())]
    AuthorityTimeout(Duration),
    /// Authority answered 2xx but the body is not the expected shape
    #[error("token authority protocol error: {0}")]
    AuthorityProtocol(String),
}

/// Gateway-level errors (not JSON-RPC, internal use)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    /// Outbound HTTP client could not be built
    #[error("http client error: {0}")]
    HttpClient(String),

    #[error("internal error: {0}")]
    Internal(String),
}
