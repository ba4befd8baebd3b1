//! Pipeline errors to JSON-RPC error objects.

use crate::domain::error::{
    codes, ApiError, AuthorizationError, DecodeError, DirectiveFailure, InvocationError,
    RelayError, SendTransactionError,
};
use serde_json::json;

impl From<DecodeError> for ApiError {
    fn from(e: DecodeError) -> Self {
        ApiError::invalid_params(e.to_string())
    }
}

impl From<DirectiveFailure> for ApiError {
    fn from(failure: DirectiveFailure) -> Self {
        if let InvocationError::Timeout(_) = failure.cause {
            return ApiError::with_data(
                codes::TIMEOUT,
                format!("Request timeout: {}", failure),
                json!({ "index": failure.index, "directive": failure.directive }),
            );
        }

        ApiError::with_data(
            codes::TRANSACTION_REJECTED,
            format!("Transaction rejected: {}", failure),
            json!({
                "index": failure.index,
                "directive": failure.directive,
                "cause": failure.cause.to_string(),
            }),
        )
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Node {
                code,
                message,
                data,
            } => {
                let mut node_error = json!({ "code": code, "message": message });
                if let Some(data) = data {
                    node_error["data"] = data;
                }
                ApiError::with_data(codes::SERVER_ERROR, message, node_error)
            }
            RelayError::Timeout(_) => ApiError::timeout(e.to_string()),
            RelayError::Unavailable(_) => ApiError::resource_unavailable(e.to_string()),
            RelayError::Protocol(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<SendTransactionError> for ApiError {
    fn from(e: SendTransactionError) -> Self {
        match e {
            SendTransactionError::Decode(e) => e.into(),
            SendTransactionError::Directive(e) => e.into(),
            SendTransactionError::Relay(e) => e.into(),
            SendTransactionError::Cancelled => ApiError::server_error(e.to_string()),
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::MissingField(_) => ApiError::invalid_params(e.to_string()),
            AuthorizationError::InvalidAccessToken => ApiError::unauthorized(e.to_string()),
            AuthorizationError::AuthorityUnavailable(_) => {
                ApiError::resource_unavailable(e.to_string())
            }
            AuthorizationError::AuthorityTimeout(_) => ApiError::timeout(e.to_string()),
            AuthorizationError::AuthorityProtocol(_) => ApiError::internal(e.to_string()),
        }
    }
}
