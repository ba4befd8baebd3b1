//! Adapters for the gateway.
//!
//! reqwest-backed implementations of the outbound ports and the conversions
//! from pipeline errors to JSON-RPC errors.

pub mod error_conversions;
pub mod execution;
pub mod services;

pub use execution::JsonRpcExecutionClient;
pub use services::{service_invoker, HttpServiceInvoker, LoggingServiceInvoker};
