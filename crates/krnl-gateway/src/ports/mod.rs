//! Ports (traits) for the relay core's collaborators.

pub mod outbound;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use outbound::{ExecutionClient, ServiceInvoker};
