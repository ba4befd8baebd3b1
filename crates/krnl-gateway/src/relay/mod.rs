//! Relay core: directive dispatch, transaction relay and the Token
//! Authority handshake.

pub mod authorization;
pub mod dispatcher;
pub mod orchestrator;

pub use authorization::AuthorizationClient;
pub use dispatcher::Dispatcher;
pub use orchestrator::Relayer;
