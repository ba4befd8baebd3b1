//! Cross-module flows driven over HTTP.

mod authorization_flows;
mod relay_flows;
mod rpc_surface;
