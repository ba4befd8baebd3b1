//! # krnl-node
//!
//! Runs the krnl gateway: a JSON-RPC endpoint that executes the directives
//! embedded in signed transactions before relaying them to an execution
//! node, and brokers access tokens with the Token Authority.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags (each one falls back to an environment variable)
//! 2. Install the tracing subscriber
//! 3. Build and validate the gateway configuration
//! 4. Serve until Ctrl-C, then drain in-flight requests

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use krnl_gateway::{GatewayConfig, GatewayService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// krnl transaction-relay node
#[derive(Parser, Debug)]
#[command(name = "krnl-node", version)]
#[command(about = "Executes calldata directives and relays transactions to an execution node")]
struct Args {
    /// Token Authority base URL
    #[arg(long, env = "TOKEN_AUTHORITY", default_value = "http://127.0.0.1:8181")]
    token_authority: String,

    /// Execution node JSON-RPC URL
    #[arg(long, env = "ETH_JSON_RPC", default_value = "http://127.0.0.1:8545")]
    eth_json_rpc: String,

    /// Endpoint receiving directive invocations; directives are only logged when unset
    #[arg(long, env = "FAAS_ENDPOINT")]
    faas_endpoint: Option<String>,

    /// Interface to listen on
    #[arg(long, env = "KRNL_RPC_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "KRNL_RPC_PORT", default_value_t = 1234)]
    port: u16,

    /// Timeout applied to every outbound call (e.g. "10s", "500ms")
    #[arg(
        long,
        env = "KRNL_OUTBOUND_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    outbound_timeout: Duration,

    /// Do not forward read-only eth_*/net_* calls to the execution node
    #[arg(long)]
    no_proxy: bool,

    /// Log filter, overridden by RUST_LOG when set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<GatewayConfig> {
        let mut config = GatewayConfig::default();

        config.http.host = self
            .host
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.host))?;
        config.http.port = self.port;

        config.authority.url = self.token_authority;
        config.authority.timeout = self.outbound_timeout;

        config.execution.url = self.eth_json_rpc;
        config.execution.timeout = self.outbound_timeout;
        config.execution.proxy_enabled = !self.no_proxy;

        config.services.endpoint = self.faas_endpoint.filter(|e| !e.is_empty());
        config.services.timeout = self.outbound_timeout;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = krnl_gateway::VERSION, "Starting krnl-node");

    let config = args.into_config()?;
    info!(
        authority = %config.authority.url,
        execution = %config.execution.url,
        services = config.services.endpoint.as_deref().unwrap_or("<log only>"),
        "Configuration loaded"
    );

    let mut service = GatewayService::new(config).context("failed to build gateway")?;
    let shutdown = service
        .shutdown_handle()
        .context("shutdown handle already taken")?;

    let mut server = tokio::spawn(async move { service.start().await });

    let result = tokio::select! {
        result = &mut server => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("Ctrl-C received, shutting down");
            shutdown.shutdown();
            server.await
        }
    };

    match result.context("gateway task panicked")? {
        Ok(()) => {
            info!("krnl-node stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Gateway exited with error");
            Err(e.into())
        }
    }
}
