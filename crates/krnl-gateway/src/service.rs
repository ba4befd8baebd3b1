//! Gateway service - main entry point.
//!
//! Wires the outbound adapters into the relay pipeline and serves the
//! JSON-RPC surface over HTTP.

use crate::adapters::{service_invoker, JsonRpcExecutionClient};
use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::domain::methods::is_write_method;
use crate::middleware::{GatewayMetrics, MiddlewareStack, RequestTimer};
use crate::ports::{ExecutionClient, ServiceInvoker};
use crate::relay::{AuthorizationClient, Dispatcher, Relayer};
use crate::router::{route_method, AppState};
use crate::rpc::RpcHandlers;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tracing::{error, info};

const MAX_ID_LEN: usize = 256;

/// Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    rpc_handlers: Arc<RpcHandlers>,
    middleware: MiddlewareStack,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl GatewayService {
    /// Create a gateway talking to the endpoints named in `config`
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let invoker = service_invoker(&config.services)?;
        let execution: Arc<dyn ExecutionClient> =
            Arc::new(JsonRpcExecutionClient::new(&config.execution)?);

        Self::with_components(config, invoker, execution)
    }

    /// Create a gateway around caller-supplied service and node clients.
    ///
    /// The Token Authority client is still built from `config.authority`.
    pub fn with_components(
        config: GatewayConfig,
        invoker: Arc<dyn ServiceInvoker>,
        execution: Arc<dyn ExecutionClient>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let middleware = MiddlewareStack::from_config(&config);
        let metrics = middleware.metrics();

        let authority = Arc::new(
            AuthorizationClient::new(&config.authority)?.with_metrics(Arc::clone(&metrics)),
        );
        let relayer = Arc::new(
            Relayer::new(
                Dispatcher::new(invoker, config.services.timeout),
                Arc::clone(&execution),
                config.execution.timeout,
                config.limits.max_transaction_size,
            )
            .with_metrics(metrics),
        );

        let rpc_handlers = Arc::new(RpcHandlers::new(&config, relayer, authority, execution));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        Ok(Self {
            config,
            rpc_handlers,
            middleware,
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx: Some(shutdown_rx),
        })
    }

    /// Bind the configured address and serve until shut down
    pub async fn start(&mut self) -> Result<(), GatewayError> {
        if !self.config.http.enabled {
            info!("HTTP server disabled; waiting for shutdown");
            if let Some(rx) = self.shutdown_rx.take() {
                let _ = rx.await;
            }
            return Ok(());
        }

        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until shut down
    pub async fn serve(&mut self, listener: TcpListener) -> Result<(), GatewayError> {
        let shutdown_rx = self
            .shutdown_rx
            .take()
            .ok_or_else(|| GatewayError::Internal("service already started".into()))?;
        let router = self.router();

        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "krnl gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server error");
                GatewayError::Internal(e.to_string())
            })?;

        info!("krnl gateway stopped");
        Ok(())
    }

    /// Handle that stops a running [`serve`](Self::serve) or [`start`](Self::start)
    pub fn shutdown_handle(&mut self) -> Option<ShutdownHandle> {
        self.shutdown_tx.take().map(|tx| ShutdownHandle { tx })
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        self.middleware.metrics()
    }

    /// HTTP router with the full middleware stack applied
    pub fn router(&self) -> Router {
        let state = AppState {
            rpc_handlers: Arc::clone(&self.rpc_handlers),
            metrics: self.middleware.metrics(),
        };

        // Outermost first
        let middleware = ServiceBuilder::new()
            .layer(self.middleware.tracing.clone())
            .layer(self.middleware.validation.clone())
            .layer(self.middleware.cors.clone());

        let metrics = self.middleware.metrics();
        Router::new()
            .route("/", post(handle_json_rpc))
            .layer(middleware)
            .route("/health", get(health_check))
            .route(
                "/metrics",
                get(move || {
                    let metrics = Arc::clone(&metrics);
                    async move { Json(metrics.to_json()) }
                }),
            )
            .with_state(state)
    }
}

/// Stops the gateway's HTTP server gracefully
pub struct ShutdownHandle {
    tx: oneshot::Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(self) {
        let _ = self.tx.send(());
    }
}

/// Handle JSON-RPC request
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_object(
                    Value::Null,
                    ApiError::parse_error(e.to_string()),
                )),
            );
        }
    };

    let response = match request {
        Value::Array(requests) => {
            let mut responses = Vec::with_capacity(requests.len());
            for req in &requests {
                responses.push(process_single_request(&state, req).await);
            }
            Value::Array(responses)
        }
        single => process_single_request(&state, &single).await,
    };

    (StatusCode::OK, Json(response))
}

/// Process a single JSON-RPC request
async fn process_single_request(state: &AppState, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    if let Err(e) = validate_id(request.get("id")) {
        return error_object(Value::Null, e);
    }

    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    let params = request.get("params");

    let timer = RequestTimer::new(Arc::clone(&state.metrics), is_write_method(method));
    let result = route_method(state, method, params).await;
    timer.finish(result.is_ok());

    match result {
        Ok(value) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": value
        }),
        Err(e) => error_object(id, e),
    }
}

/// Notifications are not supported, so a present id must be usable.
fn validate_id(id: Option<&Value>) -> Result<(), ApiError> {
    match id {
        None => Ok(()),
        Some(Value::Null) => Err(ApiError::invalid_request(
            "null id (notifications not supported)",
        )),
        Some(Value::String(s)) if s.is_empty() => Err(ApiError::invalid_request("empty string id")),
        Some(Value::String(s)) if s.len() > MAX_ID_LEN => Err(ApiError::invalid_request(format!(
            "id string too long (max {} chars)",
            MAX_ID_LEN
        ))),
        Some(Value::String(_)) | Some(Value::Number(_)) => Ok(()),
        Some(_) => Err(ApiError::invalid_request("id must be string or number")),
    }
}

fn error_object(id: Value, error: ApiError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error
    })
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
