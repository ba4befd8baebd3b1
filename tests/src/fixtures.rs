//! # Test Fixtures
//!
//! Throwaway axum servers standing in for the gateway's collaborators, plus
//! a running gateway wired to them.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use krnl_gateway::service::ShutdownHandle;
use krnl_gateway::tx::embed_directives;
use krnl_gateway::{
    GatewayConfig, GatewayError, GatewayService, RegisterDapp, RegisteredDapp, SignatureToken,
    TransactionRequest,
};
use parking_lot::Mutex;
use rlp::RlpStream;
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Access token the mock authority accepts
pub const VALID_ACCESS_TOKEN: &str = "valid-access-token";

/// ERC-20 `transfer` selector, used as calldata prefix
pub const CALLDATA_PREFIX: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Directive service name the mock service endpoint fails
pub const FAILING_SERVICE: &str = "failsvc";

/// Bind `router` to an ephemeral port and return its base URL
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// URL of a port nothing listens on
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Signed-looking EIP-1559 envelope carrying `calldata`
pub fn dynamic_fee_tx(calldata: &[u8]) -> Vec<u8> {
    let mut s = RlpStream::new_list(12);
    s.append(&11_155_111u64);
    s.append(&4u64);
    s.append(&1_000_000_000u64);
    s.append(&30_000_000_000u64);
    s.append(&100_000u64);
    s.append(&vec![0x11u8; 20]);
    s.append(&0u64);
    s.append(&calldata.to_vec());
    s.begin_list(0);
    s.append(&0u64);
    s.append(&vec![0x05u8; 32]);
    s.append(&vec![0x06u8; 32]);

    let mut raw = vec![0x02];
    raw.extend_from_slice(&s.out());
    raw
}

/// Calldata with `directives` appended after the sentinel convention
pub fn calldata_with(directives: &[&str]) -> Vec<u8> {
    embed_directives(&CALLDATA_PREFIX, directives)
}

pub fn raw_hex(raw: &[u8]) -> String {
    format!("0x{}", hex::encode(raw))
}

/// Hash the node reports for `raw`
pub fn tx_hash(raw: &[u8]) -> String {
    format!("0x{}", hex::encode(Keccak256::digest(raw)))
}

// =============================================================================
// EXECUTION NODE
// =============================================================================

#[derive(Clone, Default)]
struct NodeState {
    submissions: Arc<Mutex<Vec<String>>>,
    reject_with: Option<String>,
}

/// Execution node that records raw submissions
pub struct MockNode {
    pub url: String,
    state: NodeState,
}

impl MockNode {
    pub async fn start() -> Self {
        Self::with_state(NodeState::default()).await
    }

    /// Node answering every submission with a JSON-RPC error
    pub async fn rejecting(message: &str) -> Self {
        Self::with_state(NodeState {
            reject_with: Some(message.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn with_state(state: NodeState) -> Self {
        let router = Router::new()
            .route("/", post(node_handler))
            .with_state(state.clone());
        Self {
            url: serve(router).await,
            state,
        }
    }

    /// 0x-prefixed raw transactions, in arrival order
    pub fn submissions(&self) -> Vec<String> {
        self.state.submissions.lock().clone()
    }
}

async fn node_handler(State(state): State<NodeState>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();

    let outcome: Result<Value, (i64, String)> = match method {
        "eth_sendRawTransaction" => {
            let raw = request["params"][0].as_str().unwrap_or_default().to_string();
            state.submissions.lock().push(raw.clone());
            match &state.reject_with {
                Some(message) => Err((-32000, message.clone())),
                None => {
                    let bytes = hex::decode(raw.trim_start_matches("0x")).unwrap_or_default();
                    Ok(json!(tx_hash(&bytes)))
                }
            }
        }
        "eth_chainId" => Ok(json!("0xaa36a7")),
        "eth_blockNumber" => Ok(json!("0x4b7")),
        "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
        "net_version" => Ok(json!("11155111")),
        other => Err((-32601, format!("the method {} does not exist", other))),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    })
}

// =============================================================================
// TOKEN AUTHORITY
// =============================================================================

#[derive(Clone, Default)]
struct AuthorityState {
    requests: Arc<Mutex<Vec<TransactionRequest>>>,
}

/// Token Authority that only honours [`VALID_ACCESS_TOKEN`]
pub struct MockAuthority {
    pub url: String,
    state: AuthorityState,
}

impl MockAuthority {
    pub async fn start() -> Self {
        let state = AuthorityState::default();
        let router = Router::new()
            .route("/tx-request", post(tx_request_handler))
            .route("/register-dapp", post(register_dapp_handler))
            .with_state(state.clone());
        Self {
            url: serve(router).await,
            state,
        }
    }

    /// Authorization requests received, in arrival order
    pub fn requests(&self) -> Vec<TransactionRequest> {
        self.state.requests.lock().clone()
    }
}

async fn tx_request_handler(
    State(state): State<AuthorityState>,
    Json(request): Json<TransactionRequest>,
) -> axum::response::Response {
    state.requests.lock().push(request.clone());

    if request.access_token != VALID_ACCESS_TOKEN {
        return (StatusCode::UNAUTHORIZED, "invalid access token").into_response();
    }

    Json(SignatureToken {
        signature_token: format!("sig:{}", request.message),
        hash: tx_hash(request.message.as_bytes()),
    })
    .into_response()
}

async fn register_dapp_handler(Json(request): Json<RegisterDapp>) -> Json<RegisteredDapp> {
    Json(RegisteredDapp {
        access_token: format!("token-for-{}", request.dapp_name),
        token_authority_public_key: "0x04a1b2".to_string(),
    })
}

// =============================================================================
// DIRECTIVE SERVICE ENDPOINT
// =============================================================================

#[derive(Clone, Default)]
struct ServicesState {
    calls: Arc<Mutex<Vec<Value>>>,
}

/// Service endpoint that accepts every directive except [`FAILING_SERVICE`]
pub struct MockServices {
    pub url: String,
    state: ServicesState,
}

impl MockServices {
    pub async fn start() -> Self {
        let state = ServicesState::default();
        let router = Router::new()
            .route("/", post(services_handler))
            .with_state(state.clone());
        Self {
            url: serve(router).await,
            state,
        }
    }

    /// Full invocation bodies, in arrival order
    pub fn calls(&self) -> Vec<Value> {
        self.state.calls.lock().clone()
    }

    /// `service` field of every invocation, in arrival order
    pub fn services(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c["service"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

async fn services_handler(
    State(state): State<ServicesState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let failing = body["service"] == FAILING_SERVICE;
    state.calls.lock().push(body);

    if failing {
        (StatusCode::INTERNAL_SERVER_ERROR, "service failed")
    } else {
        (StatusCode::OK, "ok")
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// A gateway serving on an ephemeral port
pub struct TestGateway {
    pub url: String,
    client: reqwest::Client,
    shutdown: Option<ShutdownHandle>,
    task: Option<JoinHandle<Result<(), GatewayError>>>,
}

impl TestGateway {
    /// Gateway wired to the given collaborators
    pub async fn start(authority_url: &str, node_url: &str, services_url: Option<&str>) -> Self {
        let mut config = GatewayConfig::default();
        config.authority.url = authority_url.to_string();
        config.authority.timeout = Duration::from_secs(2);
        config.execution.url = node_url.to_string();
        config.execution.timeout = Duration::from_secs(2);
        config.services.endpoint = services_url.map(str::to_string);
        config.services.timeout = Duration::from_secs(2);

        Self::with_config(config).await
    }

    pub async fn with_config(config: GatewayConfig) -> Self {
        let mut service = GatewayService::new(config).unwrap();
        let shutdown = service.shutdown_handle();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move { service.serve(listener).await });

        Self {
            url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            shutdown,
            task: Some(task),
        }
    }

    /// POST a raw JSON body, returning status and parsed response
    pub async fn post(&self, body: Value) -> (StatusCode, Value) {
        let response = self.client.post(&self.url).json(&body).send().await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    /// Single JSON-RPC call, returning the response object
    pub async fn rpc(&self, method: &str, params: Value) -> Value {
        let (_, body) = self
            .post(json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params }))
            .await;
        body
    }

    pub async fn get(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{}", self.url, path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Graceful shutdown, returning the server's exit result
    pub async fn stop(mut self) -> Result<(), GatewayError> {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.shutdown();
        }
        match self.task.take() {
            Some(task) => task.await.unwrap(),
            None => Ok(()),
        }
    }
}
