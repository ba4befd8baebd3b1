//! Method registry for the JSON-RPC surface.
//!
//! Every method the gateway answers is listed here together with how it is
//! handled. Proxied methods are forwarded verbatim to the execution node.

use std::collections::HashMap;
use std::sync::LazyLock;

/// RPC namespace (the part before `_`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Krnl,
    Eth,
    Net,
    Web3,
}

/// Where a method is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodHandling {
    /// Decode, run directives, then submit to the execution node
    Relay,
    /// Round trip to the Token Authority
    Authority,
    /// Forwarded unchanged to the execution node
    Proxy,
    /// Answered by the gateway itself
    Local,
}

/// Method metadata
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Full method name (e.g., "krnl_sendRawTransaction")
    pub name: &'static str,
    pub namespace: Namespace,
    pub handling: MethodHandling,
    /// Does the method change chain or authority state?
    pub is_write: bool,
    /// Brief description
    pub description: &'static str,
}

impl MethodInfo {
    const fn new(
        name: &'static str,
        namespace: Namespace,
        handling: MethodHandling,
        is_write: bool,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            namespace,
            handling,
            is_write,
            description,
        }
    }

    const fn proxy(name: &'static str, namespace: Namespace, description: &'static str) -> Self {
        Self::new(name, namespace, MethodHandling::Proxy, false, description)
    }
}

/// Method registry - all supported methods with metadata
pub static METHOD_REGISTRY: LazyLock<HashMap<&'static str, MethodInfo>> = LazyLock::new(|| {
    let methods = [
        // --- krnl namespace ---
        MethodInfo::new(
            "krnl_sendRawTransaction",
            Namespace::Krnl,
            MethodHandling::Relay,
            true,
            "Runs embedded directives, then relays the signed transaction",
        ),
        MethodInfo::new(
            "krnl_transactionRequest",
            Namespace::Krnl,
            MethodHandling::Authority,
            true,
            "Requests a signature token from the Token Authority",
        ),
        MethodInfo::new(
            "krnl_requestTransactionAuthorization",
            Namespace::Krnl,
            MethodHandling::Authority,
            true,
            "Alias of krnl_transactionRequest",
        ),
        MethodInfo::new(
            "krnl_registerNewDapp",
            Namespace::Krnl,
            MethodHandling::Authority,
            true,
            "Registers a dApp with the Token Authority",
        ),
        // --- eth namespace ---
        MethodInfo::new(
            "eth_sendRawTransaction",
            Namespace::Eth,
            MethodHandling::Relay,
            true,
            "Same pipeline as krnl_sendRawTransaction",
        ),
        MethodInfo::proxy("eth_chainId", Namespace::Eth, "Returns the chain ID"),
        MethodInfo::proxy("eth_blockNumber", Namespace::Eth, "Returns current block number"),
        MethodInfo::proxy("eth_gasPrice", Namespace::Eth, "Returns current gas price"),
        MethodInfo::proxy(
            "eth_maxPriorityFeePerGas",
            Namespace::Eth,
            "Returns max priority fee suggestion",
        ),
        MethodInfo::proxy("eth_feeHistory", Namespace::Eth, "Returns fee history"),
        MethodInfo::proxy("eth_getBalance", Namespace::Eth, "Returns account balance"),
        MethodInfo::proxy("eth_getCode", Namespace::Eth, "Returns contract code"),
        MethodInfo::proxy(
            "eth_getTransactionCount",
            Namespace::Eth,
            "Returns account nonce",
        ),
        MethodInfo::proxy("eth_estimateGas", Namespace::Eth, "Estimates gas for a call"),
        MethodInfo::proxy("eth_call", Namespace::Eth, "Executes a call without a transaction"),
        MethodInfo::proxy(
            "eth_getTransactionByHash",
            Namespace::Eth,
            "Returns transaction by hash",
        ),
        MethodInfo::proxy(
            "eth_getTransactionReceipt",
            Namespace::Eth,
            "Returns transaction receipt",
        ),
        MethodInfo::proxy(
            "eth_getBlockByNumber",
            Namespace::Eth,
            "Returns block by number",
        ),
        // --- net namespace ---
        MethodInfo::proxy("net_version", Namespace::Net, "Returns network ID"),
        // --- web3 namespace ---
        MethodInfo::new(
            "web3_clientVersion",
            Namespace::Web3,
            MethodHandling::Local,
            false,
            "Returns client version",
        ),
        MethodInfo::new(
            "web3_sha3",
            Namespace::Web3,
            MethodHandling::Local,
            false,
            "Returns Keccak-256 of the given data",
        ),
    ];

    methods.into_iter().map(|m| (m.name, m)).collect()
});

/// Get method info by name
pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.get(method)
}

/// Check if method is supported
pub fn is_method_supported(method: &str) -> bool {
    METHOD_REGISTRY.contains_key(method)
}

/// Check if method is a write operation
pub fn is_write_method(method: &str) -> bool {
    get_method_info(method).map(|m| m.is_write).unwrap_or(false)
}
