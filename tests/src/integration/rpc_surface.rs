//! # RPC Surface Tests
//!
//! Read-only proxying, batches, health and metrics endpoints, request
//! limits and graceful shutdown.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        calldata_with, dynamic_fee_tx, raw_hex, tx_hash, MockAuthority, MockNode, MockServices,
        TestGateway,
    };
    use axum::http::StatusCode;
    use krnl_gateway::domain::error::codes;
    use krnl_gateway::GatewayConfig;
    use serde_json::json;

    async fn gateway_with_node() -> (MockNode, TestGateway) {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;
        (node, gateway)
    }

    #[tokio::test]
    async fn test_read_only_methods_are_proxied() {
        let (_node, gateway) = gateway_with_node().await;

        let response = gateway.rpc("eth_chainId", json!([])).await;
        assert_eq!(response["result"], json!("0xaa36a7"));

        let response = gateway
            .rpc(
                "eth_getBalance",
                json!(["0x1111111111111111111111111111111111111111", "latest"]),
            )
            .await;
        assert_eq!(response["result"], json!("0xde0b6b3a7640000"));

        let response = gateway.rpc("net_version", json!([])).await;
        assert_eq!(response["result"], json!("11155111"));
    }

    #[tokio::test]
    async fn test_node_errors_pass_through() {
        let (_node, gateway) = gateway_with_node().await;

        // Supported by the gateway, unknown to this node
        let response = gateway.rpc("eth_gasPrice", json!([])).await;
        assert_eq!(response["error"]["code"], json!(codes::SERVER_ERROR));
        assert_eq!(response["error"]["data"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (_node, gateway) = gateway_with_node().await;

        let response = gateway.rpc("admin_peers", json!([])).await;
        assert_eq!(response["error"]["code"], json!(codes::METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_web3_methods_are_local() {
        let (node, gateway) = gateway_with_node().await;

        let response = gateway.rpc("web3_clientVersion", json!([])).await;
        assert_eq!(response["result"], json!(krnl_gateway::client_version()));

        let response = gateway.rpc("web3_sha3", json!(["0x68656c6c6f"])).await;
        assert_eq!(response["result"], json!(tx_hash(b"hello")));
        assert!(node.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_batch_mixes_relay_and_proxy() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let services = MockServices::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, Some(&services.url)).await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA"]));

        let (status, body) = gateway
            .post(json!([
                { "jsonrpc": "2.0", "id": 1, "method": "eth_chainId", "params": [] },
                { "jsonrpc": "2.0", "id": 2, "method": "krnl_sendRawTransaction", "params": [raw_hex(&raw)] },
                { "jsonrpc": "2.0", "id": 3, "method": "eth_blockNumber" }
            ]))
            .await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["result"], json!("0xaa36a7"));
        assert_eq!(items[1]["id"], json!(2));
        assert_eq!(items[1]["result"], json!(tx_hash(&raw)));
        assert_eq!(items[2]["result"], json!("0x4b7"));
        assert_eq!(services.services(), vec!["svcA"]);
    }

    #[tokio::test]
    async fn test_invalid_envelopes_are_rejected_by_validation() {
        let (_node, gateway) = gateway_with_node().await;

        let (status, body) = gateway
            .post(json!({ "jsonrpc": "1.0", "id": 1, "method": "eth_chainId" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!(codes::INVALID_REQUEST));

        let (status, body) = gateway.post(json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!(codes::INVALID_REQUEST));
    }

    #[tokio::test]
    async fn test_request_size_limit() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let mut config = GatewayConfig::default();
        config.authority.url = authority.url.clone();
        config.execution.url = node.url.clone();
        config.limits.max_request_size = 512;
        let gateway = TestGateway::with_config(config).await;

        let (status, body) = gateway
            .post(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "krnl_sendRawTransaction",
                "params": [format!("0x{}", "ab".repeat(1024))]
            }))
            .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], json!(codes::LIMIT_EXCEEDED));
        assert!(node.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let (_node, gateway) = gateway_with_node().await;
        assert_eq!(gateway.get("/health").await, json!({ "status": "ok" }));

        let raw = dynamic_fee_tx(&calldata_with(&["svcA", "svcB"]));
        gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;
        gateway.rpc("krnl_sendRawTransaction", json!(["0x"])).await;

        let metrics = gateway.get("/metrics").await;
        assert_eq!(metrics["requests"]["total"], json!(2));
        assert_eq!(metrics["requests"]["writes"], json!(2));
        assert_eq!(metrics["relay"]["submitted"], json!(1));
        assert_eq!(metrics["relay"]["directives_dispatched"], json!(2));
        assert_eq!(metrics["relay"]["decode_failures"], json!(1));
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let (_node, gateway) = gateway_with_node().await;
        let url = gateway.url.clone();

        assert!(gateway.stop().await.is_ok());
        assert!(reqwest::get(format!("{}/health", url)).await.is_err());
    }
}
