//! # Relay Flow Tests
//!
//! `krnl_sendRawTransaction` end to end: the gateway decodes the envelope,
//! executes every directive against the service endpoint in payload order
//! and submits to the execution node only when all of them succeeded.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        calldata_with, closed_url, dynamic_fee_tx, raw_hex, tx_hash, MockAuthority, MockNode,
        MockServices, TestGateway, CALLDATA_PREFIX, FAILING_SERVICE,
    };
    use krnl_gateway::domain::error::codes;
    use serde_json::json;

    struct Harness {
        node: MockNode,
        services: MockServices,
        gateway: TestGateway,
    }

    async fn harness() -> Harness {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let services = MockServices::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, Some(&services.url)).await;
        Harness {
            node,
            services,
            gateway,
        }
    }

    #[tokio::test]
    async fn test_relay_without_directives() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&CALLDATA_PREFIX);

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["result"], json!(tx_hash(&raw)));
        assert_eq!(h.node.submissions(), vec![raw_hex(&raw)]);
        assert!(h.services.calls().is_empty());
    }

    #[tokio::test]
    async fn test_directives_run_in_order_before_relay() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA", "svcB"]));

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["result"], json!(tx_hash(&raw)));
        assert_eq!(h.services.services(), vec!["svcA", "svcB"]);
        assert_eq!(h.node.submissions().len(), 1);

        // Services see the transaction they are acting on
        let first = &h.services.calls()[0];
        assert_eq!(first["request"], json!("svcA"));
        assert_eq!(first["transaction"]["hash"], json!(tx_hash(&raw)));
        assert_eq!(first["transaction"]["type"], json!(2));
        assert_eq!(first["transaction"]["chainId"], json!(11_155_111));
    }

    #[tokio::test]
    async fn test_failed_directive_stops_pipeline() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&calldata_with(&[FAILING_SERVICE, "svcB"]));

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        let error = &response["error"];
        assert_eq!(error["code"], json!(codes::TRANSACTION_REJECTED));
        assert_eq!(error["data"]["index"], json!(0));
        assert_eq!(error["data"]["directive"], json!(FAILING_SERVICE));
        assert!(error["data"]["cause"].as_str().unwrap().contains("500"));

        assert_eq!(h.services.services(), vec![FAILING_SERVICE]);
        assert!(h.node.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_later_directive_failure_reports_its_index() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA", FAILING_SERVICE, "svcC"]));

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["error"]["data"]["index"], json!(1));
        assert_eq!(h.services.services(), vec!["svcA", FAILING_SERVICE]);
        assert!(h.node.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_hex_is_rejected_before_relay() {
        let h = harness().await;

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!(["0xnot-hex"]))
            .await;

        assert_eq!(response["error"]["code"], json!(codes::INVALID_PARAMS));
        assert!(h.node.submissions().is_empty());
        assert!(h.services.calls().is_empty());
    }

    #[tokio::test]
    async fn test_node_rejection_is_reported() {
        let authority = MockAuthority::start().await;
        let node = MockNode::rejecting("nonce too low").await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA"]));

        let response = gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["error"]["code"], json!(codes::SERVER_ERROR));
        assert_eq!(response["error"]["message"], json!("nonce too low"));
        assert_eq!(node.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_eth_send_raw_transaction_is_intercepted() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA"]));

        let response = h
            .gateway
            .rpc("eth_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["result"], json!(tx_hash(&raw)));
        assert_eq!(h.services.services(), vec!["svcA"]);
        assert_eq!(h.node.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_service_endpoint() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let services_url = closed_url().await;
        let gateway = TestGateway::start(&authority.url, &node.url, Some(&services_url)).await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA"]));

        let response = gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["error"]["code"], json!(codes::TRANSACTION_REJECTED));
        assert!(node.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_without_service_endpoint_directives_are_logged() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA", "svcB"]));

        let response = gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["result"], json!(tx_hash(&raw)));
        assert_eq!(node.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_directive_is_malformed() {
        let h = harness().await;
        let raw = dynamic_fee_tx(&calldata_with(&["svcA", ""]));

        let response = h
            .gateway
            .rpc("krnl_sendRawTransaction", json!([raw_hex(&raw)]))
            .await;

        assert_eq!(response["error"]["data"]["index"], json!(1));
        assert_eq!(h.services.services(), vec!["svcA"]);
        assert!(h.node.submissions().is_empty());
    }
}
