//! # Authorization Flow Tests
//!
//! Token Authority handshake through `krnl_transactionRequest` and
//! `krnl_registerNewDapp`.

#[cfg(test)]
mod tests {
    use crate::fixtures::{closed_url, tx_hash, MockAuthority, MockNode, TestGateway, VALID_ACCESS_TOKEN};
    use krnl_gateway::domain::error::codes;
    use krnl_gateway::TransactionRequest;
    use serde_json::json;

    #[tokio::test]
    async fn test_valid_token_yields_signature_token() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;

        let response = gateway
            .rpc(
                "krnl_transactionRequest",
                json!([{ "accessToken": VALID_ACCESS_TOKEN, "message": "hello" }]),
            )
            .await;

        assert_eq!(response["result"]["signatureToken"], json!("sig:hello"));
        assert_eq!(response["result"]["hash"], json!(tx_hash(b"hello")));
        assert_eq!(
            authority.requests(),
            vec![TransactionRequest::new(VALID_ACCESS_TOKEN, "hello")]
        );
    }

    #[tokio::test]
    async fn test_rejected_token_is_an_error_not_an_empty_token() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;

        let response = gateway
            .rpc("krnl_transactionRequest", json!(["bad-token", "msg"]))
            .await;

        assert!(response.get("result").is_none());
        assert_eq!(response["error"]["code"], json!(codes::UNAUTHORIZED));
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid access token"));
        assert_eq!(authority.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_alias_method_reaches_authority() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;

        let response = gateway
            .rpc(
                "krnl_requestTransactionAuthorization",
                json!([VALID_ACCESS_TOKEN, "payload"]),
            )
            .await;

        assert_eq!(response["result"]["signatureToken"], json!("sig:payload"));
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_authority() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;

        let response = gateway
            .rpc(
                "krnl_transactionRequest",
                json!([{ "accessToken": VALID_ACCESS_TOKEN }]),
            )
            .await;

        assert_eq!(response["error"]["code"], json!(codes::INVALID_PARAMS));
        assert!(authority.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_authority() {
        let authority_url = closed_url().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority_url, &node.url, None).await;

        let response = gateway
            .rpc("krnl_transactionRequest", json!([VALID_ACCESS_TOKEN, "msg"]))
            .await;

        assert_eq!(response["error"]["code"], json!(codes::RESOURCE_UNAVAILABLE));
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_register_new_dapp() {
        let authority = MockAuthority::start().await;
        let node = MockNode::start().await;
        let gateway = TestGateway::start(&authority.url, &node.url, None).await;

        let response = gateway
            .rpc("krnl_registerNewDapp", json!([{ "dappName": "my-dapp" }]))
            .await;
        assert_eq!(response["result"]["accessToken"], json!("token-for-my-dapp"));
        assert_eq!(
            response["result"]["tokenAuthorityPublicKey"],
            json!("0x04a1b2")
        );

        let response = gateway.rpc("krnl_registerNewDapp", json!([""])).await;
        assert_eq!(response["error"]["code"], json!(codes::INVALID_PARAMS));
    }
}
