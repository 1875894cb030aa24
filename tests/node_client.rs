//! `AptosClient` against a mock Aptos REST API.

use std::sync::Arc;

use axum::http::StatusCode;

use aptos_gateway::blockchain::{AptosClient, CoinBalance, NodeClient, NodeError, TransactionQuery};
use aptos_gateway::config::NodeConfig;

mod common;

use common::{call, closed_node_url, get, start_mock_node, start_unavailable_node, test_config};

fn node_config(url: String, failover_urls: Vec<String>) -> NodeConfig {
    NodeConfig {
        url,
        failover_urls,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_reads_resources_and_balance() {
    let client = AptosClient::new(&node_config(start_mock_node().await, vec![])).unwrap();

    let resources = client.get_account_resources("0x1").await.unwrap();
    assert_eq!(resources.len(), 2);

    let balance = CoinBalance::from_resources(&resources).unwrap();
    assert_eq!(balance.octas, "150000000");
    assert_eq!(balance.apt, 1.5);
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let client = AptosClient::new(&node_config(start_mock_node().await, vec![])).unwrap();

    let err = client.get_account_info("0x2").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(err.to_string().contains("Account not found by Address(0x2)"));
}

#[tokio::test]
async fn test_account_info_and_transactions() {
    let client = AptosClient::new(&node_config(start_mock_node().await, vec![])).unwrap();

    let info = client.get_account_info("0x1").await.unwrap();
    assert_eq!(info.sequence_number, "3");

    let query = TransactionQuery {
        limit: Some(10),
        start: None,
    };
    let transactions = client.get_account_transactions("0x1", query).await.unwrap();
    assert_eq!(transactions[0]["limit_seen"], "10");
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_fails_over_from_unavailable_node() {
    let config = node_config(start_unavailable_node().await, vec![start_mock_node().await]);
    let client = AptosClient::new(&config).unwrap();

    let info = client.get_account_info("0x1").await.unwrap();
    assert_eq!(info.authentication_key, "0x01");
}

#[tokio::test]
async fn test_fails_over_from_closed_port() {
    let config = node_config(closed_node_url().await, vec![start_mock_node().await]);
    let client = AptosClient::new(&config).unwrap();
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_not_found_does_not_fail_over() {
    // The second endpoint would fail differently; a 404 from the first is final.
    let config = node_config(start_mock_node().await, vec![start_unavailable_node().await]);
    let client = AptosClient::new(&config).unwrap();

    let err = client.get_account_resources("0x9").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_all_endpoints_unavailable() {
    let client = AptosClient::new(&node_config(start_unavailable_node().await, vec![])).unwrap();

    match client.get_account_info("0x1").await.unwrap_err() {
        NodeError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "node is syncing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.is_healthy().await);
}

#[tokio::test]
async fn test_gateway_over_real_client() {
    let client = AptosClient::new(&node_config(start_mock_node().await, vec![])).unwrap();
    let router = aptos_gateway::GatewayServer::new(test_config(), Arc::new(client)).router();

    let (status, _, body) = call(&router, get("/api/aptos/balance/0x1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1.5);

    let (status, _, body) = call(&router, get("/api/aptos/balance/0x2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balanceOctas"], "0");

    let (status, _, _) = call(&router, get("/api/aptos/account/0x2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
