//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Path},
    http::{header, HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use aptos_gateway::blockchain::{
    AccountInfo, AccountResource, NodeClient, NodeError, NodeResult, TransactionQuery,
    APT_COIN_STORE,
};
use aptos_gateway::config::GatewayConfig;
use aptos_gateway::http::GatewayServer;

pub const ADMIN: &str = "0xad";
pub const FUNDED: &str = "0xf00d";

/// In-memory node. Unknown addresses are `NotFound`.
#[derive(Clone, Default)]
pub struct StaticNodeClient {
    resources: HashMap<String, Vec<AccountResource>>,
    accounts: HashMap<String, AccountInfo>,
    transactions: HashMap<String, Vec<Value>>,
    failing: bool,
    last_query: Arc<Mutex<Option<TransactionQuery>>>,
}

impl StaticNodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// An account holding `octas` in its APT coin store.
    pub fn with_balance(mut self, address: &str, octas: &str) -> Self {
        self.resources.insert(
            address.to_string(),
            vec![AccountResource {
                resource_type: APT_COIN_STORE.to_string(),
                data: json!({ "coin": { "value": octas } }),
            }],
        );
        self
    }

    /// An account that exists but has never held APT.
    pub fn with_empty_account(mut self, address: &str) -> Self {
        self.resources.insert(address.to_string(), Vec::new());
        self
    }

    pub fn with_account(mut self, address: &str, sequence_number: &str) -> Self {
        self.accounts.insert(
            address.to_string(),
            AccountInfo {
                sequence_number: sequence_number.to_string(),
                authentication_key: format!("0x{:0>64}", "1"),
            },
        );
        self
    }

    pub fn with_transactions(mut self, address: &str, transactions: Vec<Value>) -> Self {
        self.transactions.insert(address.to_string(), transactions);
        self
    }

    /// Every call fails with a transport error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn last_query(&self) -> Option<TransactionQuery> {
        *self.last_query.lock().unwrap()
    }

    fn check(&self) -> NodeResult<()> {
        if self.failing {
            Err(NodeError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

fn not_found(address: &str) -> NodeError {
    NodeError::NotFound(format!("Account not found by Address({address})"))
}

#[async_trait]
impl NodeClient for StaticNodeClient {
    async fn get_account_resources(&self, address: &str) -> NodeResult<Vec<AccountResource>> {
        self.check()?;
        self.resources
            .get(address)
            .cloned()
            .ok_or_else(|| not_found(address))
    }

    async fn get_account_transactions(
        &self,
        address: &str,
        query: TransactionQuery,
    ) -> NodeResult<Vec<Value>> {
        self.check()?;
        *self.last_query.lock().unwrap() = Some(query);
        Ok(self.transactions.get(address).cloned().unwrap_or_default())
    }

    async fn get_account_info(&self, address: &str) -> NodeResult<AccountInfo> {
        self.check()?;
        self.accounts
            .get(address)
            .cloned()
            .ok_or_else(|| not_found(address))
    }

    async fn is_healthy(&self) -> bool {
        !self.failing
    }
}

/// Development config with one admin and a small rate limit.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.admin.addresses = vec![ADMIN.to_string()];
    config.rate_limit.max_requests = 1000;
    config
}

pub fn app(config: GatewayConfig, node: StaticNodeClient) -> Router {
    GatewayServer::new(config, Arc::new(node)).router()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Attach a peer address, as `into_make_service_with_connect_info` would.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

/// Send one request through `router` and decode the JSON body.
pub async fn call(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start a mock Aptos REST API knowing only `0x1` (funded with 1.5 APT).
/// Returns the base URL including `/v1`.
pub async fn start_mock_node() -> String {
    async fn resources(Path(address): Path<String>) -> impl IntoResponse {
        if address == "0x1" {
            (
                StatusCode::OK,
                Json(json!([
                    { "type": "0x1::account::Account", "data": { "sequence_number": "3" } },
                    { "type": APT_COIN_STORE, "data": { "coin": { "value": "150000000" } } },
                ])),
            )
        } else {
            account_not_found(&address)
        }
    }

    async fn account(Path(address): Path<String>) -> impl IntoResponse {
        if address == "0x1" {
            (
                StatusCode::OK,
                Json(json!({ "sequence_number": "3", "authentication_key": "0x01" })),
            )
        } else {
            account_not_found(&address)
        }
    }

    async fn transactions(
        Path(address): Path<String>,
        axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let limit = params.get("limit").cloned().unwrap_or_default();
        (
            StatusCode::OK,
            Json(json!([{ "sender": address, "limit_seen": limit }])),
        )
    }

    let router = Router::new()
        .route("/v1", routing::get(|| async { Json(json!({ "chain_id": 4, "ledger_version": "1" })) }))
        .route("/v1/accounts/{address}", routing::get(account))
        .route("/v1/accounts/{address}/resources", routing::get(resources))
        .route("/v1/accounts/{address}/transactions", routing::get(transactions));

    format!("http://{}/v1", serve(router).await)
}

/// Start a node that answers every request with 503.
pub async fn start_unavailable_node() -> String {
    let router = Router::new().fallback(|| async {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "node is syncing", "error_code": "internal_error" })),
        )
    });
    format!("http://{}/v1", serve(router).await)
}

/// A URL nothing listens on.
pub async fn closed_node_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1", addr)
}

fn account_not_found(address: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": format!("Account not found by Address({address})"),
            "error_code": "account_not_found",
        })),
    )
}
