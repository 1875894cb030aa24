//! Aptos node REST client with timeout and failover.
//!
//! # Responsibilities
//! - Query account resources, transactions and account data
//! - Distinguish "not found" from every other failure
//! - Fail over to secondary endpoints on transport errors and 5xx
//! - Provide health check for node connectivity

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;

use crate::blockchain::types::{
    AccountInfo, AccountResource, NodeError, NodeErrorBody, NodeResult, TransactionQuery,
};
use crate::config::NodeConfig;
use crate::observability::metrics;

/// Operations the gateway needs from a blockchain node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// All Move resources stored under `address`.
    async fn get_account_resources(&self, address: &str) -> NodeResult<Vec<AccountResource>>;

    /// Transactions sent by `address`, oldest first.
    async fn get_account_transactions(
        &self,
        address: &str,
        query: TransactionQuery,
    ) -> NodeResult<Vec<Value>>;

    /// Sequence number and authentication key of `address`.
    async fn get_account_info(&self, address: &str) -> NodeResult<AccountInfo>;

    /// Whether the node currently answers requests.
    async fn is_healthy(&self) -> bool;
}

/// REST client for an Aptos fullnode.
#[derive(Clone)]
pub struct AptosClient {
    http: reqwest::Client,
    /// Base URLs (primary first), without trailing slash.
    endpoints: Vec<String>,
    timeout_duration: Duration,
}

impl AptosClient {
    /// Create a client from configuration. The primary URL must parse;
    /// unparseable failover URLs are skipped with a warning.
    pub fn new(config: &NodeConfig) -> NodeResult<Self> {
        url::Url::parse(&config.url).map_err(|e| NodeError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

        let mut endpoints = vec![config.url.trim_end_matches('/').to_string()];
        for url_str in &config.failover_urls {
            if url::Url::parse(url_str).is_ok() {
                endpoints.push(url_str.trim_end_matches('/').to_string());
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover node URL");
            }
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoints,
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Create a client and probe the primary node. An unreachable node is
    /// logged, not fatal.
    pub async fn connect(config: &NodeConfig) -> NodeResult<Self> {
        let client = Self::new(config)?;
        if client.is_healthy().await {
            tracing::info!(node_url = %config.url, "Node client initialized");
        } else {
            tracing::warn!(node_url = %config.url, "Node client initialized but node is unreachable");
        }
        Ok(client)
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> NodeResult<T> {
        let mut last_error = NodeError::Transport("no node endpoints configured".to_string());

        for (i, base) in self.endpoints.iter().enumerate() {
            let url = format!("{}{}", base, path);
            let result = match timeout(self.timeout_duration, self.fetch::<T>(&url, query)).await {
                Ok(result) => result,
                Err(_) => Err(NodeError::Timeout(self.timeout_duration.as_secs())),
            };

            match result {
                Ok(value) => {
                    metrics::record_node_request(operation, "ok");
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(provider_idx = i, operation, error = %e, "Node error, trying next endpoint");
                    last_error = e;
                }
                Err(e) => {
                    let outcome = if e.is_not_found() { "not_found" } else { "error" };
                    metrics::record_node_request(operation, outcome);
                    return Err(e);
                }
            }
        }

        metrics::record_node_request(operation, "error");
        Err(last_error)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> NodeResult<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| NodeError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| NodeError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<NodeErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(NodeError::NotFound(message))
        } else {
            Err(NodeError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl NodeClient for AptosClient {
    async fn get_account_resources(&self, address: &str) -> NodeResult<Vec<AccountResource>> {
        self.get_json("account_resources", &format!("/accounts/{}/resources", address), &[])
            .await
    }

    async fn get_account_transactions(
        &self,
        address: &str,
        query: TransactionQuery,
    ) -> NodeResult<Vec<Value>> {
        let mut params = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(start) = query.start {
            params.push(("start", start.to_string()));
        }
        self.get_json(
            "account_transactions",
            &format!("/accounts/{}/transactions", address),
            &params,
        )
        .await
    }

    async fn get_account_info(&self, address: &str) -> NodeResult<AccountInfo> {
        self.get_json("account_info", &format!("/accounts/{}", address), &[])
            .await
    }

    async fn is_healthy(&self) -> bool {
        let healthy = self.get_json::<Value>("ledger_info", "", &[]).await.is_ok();
        metrics::record_node_health(healthy);
        healthy
    }
}

impl std::fmt::Debug for AptosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AptosClient")
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
