//! Aptos REST types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Resource type holding an account's APT coins.
pub const APT_COIN_STORE: &str = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>";

/// Octas per APT (8 decimal places).
pub const OCTAS_PER_APT: f64 = 100_000_000.0;

/// Errors that can occur while talking to the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The account or resource does not exist on chain.
    #[error("not found: {0}")]
    NotFound(String),

    /// The node answered with a non-success status.
    #[error("node returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection or protocol failure.
    #[error("node request failed: {0}")]
    Transport(String),

    /// Request did not complete in time.
    #[error("node request timed out after {0} seconds")]
    Timeout(u64),

    /// Response body did not match the expected shape.
    #[error("malformed node response: {0}")]
    Decode(String),

    /// Configured endpoint cannot be used.
    #[error("invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl NodeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound(_))
    }

    /// Whether another endpoint might answer differently.
    pub fn is_retryable(&self) -> bool {
        match self {
            NodeError::Transport(_) | NodeError::Timeout(_) => true,
            NodeError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Error body returned by the Aptos REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeErrorBody {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// A Move resource stored under an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: Value,
}

/// Core account data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub sequence_number: String,
    pub authentication_key: String,
}

/// Paging options for account transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionQuery {
    pub limit: Option<u16>,
    pub start: Option<u64>,
}

/// APT balance extracted from an account's coin store.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinBalance {
    /// Raw on-chain value, as the node reported it.
    pub octas: String,
    /// Value converted to APT.
    pub apt: f64,
}

impl CoinBalance {
    pub fn zero() -> Self {
        Self {
            octas: "0".to_string(),
            apt: 0.0,
        }
    }

    /// Find the APT coin store among `resources`. `None` means the account
    /// has never held APT.
    pub fn from_resources(resources: &[AccountResource]) -> Option<Self> {
        let store = resources.iter().find(|r| r.resource_type == APT_COIN_STORE)?;
        let octas = match store.data.pointer("/coin/value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "0".to_string(),
        };
        let apt = octas.parse::<u64>().map(octas_to_apt).unwrap_or(0.0);
        Some(Self { octas, apt })
    }
}

pub fn octas_to_apt(octas: u64) -> f64 {
    octas as f64 / OCTAS_PER_APT
}
