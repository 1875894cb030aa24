//! Read-only account endpoints backed by the node client.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::blockchain::{CoinBalance, TransactionQuery};
use crate::http::response::{success, ApiError};
use crate::http::server::AppState;

/// Page size used when `limit` is absent or not a positive integer.
pub const DEFAULT_TRANSACTION_LIMIT: u16 = 25;

/// `GET /api/aptos/balance/{address}`
///
/// An account the node does not know has a zero balance.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let balance = match state.node.get_account_resources(&address).await {
        Ok(resources) => CoinBalance::from_resources(&resources).unwrap_or_else(CoinBalance::zero),
        Err(e) if e.is_not_found() => {
            tracing::debug!(address = %address, "Account not on chain, reporting zero balance");
            CoinBalance::zero()
        }
        Err(e) => {
            tracing::error!(address = %address, error = %e, "Failed to fetch balance");
            return Err(ApiError::upstream(
                "Failed to fetch balance",
                &e,
                state.exposes_error_details(),
            ));
        }
    };

    Ok(success(json!({
        "address": address,
        "balance": balance.apt,
        "balanceOctas": balance.octas,
    })))
}

/// `GET /api/aptos/transactions/{address}?limit=&start=`
pub async fn get_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let query = transaction_query(&params)?;

    match state.node.get_account_transactions(&address, query).await {
        Ok(transactions) => {
            let count = transactions.len();
            Ok(success(json!({
                "address": address,
                "transactions": transactions,
                "count": count,
            })))
        }
        Err(e) => {
            tracing::error!(address = %address, error = %e, "Failed to fetch transactions");
            Err(ApiError::upstream(
                "Failed to fetch transactions",
                &e,
                state.exposes_error_details(),
            ))
        }
    }
}

/// `GET /api/aptos/account/{address}`
pub async fn get_account_info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.node.get_account_info(&address).await {
        Ok(account) => Ok(success(json!({ "account": account }))),
        Err(e) if e.is_not_found() => {
            Err(ApiError::not_found("Account not found").with("address", address))
        }
        Err(e) => {
            tracing::error!(address = %address, error = %e, "Failed to fetch account info");
            Err(ApiError::upstream(
                "Failed to fetch account info",
                &e,
                state.exposes_error_details(),
            ))
        }
    }
}

/// Build the node query from raw query parameters.
fn transaction_query(params: &HashMap<String, String>) -> Result<TransactionQuery, ApiError> {
    let limit = params
        .get("limit")
        .and_then(|raw| parse_int_prefix(raw))
        .filter(|n| *n > 0)
        .map(|n| u16::try_from(n).unwrap_or(u16::MAX))
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT);

    let start = match params.get("start").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            ApiError::bad_request("Invalid start parameter").with("start", raw)
        })?),
    };

    Ok(TransactionQuery {
        limit: Some(limit),
        start,
    })
}

/// Leading integer of `raw` after whitespace: `"10abc"` is 10, `"abc"` is
/// `None`. Saturates instead of overflowing.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}
