//! Admin endpoints: allow-list status and the mock mint.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::http::middleware::JsonBody;
use crate::http::response::{success, ApiError};
use crate::http::server::AppState;
use crate::validation::parse_amount;

/// `GET /api/aptos/admin/{address}`
pub async fn check_admin_status(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<Value> {
    let is_admin = state.admins.is_admin(&address);
    tracing::debug!(address = %address, is_admin, "Admin status checked");

    success(json!({
        "address": address,
        "isAdmin": is_admin,
        "adminAddresses": state.admins.len(),
    }))
}

/// `POST /api/aptos/mint`
///
/// Mock: authorizes and echoes the request, nothing is minted on chain.
pub async fn mint_tokens(
    State(state): State<AppState>,
    Extension(body): Extension<JsonBody>,
) -> Result<Json<Value>, ApiError> {
    let admin = body.text("admin");
    let authorized = admin
        .as_deref()
        .is_some_and(|a| state.admins.contains_exact(a));

    if !authorized {
        tracing::warn!(admin = ?admin, "Mint rejected: not an admin");
        return Err(ApiError::unauthorized(
            "Unauthorized: Admin privileges required",
        ));
    }

    let amount = body
        .field("amount")
        .and_then(|v| parse_amount(v, state.config.validation.amount_parsing()));

    tracing::info!(admin = ?admin, amount = ?amount, "Mint request validated");

    Ok(success(json!({
        "message": "Mint request validated (mock implementation)",
        "admin": admin,
        "recipient": body.field("recipient").cloned().unwrap_or(Value::Null),
        "amount": amount,
        "note": "No tokens were minted; a real deployment would call a coin contract",
    })))
}
