//! Transfer pre-flight validation.
//!
//! Nothing is signed or submitted here. The client signs with its own
//! wallet; this endpoint only checks that the sender can cover the amount.

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::blockchain::CoinBalance;
use crate::http::middleware::JsonBody;
use crate::http::response::{success, ApiError};
use crate::http::server::AppState;
use crate::validation::{is_valid_address, parse_amount, AddressError};

/// `POST /api/aptos/send`
pub async fn send_tokens(
    State(state): State<AppState>,
    Extension(body): Extension<JsonBody>,
) -> Result<Json<Value>, ApiError> {
    let recipient = body.text("recipient").filter(|s| !s.is_empty());
    let sender = body.text("sender").filter(|s| !s.is_empty());
    let amount = body
        .field("amount")
        .and_then(|v| parse_amount(v, state.config.validation.amount_parsing()));

    let (Some(recipient), Some(sender), Some(amount)) = (recipient, sender, amount) else {
        return Err(ApiError::bad_request(
            "Missing required parameters: recipient, amount, sender",
        ));
    };

    // The pipeline validated whichever address came first; the sender is
    // also used in a node URL.
    if !is_valid_address(&sender) {
        return Err(ApiError::from(AddressError::Malformed { provided: sender }));
    }

    let balance = match state.node.get_account_resources(&sender).await {
        Ok(resources) => CoinBalance::from_resources(&resources),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            tracing::error!(sender = %sender, error = %e, "Failed to validate transaction");
            return Err(ApiError::upstream(
                "Failed to validate transaction",
                &e,
                state.exposes_error_details(),
            ));
        }
    };

    let Some(balance) = balance else {
        return Err(ApiError::bad_request("Sender has no APT balance"));
    };

    if balance.apt < amount {
        tracing::debug!(sender = %sender, available = balance.apt, requested = amount, "Insufficient balance");
        return Err(ApiError::bad_request("Insufficient balance")
            .with("available", balance.apt)
            .with("requested", amount));
    }

    tracing::info!(sender = %sender, recipient = %recipient, amount, "Transfer parameters validated");

    Ok(success(json!({
        "message": "Transaction parameters validated",
        "sender": sender,
        "recipient": recipient,
        "amount": amount,
        "senderBalance": balance.apt,
    })))
}
