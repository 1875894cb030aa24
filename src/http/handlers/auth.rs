//! Wallet authentication endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::http::middleware::JsonBody;
use crate::http::response::success;
use crate::http::server::AppState;

/// `POST /api/auth/verify`
///
/// Signature checking is not implemented, so the answer is always
/// `verified: false` and the submitted fields are echoed back.
pub async fn verify_signature(Extension(body): Extension<JsonBody>) -> Json<Value> {
    let field = |name: &str| body.field(name).cloned().unwrap_or(Value::Null);

    success(json!({
        "verified": false,
        "message": "Signature verification not yet implemented",
        "data": {
            "signature": field("signature"),
            "message": field("message"),
            "publicKey": field("publicKey"),
        },
    }))
}

/// `GET /api/auth/profile/{address}`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<Value> {
    let is_admin = state.admins.is_admin(&address);

    success(json!({
        "profile": {
            "address": address,
            "role": if is_admin { "admin" } else { "user" },
            "permissions": {
                "canMint": is_admin,
                "canSend": true,
                "canReceive": true,
            },
            "createdAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }))
}
