//! Liveness, service index and the catch-all 404.

use axum::{
    extract::OriginalUri,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::http::response::{success, ApiError};

pub const SERVICE_NAME: &str = "Aptos Gateway";

/// `GET /api/health`. Never touches the node.
pub async fn health() -> Json<Value> {
    success(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "service": SERVICE_NAME,
    }))
}

/// `GET /`
pub async fn index() -> Json<Value> {
    success(json!({
        "message": format!("{SERVICE_NAME} API"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "aptos": "/api/aptos",
            "auth": "/api/auth",
        },
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    tracing::debug!(path = %path, "No route matched");
    ApiError::not_found("Route not found")
        .with("path", path)
        .into_response()
}
