//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Bound total request time
//!
//! # Design Decisions
//! - Oversized bodies are rejected with 413 before any JSON parsing
//! - Timed out requests return 408 from the timeout layer

use std::time::Duration;

use axum::http::StatusCode;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ListenerConfig;

pub fn body_limit_layer(config: &ListenerConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}

pub fn timeout_layer(config: &ListenerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    )
}
