//! Response envelopes and the error taxonomy.
//!
//! Every JSON response carries a `success` flag. Failures add an `error`
//! message plus any context fields; successes flatten their payload next to
//! the flag.
//!
//! # Status mapping
//! - `Validation`, `BadRequest` → 400
//! - `Unauthorized` → 403
//! - `NotFound` → 404
//! - `PayloadTooLarge` → 413
//! - `RateLimited` → 429 (with `Retry-After`)
//! - `Upstream`, `Internal` → 500

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::blockchain::NodeError;
use crate::validation::{AddressError, AmountError, ADDRESS_EXPECTATION};

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request field failed validation.
    #[error("{message}")]
    Validation {
        message: String,
        field: &'static str,
        reason: &'static str,
        context: Map<String, Value>,
    },

    /// The request is well formed but cannot be acted on.
    #[error("{message}")]
    BadRequest {
        message: String,
        context: Map<String, Value>,
    },

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Too many requests")]
    RateLimited {
        reset_at: DateTime<Utc>,
        retry_after: Duration,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        context: Map<String, Value>,
    },

    #[error("{message}")]
    Unauthorized { message: String },

    /// The blockchain node failed. `details` is only set when the
    /// environment allows exposing internals.
    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },

    #[error("Something went wrong!")]
    Internal { details: Option<String> },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            context: Map::new(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Translate a node failure, keeping its text only when `expose` is set.
    pub fn upstream(message: impl Into<String>, error: &NodeError, expose: bool) -> Self {
        ApiError::Upstream {
            message: message.into(),
            details: expose.then(|| error.to_string()),
        }
    }

    /// Attach a context field to the error envelope. Variants without a
    /// context map are returned unchanged.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        match &mut self {
            ApiError::Validation { context, .. }
            | ApiError::BadRequest { context, .. }
            | ApiError::NotFound { context, .. } => {
                context.insert(key.to_string(), value.into());
            }
            _ => {}
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::Upstream { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The JSON envelope for this error.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(self.to_string()));

        match self {
            ApiError::Validation { field, context, .. } => {
                body.insert("field".to_string(), Value::String((*field).to_string()));
                body.extend(context.clone());
            }
            ApiError::BadRequest { context, .. } | ApiError::NotFound { context, .. } => {
                body.extend(context.clone());
            }
            ApiError::RateLimited { reset_at, .. } => {
                body.insert(
                    "resetTime".to_string(),
                    Value::String(reset_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
            }
            ApiError::Upstream { details, .. } => {
                if let Some(details) = details {
                    body.insert("details".to_string(), Value::String(details.clone()));
                }
            }
            ApiError::Internal { details } => {
                let message = details.clone().unwrap_or_else(|| "Internal server error".to_string());
                body.insert("message".to_string(), Value::String(message));
            }
            ApiError::Unauthorized { .. } | ApiError::PayloadTooLarge => {}
        }

        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();

        if let ApiError::RateLimited { retry_after, .. } = &self {
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<AddressError> for ApiError {
    fn from(err: AddressError) -> Self {
        let reason = err.reason();
        let message = err.to_string();
        match err {
            AddressError::Missing => ApiError::Validation {
                message,
                field: "address",
                reason,
                context: Map::new(),
            },
            AddressError::Malformed { provided } => ApiError::Validation {
                message,
                field: "address",
                reason,
                context: Map::new(),
            }
            .with("provided", provided)
            .with("expected", ADDRESS_EXPECTATION),
        }
    }
}

impl From<AmountError> for ApiError {
    fn from(err: AmountError) -> Self {
        let provided = err.provided().cloned();
        let error = ApiError::Validation {
            message: err.to_string(),
            field: "amount",
            reason: err.reason(),
            context: Map::new(),
        };
        match provided {
            Some(value) => error.with("provided", value),
            None => error,
        }
    }
}

/// Wrap a payload in the success envelope. Object payloads are flattened
/// next to `success`; anything else lands under `data`.
pub fn success(payload: Value) -> Json<Value> {
    match payload {
        Value::Object(fields) => {
            let mut body = Map::new();
            body.insert("success".to_string(), Value::Bool(true));
            body.extend(fields);
            Json(Value::Object(body))
        }
        other => Json(json!({ "success": true, "data": other })),
    }
}
