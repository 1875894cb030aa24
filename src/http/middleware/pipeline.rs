//! Per-route request validation pipeline.
//!
//! # Responsibilities
//! - Run a route's validators in order before its handler
//! - Stop at the first failing validator and answer with its error
//! - Buffer and parse the JSON or form body once, for validators and handlers
//!
//! # Design Decisions
//! - Validators are pure and synchronous; they see the `address` path
//!   parameter and the parsed body, nothing else
//! - Form bodies become an object of string fields, the same shape a JSON
//!   client would send
//! - A missing body, or one of any other type, is treated as an empty
//!   object, so field lookups behave the same as for a body that omits the
//!   field
//! - The parsed body is stored in request extensions as [`JsonBody`]

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::validation::{check_address, check_amount, select_address, AmountParsing};

/// The request body as parsed by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl JsonBody {
    pub fn empty() -> Self {
        JsonBody(Value::Object(Map::new()))
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A field rendered as a string; non-string values use their JSON text.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// What a validator may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RequestFields<'a> {
    pub path_address: Option<&'a str>,
    pub body: &'a Value,
}

/// A single validation stage.
pub trait Validator: Send + Sync {
    /// Stage name used in logs and metrics.
    fn stage(&self) -> &'static str;

    fn validate(&self, fields: &RequestFields<'_>) -> Result<(), ApiError>;
}

/// Requires a well-formed address from the path or the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressValidator;

impl Validator for AddressValidator {
    fn stage(&self) -> &'static str {
        "address"
    }

    fn validate(&self, fields: &RequestFields<'_>) -> Result<(), ApiError> {
        let candidate = select_address(fields.path_address, Some(fields.body));
        check_address(candidate.as_deref()).map_err(ApiError::from)
    }
}

/// Requires a positive, bounded `amount` in the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountValidator {
    parsing: AmountParsing,
}

impl AmountValidator {
    pub fn new(parsing: AmountParsing) -> Self {
        Self { parsing }
    }
}

impl Validator for AmountValidator {
    fn stage(&self) -> &'static str {
        "amount"
    }

    fn validate(&self, fields: &RequestFields<'_>) -> Result<(), ApiError> {
        check_amount(fields.body.get("amount"), self.parsing)
            .map(|_| ())
            .map_err(ApiError::from)
    }
}

/// Ordered, short-circuiting list of validators.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Box<dyn Validator>]>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Validator>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    /// No validators; the body is still parsed for the handler.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn address() -> Self {
        Self::new(vec![Box::new(AddressValidator)])
    }

    pub fn address_and_amount(parsing: AmountParsing) -> Self {
        Self::new(vec![
            Box::new(AddressValidator),
            Box::new(AmountValidator::new(parsing)),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage()).collect()
    }

    /// Run every stage in order, returning the first failure.
    pub fn run(&self, fields: &RequestFields<'_>) -> Result<(), ApiError> {
        for stage in self.stages.iter() {
            if let Err(err) = stage.validate(fields) {
                if let ApiError::Validation { reason, .. } = &err {
                    metrics::record_validation_failure(stage.stage(), *reason);
                }
                tracing::debug!(stage = stage.stage(), error = %err, "Request rejected by validator");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Middleware running `pipeline` for a route.
pub async fn validation_middleware(
    State(pipeline): State<Pipeline>,
    path: Option<Path<HashMap<String, String>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) if exceeded_length_limit(&e) => {
            tracing::debug!("Rejected oversized request body");
            return ApiError::PayloadTooLarge.into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return ApiError::bad_request("Failed to read request body").into_response();
        }
    };

    let parsed = if bytes.is_empty() {
        JsonBody::empty()
    } else {
        match body_kind(&parts.headers) {
            Some(BodyKind::Json) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => JsonBody(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected malformed JSON body");
                    return ApiError::bad_request("Invalid JSON body").into_response();
                }
            },
            Some(BodyKind::Form) => parse_form(&bytes),
            None => JsonBody::empty(),
        }
    };

    let path_address = path.as_ref().and_then(|Path(params)| params.get("address"));
    let fields = RequestFields {
        path_address: path_address.map(String::as_str),
        body: &parsed.0,
    };

    if let Err(err) = pipeline.run(&fields) {
        return err.into_response();
    }

    parts.extensions.insert(parsed);
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let mime = headers
        .get(header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .split(';')
        .next()?
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        Some(BodyKind::Json)
    } else if mime == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else {
        None
    }
}

/// Decode a form body into string fields; a repeated key keeps its last value.
fn parse_form(bytes: &[u8]) -> JsonBody {
    let fields = form_urlencoded::parse(bytes)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect::<Map<String, Value>>();
    JsonBody(Value::Object(fields))
}

/// Whether a body read failed because the body limit layer cut it off.
fn exceeded_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
