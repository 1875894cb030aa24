//! Aptos address validation.
//!
//! An address is `0x` followed by 1 to 64 hexadecimal characters, in either
//! case. Validation is syntactic only: nothing here asks the chain whether
//! the account exists, and the input is never normalized.

use serde_json::Value;
use thiserror::Error;

/// Human-readable description of an acceptable address.
pub const ADDRESS_EXPECTATION: &str = "0x followed by 1-64 hexadecimal characters";

/// Maximum number of hex digits after the `0x` prefix.
pub const MAX_ADDRESS_HEX_DIGITS: usize = 64;

/// Body fields consulted, in order, when no path address is present.
pub const BODY_ADDRESS_FIELDS: [&str; 3] = ["recipient", "sender", "admin"];

/// Reasons an address candidate is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// No source supplied a non-empty address.
    #[error("Address is required")]
    Missing,

    /// A value was supplied but does not look like an address.
    #[error("Invalid Aptos address format")]
    Malformed { provided: String },
}

impl AddressError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            AddressError::Missing => "missing",
            AddressError::Malformed { .. } => "malformed",
        }
    }
}

/// Returns true iff `candidate` matches `^0x[a-fA-F0-9]{1,64}$`.
pub fn is_valid_address(candidate: &str) -> bool {
    match candidate.strip_prefix("0x") {
        Some(hex) => {
            (1..=MAX_ADDRESS_HEX_DIGITS).contains(&hex.len())
                && hex.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Pick the address to validate: the path parameter first, then the body
/// fields `recipient`, `sender`, `admin`. The first non-empty value wins.
///
/// Non-string body values count when they are truthy (a non-zero number,
/// `true`, an array or object) and are rendered as JSON text so they fail
/// the format check rather than being silently skipped.
pub fn select_address(path: Option<&str>, body: Option<&Value>) -> Option<String> {
    if let Some(p) = path.filter(|p| !p.is_empty()) {
        return Some(p.to_string());
    }

    let body = body?;
    BODY_ADDRESS_FIELDS
        .iter()
        .filter_map(|field| body.get(*field))
        .find_map(render_truthy)
}

fn render_truthy(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Validate an already-selected candidate.
pub fn check_address(candidate: Option<&str>) -> Result<(), AddressError> {
    match candidate {
        None => Err(AddressError::Missing),
        Some(s) if s.is_empty() => Err(AddressError::Missing),
        Some(s) if is_valid_address(s) => Ok(()),
        Some(s) => Err(AddressError::Malformed {
            provided: s.to_string(),
        }),
    }
}
