//! Transfer amount validation.
//!
//! Amounts arrive as JSON numbers or strings and are only parsed to decide
//! whether the request may continue; handlers read the original value again.
//!
//! The default parse takes the longest leading decimal prefix of the text,
//! so `"5abc"` reads as 5 and `"  2.5e1xyz"` as 25. Strict mode requires the
//! whole (trimmed) string to be a decimal literal.

use serde_json::Value;
use thiserror::Error;

/// Largest accepted amount, in APT.
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// How amount text is turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountParsing {
    /// Accept the longest numeric prefix and ignore trailing characters.
    #[default]
    Prefix,
    /// The whole value must be numeric.
    Strict,
}

/// Reasons an amount is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("Amount is required")]
    Missing,

    #[error("Amount must be a positive number")]
    NotANumber { provided: Value },

    #[error("Amount must be a positive number")]
    NonPositive { provided: Value },

    #[error("Amount too large (max: 1,000,000 APT)")]
    TooLarge { provided: Value },
}

impl AmountError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            AmountError::Missing => "missing",
            AmountError::NotANumber { .. } => "not_a_number",
            AmountError::NonPositive { .. } => "non_positive",
            AmountError::TooLarge { .. } => "too_large",
        }
    }

    /// The offending value, when one was supplied.
    pub fn provided(&self) -> Option<&Value> {
        match self {
            AmountError::Missing => None,
            AmountError::NotANumber { provided }
            | AmountError::NonPositive { provided }
            | AmountError::TooLarge { provided } => Some(provided),
        }
    }
}

/// Validate the `amount` body value, returning the parsed number.
pub fn check_amount(value: Option<&Value>, parsing: AmountParsing) -> Result<f64, AmountError> {
    let value = match value {
        None | Some(Value::Null) => return Err(AmountError::Missing),
        Some(v) => v,
    };

    let parsed = match parse_amount(value, parsing) {
        Some(n) if !n.is_nan() => n,
        _ => {
            return Err(AmountError::NotANumber {
                provided: value.clone(),
            })
        }
    };

    if parsed <= 0.0 {
        return Err(AmountError::NonPositive {
            provided: value.clone(),
        });
    }
    if parsed > MAX_AMOUNT {
        return Err(AmountError::TooLarge {
            provided: value.clone(),
        });
    }
    Ok(parsed)
}

/// Read a JSON value as a number. Only numbers and strings are numeric.
pub fn parse_amount(value: &Value, parsing: AmountParsing) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match parsing {
            AmountParsing::Prefix => parse_float_prefix(s).map(|(n, _)| n),
            AmountParsing::Strict => {
                let trimmed = s.trim();
                match parse_float_prefix(trimmed) {
                    Some((n, consumed)) if consumed == trimmed.len() => Some(n),
                    _ => None,
                }
            }
        },
        _ => None,
    }
}

/// Parse the longest decimal literal at the start of `text` after leading
/// whitespace. Returns the value and the byte offset just past the literal.
///
/// Grammar: `[+-]? (Infinity | digits [. digits?]? | . digits) ([eE] [+-]? digits)?`
pub fn parse_float_prefix(text: &str) -> Option<(f64, usize)> {
    let start = text.len() - text.trim_start().len();
    let bytes = text.as_bytes();
    let mut i = start;

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    if text[i..].starts_with("Infinity") {
        let value = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some((value, i + "Infinity".len()));
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut literal = text[int_start..i].to_string();

    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if !literal.is_empty() || j > frac_start {
            if j > frac_start {
                literal.push('.');
                literal.push_str(&text[frac_start..j]);
            }
            i = j;
        }
    }

    if literal.is_empty() {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            literal.push('e');
            literal.push_str(&text[i + 1..j]);
            i = j;
        }
    }

    let magnitude: f64 = literal.parse().ok()?;
    Some((if negative { -magnitude } else { magnitude }, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: Value) -> Result<f64, AmountError> {
        check_amount(Some(&value), AmountParsing::Prefix)
    }

    #[test]
    fn test_accepts_positive_amounts() {
        assert_eq!(check(json!("5")).unwrap(), 5.0);
        assert_eq!(check(json!(0.5)).unwrap(), 0.5);
        assert_eq!(check(json!("1000000")).unwrap(), 1_000_000.0);
        assert_eq!(check(json!(".25")).unwrap(), 0.25);
    }

    #[test]
    fn test_missing_amount() {
        assert_eq!(check_amount(None, AmountParsing::Prefix), Err(AmountError::Missing));
        assert_eq!(check(Value::Null), Err(AmountError::Missing));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(check(json!("0")).unwrap_err().reason(), "non_positive");
        assert_eq!(check(json!(-3)).unwrap_err().reason(), "non_positive");
        assert_eq!(check(json!("-0")).unwrap_err().reason(), "non_positive");
        assert_eq!(check(json!("1000001")).unwrap_err().reason(), "too_large");
        assert_eq!(check(json!("Infinity")).unwrap_err().reason(), "too_large");
        assert_eq!(check(json!("abc")).unwrap_err().reason(), "not_a_number");
        assert_eq!(check(json!("")).unwrap_err().reason(), "not_a_number");
        assert_eq!(check(json!(true)).unwrap_err().reason(), "not_a_number");
        assert_eq!(check(json!({ "v": 1 })).unwrap_err().reason(), "not_a_number");
    }

    #[test]
    fn test_rejection_keeps_provided_value() {
        let err = check(json!("1000001")).unwrap_err();
        assert_eq!(err.provided(), Some(&json!("1000001")));
        assert_eq!(err.to_string(), "Amount too large (max: 1,000,000 APT)");
    }

    #[test]
    fn test_prefix_parsing_is_permissive() {
        assert_eq!(check(json!("5abc")).unwrap(), 5.0);
        assert_eq!(check(json!("  2.5e1xyz")).unwrap(), 25.0);
        assert_eq!(check(json!("7.")).unwrap(), 7.0);
        assert_eq!(check(json!("3e")).unwrap(), 3.0);
    }

    #[test]
    fn test_strict_parsing() {
        let strict = |v: Value| check_amount(Some(&v), AmountParsing::Strict);
        assert_eq!(strict(json!("5abc")).unwrap_err().reason(), "not_a_number");
        assert_eq!(strict(json!(" 12.5 ")).unwrap(), 12.5);
        assert_eq!(strict(json!("1e3")).unwrap(), 1000.0);
        assert_eq!(strict(json!(8)).unwrap(), 8.0);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("42"), Some((42.0, 2)));
        assert_eq!(parse_float_prefix("-1.5kg"), Some((-1.5, 4)));
        assert_eq!(parse_float_prefix("+.5"), Some((0.5, 3)));
        assert_eq!(parse_float_prefix("1e+2x"), Some((100.0, 4)));
        assert_eq!(parse_float_prefix("-Infinity"), Some((f64::NEG_INFINITY, 9)));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("e5"), None);
        assert_eq!(parse_float_prefix("infinity"), None);
    }
}
