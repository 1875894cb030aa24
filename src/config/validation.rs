//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, timeouts > 0)
//! - Validate URLs and socket addresses before they reach subsystems
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::validation::address::is_valid_address;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: invalid socket address '{value}'")]
    InvalidSocketAddr { field: &'static str, value: String },

    #[error("admin.addresses: '{0}' is not a valid address")]
    InvalidAdminAddress(String),

    #[error("cors.allowed_origin: '{0}' is not a valid header value")]
    InvalidOrigin(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.node.url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "node.url",
            value: config.node.url.clone(),
        });
    }
    for failover in &config.node.failover_urls {
        if url::Url::parse(failover).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: "node.failover_urls",
                value: failover.clone(),
            });
        }
    }
    if config.node.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "node.timeout_secs" });
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.request_timeout_secs" });
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_body_size" });
    }
    let bind = config.listener.bind_address();
    if bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "listener",
            value: bind,
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError::Zero { field: "rate_limit.window_ms" });
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::Zero { field: "rate_limit.max_requests" });
        }
        if config.rate_limit.sweep_interval_secs == 0 {
            errors.push(ValidationError::Zero { field: "rate_limit.sweep_interval_secs" });
        }
    }

    for address in &config.admin.addresses {
        if !is_valid_address(address) {
            errors.push(ValidationError::InvalidAdminAddress(address.clone()));
        }
    }

    if axum::http::HeaderValue::from_str(&config.cors.allowed_origin).is_err() {
        errors.push(ValidationError::InvalidOrigin(config.cors.allowed_origin.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.node.url = "not a url".to_string();
        config.rate_limit.window_ms = 0;
        config.admin.addresses = vec!["0x1".to_string(), "admin".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::InvalidAdminAddress("admin".to_string())));
        assert!(errors.contains(&ValidationError::Zero { field: "rate_limit.window_ms" }));
    }

    #[test]
    fn test_disabled_rate_limit_skips_window_checks() {
        let mut config = GatewayConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.window_ms = 0;
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_listener_host() {
        let mut config = GatewayConfig::default();
        config.listener.host = "not-an-ip".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidSocketAddr { field: "listener", .. }));
    }
}
