//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AdminConfig, Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without semantic validation.
pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Apply environment overrides from the process environment.
pub fn apply_env_overrides(config: &mut GatewayConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply environment-style overrides from an arbitrary lookup.
///
/// Recognized variables: `APTOS_NODE_URL`, `ADMIN_ADDRESSES`, `FRONTEND_URL`,
/// `PORT`, `NODE_ENV`, `RATE_LIMIT_WINDOW_MS`, `RATE_LIMIT_MAX_REQUESTS`.
pub fn apply_overrides_from<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("APTOS_NODE_URL").filter(|v| !v.trim().is_empty()) {
        config.node.url = url.trim().to_string();
    }
    if let Some(raw) = lookup("ADMIN_ADDRESSES") {
        config.admin.addresses = AdminConfig::parse_list(&raw);
    }
    if let Some(origin) = lookup("FRONTEND_URL").filter(|v| !v.trim().is_empty()) {
        config.cors.allowed_origin = origin.trim().to_string();
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = parse_var("PORT", &port)?;
    }
    if let Some(env) = lookup("NODE_ENV").filter(|v| !v.trim().is_empty()) {
        config.environment = Environment::from(env);
    }
    if let Some(window) = lookup("RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.window_ms = parse_var("RATE_LIMIT_WINDOW_MS", &window)?;
    }
    if let Some(max) = lookup("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = parse_var("RATE_LIMIT_MAX_REQUESTS", &max)?;
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_overrides_from(
            &mut config,
            lookup(&[
                ("APTOS_NODE_URL", "http://127.0.0.1:8080/v1"),
                ("ADMIN_ADDRESSES", "0x1, 0x2"),
                ("FRONTEND_URL", "https://campus.example"),
                ("PORT", "7000"),
                ("NODE_ENV", "production"),
                ("RATE_LIMIT_MAX_REQUESTS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.node.url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.admin.addresses, vec!["0x1", "0x2"]);
        assert_eq!(config.cors.allowed_origin, "https://campus.example");
        assert_eq!(config.listener.port, 7000);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_ms, 60_000);
    }

    #[test]
    fn test_any_node_env_is_accepted() {
        let mut config = GatewayConfig::default();
        apply_overrides_from(&mut config, lookup(&[("NODE_ENV", "test")])).unwrap();
        assert_eq!(config.environment, Environment::Other("test".to_string()));
        assert!(config.environment.exposes_upstream_details());
        assert!(!config.environment.exposes_panic_details());

        let mut config = GatewayConfig::default();
        apply_overrides_from(&mut config, lookup(&[("NODE_ENV", "")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_bad_port_is_reported() {
        let mut config = GatewayConfig::default();
        let err = apply_overrides_from(&mut config, lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("aptos-gateway-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[node]\nurl = \"http://localhost:8080/v1\"\n\n[admin]\naddresses = [\"0xabc\"]\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.node.url, "http://localhost:8080/v1");
        assert_eq!(config.admin.addresses, vec!["0xabc"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let path = std::env::temp_dir().join(format!("aptos-gateway-bad-{}.toml", std::process::id()));
        fs::write(&path, "[admin]\naddresses = [\"root\"]\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("root"));
        let _ = fs::remove_file(&path);
    }
}
