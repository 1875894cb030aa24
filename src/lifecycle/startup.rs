//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration from defaults, file, environment and CLI
//! - Validate the result before anything binds a socket
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal
//! - Later layers win: CLI over environment over file over defaults
//! - Every validation problem is reported at once

use std::path::Path;

use crate::config::{
    apply_overrides_from, read_config_file, validate_config, ConfigError, GatewayConfig,
};

/// Values supplied on the command line. `None` leaves the lower layers
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub node_url: Option<String>,
}

impl CliOverrides {
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(url) = &self.node_url {
            config.node.url = url.clone();
        }
    }
}

/// Resolve the configuration using the process environment.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<GatewayConfig, ConfigError> {
    resolve_config_with(path, overrides, |var| std::env::var(var).ok())
}

/// Resolve the configuration with an explicit environment lookup.
pub fn resolve_config_with<F>(
    path: Option<&Path>,
    overrides: &CliOverrides,
    lookup: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_overrides_from(&mut config, lookup)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_only() {
        let config = resolve_config_with(None, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(config.listener.port, 5000);
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let path = std::env::temp_dir().join(format!("gateway-startup-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[listener]\nport = 6000\n\n[node]\nurl = \"http://file.example/v1\"").unwrap();

        let env = |var: &str| match var {
            "PORT" => Some("7000".to_string()),
            "APTOS_NODE_URL" => Some("http://env.example/v1".to_string()),
            _ => None,
        };
        let overrides = CliOverrides {
            port: Some(8000),
            ..Default::default()
        };

        let config = resolve_config_with(Some(&path), &overrides, env).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.listener.port, 8000);
        assert_eq!(config.node.url, "http://env.example/v1");
    }

    #[test]
    fn test_invalid_result_is_rejected() {
        let overrides = CliOverrides {
            node_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = resolve_config_with(None, &overrides, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
