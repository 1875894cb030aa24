//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides (loader.rs)
//!     → CLI overrides (lifecycle::startup)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, apply_overrides_from, load_config, read_config_file, ConfigError};
pub use schema::{
    AdminConfig, CorsConfig, Environment, GatewayConfig, ListenerConfig, NodeConfig,
    ObservabilityConfig, RateLimitConfig, ValidationConfig,
};
pub use validation::{validate_config, ValidationError};
