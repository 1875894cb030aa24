//! Aptos HTTP gateway.
//!
//! A thin REST gateway in front of an Aptos fullnode: balance, transaction
//! history and account lookups, plus validation-only send, mock mint and
//! admin checks.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server (global layers: request id, trace, CORS, limits)
//!                    │
//!                    ▼
//!              security::rate_limit (per-client fixed window, /api only)
//!                    │
//!                    ▼
//!              http::middleware::pipeline (address → amount validators)
//!                    │
//!                    ▼
//!              http::handlers / admin ──▶ blockchain::NodeClient ──▶ Aptos node
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

// Core subsystems
pub mod blockchain;
pub mod config;
pub mod http;
pub mod validation;

// Features
pub mod admin;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
