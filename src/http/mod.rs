//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, global layers)
//!     → request.rs (request ID)
//!     → security rate limiter (API routes only)
//!     → middleware/pipeline.rs (per-route validators, body parsing)
//!     → handlers/ (node calls, response shaping)
//!     → response.rs (success / error envelopes)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{build_router, AppState, GatewayServer};
