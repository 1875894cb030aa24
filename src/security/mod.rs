//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size, request timeout)
//!     → headers.rs (CORS preflight; hardening headers on the way out)
//!     → identity.rs (resolve client key)
//!     → rate_limit.rs (fixed-window check per client)
//!     → request pipeline validators
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Rate limiting runs before validation so rejected clients cost nothing
//! - No trust in client input (X-Forwarded-For only when configured)

pub mod headers;
pub mod identity;
pub mod limits;
pub mod rate_limit;

pub use identity::ClientIdentity;
pub use rate_limit::{rate_limit_middleware, RateDecision, RateLimiter};
