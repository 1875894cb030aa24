//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → NodeClient trait (client.rs)
//!     → AptosClient: REST call with timeout, failover on transport errors
//!     → types.rs (resources, account info, balance shaping)
//! ```
//!
//! # Constraints
//! - Read-only: nothing here signs or submits transactions
//! - All node calls have configurable timeouts
//! - "Not found" stays distinguishable from every other failure

pub mod client;
pub mod types;

pub use client::{AptosClient, NodeClient};
pub use types::{
    AccountInfo, AccountResource, CoinBalance, NodeError, NodeResult, TransactionQuery,
    APT_COIN_STORE,
};
