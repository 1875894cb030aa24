//! Route handlers.
//!
//! Handlers assume the validation pipeline already ran for their route and
//! translate node failures into [`ApiError`](crate::http::response::ApiError).

pub mod account;
pub mod auth;
pub mod health;
pub mod transfer;
