//! Admin subsystem.
//!
//! # Responsibilities
//! - Hold the admin allow-list
//! - Serve allow-list status and the mock mint under `/api/aptos`

pub mod allow_list;
pub mod handlers;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::http::middleware::{validation_middleware, Pipeline};
use crate::http::server::AppState;
use crate::validation::AmountParsing;

use self::handlers::{check_admin_status, mint_tokens};

pub use allow_list::AdminAllowList;

/// Admin routes, relative to `/api/aptos`.
pub fn admin_routes(parsing: AmountParsing) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/{address}",
            get(check_admin_status)
                .route_layer(from_fn_with_state(Pipeline::address(), validation_middleware)),
        )
        .route(
            "/mint",
            post(mint_tokens).route_layer(from_fn_with_state(
                Pipeline::address_and_amount(parsing),
                validation_middleware,
            )),
        )
}
