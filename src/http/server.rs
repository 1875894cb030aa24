//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Compose per-route validation pipelines
//! - Wire up middleware (request ID, tracing, panics, CORS, limits, metrics)
//! - Mount the rate limiter on the API routes
//! - Serve with graceful shutdown and run the rate-limit sweeper
//!
//! # Layer order (outermost first)
//! ```text
//! request id → trace → propagate id → catch panic → CORS → body limit
//!     → timeout → security headers → metrics → [rate limit] → [validators] → handler
//! ```

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{from_fn, from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::admin::{admin_routes, AdminAllowList};
use crate::blockchain::NodeClient;
use crate::config::GatewayConfig;
use crate::http::handlers::{account, auth, health, transfer};
use crate::http::middleware::{validation_middleware, Pipeline};
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::headers::{cors_layer, with_security_headers};
use crate::security::limits::{body_limit_layer, timeout_layer};
use crate::security::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub node: Arc<dyn NodeClient>,
    pub admins: Arc<AdminAllowList>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: GatewayConfig, node: Arc<dyn NodeClient>) -> Self {
        let admins = Arc::new(AdminAllowList::from_config(&config.admin));
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);
        Self {
            config: Arc::new(config),
            node,
            admins,
            rate_limiter,
        }
    }

    /// Whether node error text may be returned to clients.
    pub fn exposes_error_details(&self) -> bool {
        self.config.environment.exposes_upstream_details()
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    state: AppState,
    router: Router,
}

impl GatewayServer {
    /// Create a new server with the given configuration and node client.
    pub fn new(config: GatewayConfig, node: Arc<dyn NodeClient>) -> Self {
        let state = AppState::new(config, node);
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = &self.state.config;
        tracing::info!(
            address = %addr,
            environment = config.environment.as_str(),
            rate_limit_enabled = config.rate_limit.enabled,
            "HTTP server starting"
        );

        let sweeper = config.rate_limit.enabled.then(|| {
            self.state.rate_limiter.start_sweeper(
                Duration::from_secs(config.rate_limit.sweep_interval_secs),
                shutdown.resubscribe(),
            )
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        result?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all routes and middleware layers.
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let parsing = config.validation.amount_parsing();
    let expose_panics = config.environment.exposes_panic_details();

    let aptos = Router::new()
        .route(
            "/balance/{address}",
            get(account::get_balance)
                .route_layer(from_fn_with_state(Pipeline::address(), validation_middleware)),
        )
        .route(
            "/transactions/{address}",
            get(account::get_transactions)
                .route_layer(from_fn_with_state(Pipeline::address(), validation_middleware)),
        )
        .route(
            "/account/{address}",
            get(account::get_account_info)
                .route_layer(from_fn_with_state(Pipeline::address(), validation_middleware)),
        )
        .route(
            "/send",
            post(transfer::send_tokens).route_layer(from_fn_with_state(
                Pipeline::address_and_amount(parsing),
                validation_middleware,
            )),
        )
        .merge(admin_routes(parsing));

    let auth = Router::new()
        .route(
            "/verify",
            post(auth::verify_signature)
                .route_layer(from_fn_with_state(Pipeline::empty(), validation_middleware)),
        )
        .route(
            "/profile/{address}",
            get(auth::get_profile)
                .route_layer(from_fn_with_state(Pipeline::address(), validation_middleware)),
        );

    let mut api = Router::new().nest("/aptos", aptos).nest("/auth", auth);
    if config.rate_limit.enabled {
        api = api.layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ));
    }
    // Added after the limiter so liveness probes are never throttled.
    let api = api.route("/health", get(health::health));

    let router = Router::new()
        .nest("/api", api)
        .route("/", get(health::index))
        .fallback(health::not_found)
        .with_state(state)
        .layer(from_fn(track_metrics));

    with_security_headers(router)
        .layer(timeout_layer(&config.listener))
        .layer(body_limit_layer(&config.listener))
        .layer(cors_layer(&config.cors))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(panic, expose_panics)
        }))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id_of(request),
            )
        }))
        .layer(set_request_id_layer())
}

/// Record request count and latency by matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}

/// Generic 500 for a handler panic; the panic message is only shown when
/// `expose` is set.
fn panic_response(panic: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %message, "Handler panicked");

    ApiError::Internal {
        details: expose.then_some(message),
    }
    .into_response()
}
