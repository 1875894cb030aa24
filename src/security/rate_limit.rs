//! Per-client rate limiting with fixed windows.
//!
//! Each client identity owns one window: a request counter and the instant
//! at which the window resets. The first request after the reset instant
//! starts a fresh window with a count of one. Bursts straddling a window
//! boundary can therefore admit up to twice `max_requests` in a short span.
//!
//! The read-modify-write of a window happens under the DashMap shard lock
//! for that key, so concurrent requests from one client cannot both observe
//! a free slot when only one remains.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::identity::ClientIdentity;

/// Counter state for one client.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    request_count: u32,
    reset_at: Instant,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; `remaining` more fit in the current window.
    Allowed { remaining: u32 },
    /// Request rejected until the window resets.
    Limited {
        reset_at: DateTime<Utc>,
        retry_after: Duration,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Fixed-window rate limiter keyed by client identity.
///
/// Cheap to clone; clones share the same window table.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    windows: DashMap<String, RateWindow>,
    window: Duration,
    max_requests: u32,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per `window` per client.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                windows: DashMap::new(),
                window,
                max_requests,
                trust_forwarded_for: false,
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                windows: DashMap::new(),
                window: Duration::from_millis(config.window_ms),
                max_requests: config.max_requests,
                trust_forwarded_for: config.trust_forwarded_for,
            }),
        }
    }

    /// Check and record a request from `identity` at the current time.
    pub fn check(&self, identity: &str) -> RateDecision {
        self.check_at(identity, Instant::now())
    }

    /// Check and record a request from `identity` observed at `now`.
    pub fn check_at(&self, identity: &str, now: Instant) -> RateDecision {
        let window = self.inner.window;
        let max = self.inner.max_requests;

        match self.inner.windows.entry(identity.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateWindow {
                    request_count: 1,
                    reset_at: now + window,
                });
                RateDecision::Allowed {
                    remaining: max.saturating_sub(1),
                }
            }
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();
                if now > state.reset_at {
                    state.request_count = 1;
                    state.reset_at = now + window;
                    return RateDecision::Allowed {
                        remaining: max.saturating_sub(1),
                    };
                }

                if state.request_count >= max {
                    let retry_after = state.reset_at.saturating_duration_since(now);
                    let reset_at = Utc::now()
                        + chrono::Duration::from_std(retry_after).unwrap_or_else(|_| chrono::Duration::zero());
                    return RateDecision::Limited {
                        reset_at,
                        retry_after,
                    };
                }

                state.request_count += 1;
                RateDecision::Allowed {
                    remaining: max - state.request_count,
                }
            }
        }
    }

    /// Current request count for `identity`, if it has a window.
    pub fn request_count(&self, identity: &str) -> Option<u32> {
        self.inner.windows.get(identity).map(|w| w.request_count)
    }

    /// Number of identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.inner.windows.len()
    }

    /// Remove windows whose reset instant has passed. Returns the number
    /// of windows removed.
    ///
    /// Dropping an expired window is equivalent to resetting it: the next
    /// request from that client starts a new window either way.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.inner.windows.len();
        self.inner.windows.retain(|_, w| now <= w.reset_at);
        before.saturating_sub(self.inner.windows.len())
    }

    /// Spawn a task that sweeps expired windows every `interval` until
    /// shutdown is signalled.
    pub fn start_sweeper(
        &self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep_expired();
                        if removed > 0 {
                            tracing::debug!(
                                removed,
                                tracked = limiter.tracked_clients(),
                                "Swept expired rate limit windows"
                            );
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Rate limit sweeper stopping");
                        break;
                    }
                }
            }
        })
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.inner.trust_forwarded_for
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window", &self.inner.window)
            .field("max_requests", &self.inner.max_requests)
            .field("tracked_clients", &self.inner.windows.len())
            .finish()
    }
}

/// Middleware gating every request behind the client's rate window.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let identity = ClientIdentity::from_parts(&parts, limiter.trusts_forwarded_for());
    let request = Request::from_parts(parts, body);

    match limiter.check(identity.as_str()) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited {
            reset_at,
            retry_after,
        } => {
            tracing::warn!(client = %identity, reset_at = %reset_at, "Rate limit exceeded");
            metrics::record_rate_limited();
            ApiError::RateLimited {
                reset_at,
                retry_after,
            }
            .into_response()
        }
    }
}
