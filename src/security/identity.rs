//! Client identity extraction for per-client accounting.

use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Header consulted when the gateway runs behind a trusted proxy.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Key used when no network source is known (e.g. in-process requests).
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Opaque key identifying the source of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the identity of a request: the first `X-Forwarded-For` hop
    /// when `trust_forwarded_for` is set, otherwise the peer IP.
    pub fn from_parts(parts: &Parts, trust_forwarded_for: bool) -> Self {
        Self::resolve(
            &parts.headers,
            parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|c| c.0),
            trust_forwarded_for,
        )
    }

    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> Self {
        if trust_forwarded_for {
            let forwarded = headers
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(hop) = forwarded {
                return Self::new(hop);
            }
        }

        match peer {
            Some(addr) => Self::new(addr.ip().to_string()),
            None => Self::new(UNKNOWN_CLIENT),
        }
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.1.2.3:55000".parse().unwrap())
    }

    #[test]
    fn test_peer_ip_ignores_port() {
        let id = ClientIdentity::resolve(&HeaderMap::new(), peer(), false);
        assert_eq!(id.as_str(), "10.1.2.3");
    }

    #[test]
    fn test_forwarded_for_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.1"));

        assert_eq!(ClientIdentity::resolve(&headers, peer(), false).as_str(), "10.1.2.3");
        assert_eq!(ClientIdentity::resolve(&headers, peer(), true).as_str(), "203.0.113.7");
    }

    #[test]
    fn test_unknown_without_peer() {
        let id = ClientIdentity::resolve(&HeaderMap::new(), None, true);
        assert_eq!(id.as_str(), UNKNOWN_CLIENT);
    }
}
