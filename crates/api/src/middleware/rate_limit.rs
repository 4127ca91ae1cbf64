//! Per-client rate limiting for public write endpoints.
//!
//! Clients are keyed by the TCP peer address. Forwarding headers are only
//! believed when the peer is a configured trusted proxy: then the key is
//! the rightmost `X-Forwarded-For` hop that is not itself a trusted proxy,
//! or `X-Real-IP`. Requests with no known peer share one bucket.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::state::AppState;

/// Key used when the client address is unknown.
const SHARED_KEY: &str = "anonymous";

/// How often idle limiter entries are dropped.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the keyed limiter stored in [`AppState`].
pub fn build_limiter(per_minute: NonZeroU32) -> DefaultKeyedRateLimiter<String> {
    RateLimiter::keyed(Quota::per_minute(per_minute))
}

/// Drop keys whose quota has fully replenished.
pub fn prune(limiter: &DefaultKeyedRateLimiter<String>) {
    limiter.retain_recent();
    limiter.shrink_to_fit();
}

/// Prune `limiter` every `every` until the runtime shuts down.
pub fn spawn_pruner(
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            prune(&limiter);
            tracing::debug!(clients = limiter.len(), "Pruned rate limiter");
        }
    })
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Client address as seen through trusted proxies.
fn forwarded_client(headers: &HeaderMap, trusted: &[IpAddr]) -> Option<IpAddr> {
    let chain = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect::<Vec<_>>();

    for hop in chain.iter().rev() {
        // Anything left of a malformed hop was not written by our proxies.
        let ip: IpAddr = hop.parse().ok()?;
        if !trusted.contains(&ip) {
            return Some(ip);
        }
    }
    header_ip(headers, "x-real-ip").filter(|ip| !trusted.contains(ip))
}

/// Derive the limiter key for a request from `peer`, the TCP peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpAddr]) -> String {
    match peer {
        None => SHARED_KEY.to_string(),
        Some(peer) if trusted.contains(&peer) => forwarded_client(headers, trusted)
            .unwrap_or(peer)
            .to_string(),
        Some(peer) => peer.to_string(),
    }
}

/// Consumes one unit of the caller's quota. Rejects with 429 when exhausted.
///
/// ```ignore
/// async fn register(_limit: RateLimit, ...) -> AppResult<...> { ... }
/// ```
pub struct RateLimit;

impl FromRequestParts<AppState> for RateLimit {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let key = client_key(&parts.headers, peer, &state.config.trusted_proxies);

        if state.limiter.check_key(&key).is_err() {
            tracing::warn!(client = %key, path = %parts.uri.path(), "Rate limit exceeded");
            return Err(AppError::RateLimited);
        }
        Ok(RateLimit)
    }
}
