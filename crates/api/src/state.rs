use std::sync::Arc;

use governor::DefaultKeyedRateLimiter;
use summit_core::storage::StorageBucket;

use crate::config::ServerConfig;
use crate::email::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: summit_db::DbPool,
    /// Server configuration (JWT secret, admin credentials, ...).
    pub config: Arc<ServerConfig>,
    /// Bucket holding uploaded images.
    pub storage: Arc<dyn StorageBucket>,
    /// Registration confirmation mailer, when SMTP is configured.
    pub mailer: Option<Arc<Mailer>>,
    /// Per-client limiter for public write endpoints.
    pub limiter: Arc<DefaultKeyedRateLimiter<String>>,
}
