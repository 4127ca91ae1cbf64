use std::net::IpAddr;
use std::num::NonZeroU32;

use crate::auth::jwt::JwtConfig;
use crate::email::EmailConfig;
use crate::storage::StorageConfig;

/// Default number of public write requests allowed per client per minute.
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Request bodies carry base64 images, so the limit is well above axum's 2 MiB.
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Credentials of the single administrator account.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Login email (compared case-insensitively).
    pub email: String,
    /// Argon2id PHC string of the admin password.
    pub password_hash: String,
}

impl AdminConfig {
    /// Load admin credentials from `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH`.
    ///
    /// # Panics
    ///
    /// Panics if either variable is missing or empty.
    pub fn from_env() -> Self {
        let email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set");
        let password_hash =
            std::env::var("ADMIN_PASSWORD_HASH").expect("ADMIN_PASSWORD_HASH must be set");
        assert!(!email.trim().is_empty(), "ADMIN_EMAIL must not be empty");
        assert!(
            password_hash.starts_with("$argon2"),
            "ADMIN_PASSWORD_HASH must be an Argon2 PHC string"
        );
        Self {
            email: email.trim().to_string(),
            password_hash,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Administrator credentials.
    pub admin: AdminConfig,
    /// Remote storage bucket. `None` selects the in-memory bucket.
    pub storage: Option<StorageConfig>,
    /// SMTP settings. `None` disables confirmation emails.
    pub email: Option<EmailConfig>,
    /// Quota for rate-limited public endpoints, per client per minute.
    pub rate_limit_per_minute: NonZeroU32,
    /// Largest accepted request body in bytes (default: 10 MiB).
    pub max_body_bytes: usize,
    /// Reverse proxies whose forwarding headers name the real client.
    /// Empty means the TCP peer is the client.
    pub trusted_proxies: Vec<IpAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `RATE_LIMIT_PER_MINUTE` | `10`                    |
    /// | `MAX_BODY_BYTES`        | `10485760`              |
    /// | `TRUSTED_PROXIES`       | (none)                  |
    ///
    /// JWT, admin, storage and SMTP settings are read by their own
    /// `from_env` constructors.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let rate_limit: u32 = std::env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| DEFAULT_RATE_LIMIT_PER_MINUTE.to_string())
            .parse()
            .expect("RATE_LIMIT_PER_MINUTE must be a valid u32");
        let rate_limit_per_minute =
            NonZeroU32::new(rate_limit).expect("RATE_LIMIT_PER_MINUTE must be greater than 0");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .map(|v| v.parse().expect("MAX_BODY_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let trusted_proxies = parse_ip_list(&std::env::var("TRUSTED_PROXIES").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            admin: AdminConfig::from_env(),
            storage: StorageConfig::from_env(),
            email: EmailConfig::from_env(),
            rate_limit_per_minute,
            max_body_bytes,
            trusted_proxies,
        }
    }
}

/// Parse a comma-separated list of IP addresses.
///
/// # Panics
///
/// On an entry that is not an IP address.
fn parse_ip_list(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .unwrap_or_else(|e| panic!("Invalid TRUSTED_PROXIES entry '{s}': {e}"))
        })
        .collect()
}
