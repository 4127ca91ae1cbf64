#![allow(dead_code)]

use std::num::NonZeroU32;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use summit_api::auth::jwt::{generate_access_token, JwtConfig};
use summit_api::auth::password::hash_password;
use summit_api::config::{AdminConfig, ServerConfig};
use summit_api::middleware::rate_limit::build_limiter;
use summit_api::router::build_app_router;
use summit_api::state::AppState;
use summit_core::storage::MemoryBucket;

pub const ADMIN_EMAIL: &str = "admin@summit.test";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery-staple";
pub const BUCKET_URL: &str = "https://cdn.summit.test/images/";

/// Argon2 hashing is slow; hash the test password once per test binary.
fn admin_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD).expect("hashing should succeed"))
        .clone()
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        admin: AdminConfig {
            email: ADMIN_EMAIL.to_string(),
            password_hash: admin_password_hash(),
        },
        storage: None,
        email: None,
        rate_limit_per_minute: NonZeroU32::new(1000).unwrap(),
        max_body_bytes: 1024 * 1024,
        trusted_proxies: Vec::new(),
    }
}

/// A router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub bucket: Arc<MemoryBucket>,
}

impl TestApp {
    /// A fresh clone of the router for a single `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with the production middleware stack,
/// an in-memory bucket and the given config.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> TestApp {
    let bucket = Arc::new(MemoryBucket::new(BUCKET_URL));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: bucket.clone(),
        mailer: None,
        limiter: Arc::new(build_limiter(config.rate_limit_per_minute)),
    };
    TestApp {
        router: build_app_router(state, &config),
        bucket,
    }
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, test_config())
}

/// A valid admin bearer token for [`test_config`].
pub fn admin_token() -> String {
    generate_access_token(ADMIN_EMAIL, "admin", &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("PUT", uri, None, body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Bucket object name behind a stored image URL.
pub fn stored_object(url: &serde_json::Value) -> String {
    url.as_str()
        .and_then(|u| u.strip_prefix(BUCKET_URL))
        .unwrap_or_else(|| panic!("not a bucket URL: {url}"))
        .to_string()
}

/// A PNG-typed data URL whose payload is long enough to pass validation.
pub fn png_data_url(filename: Option<&str>) -> String {
    use base64::Engine;
    let bytes: Vec<u8> = (0u8..120).collect();
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    match filename {
        Some(name) => format!("data:image/png;name={name};base64,{payload}"),
        None => format!("data:image/png;base64,{payload}"),
    }
}
