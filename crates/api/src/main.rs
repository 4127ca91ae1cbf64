use std::net::SocketAddr;
use std::sync::Arc;

use summit_core::storage::{MemoryBucket, StorageBucket};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use summit_api::auth::password::hash_password;
use summit_api::config::ServerConfig;
use summit_api::email::Mailer;
use summit_api::middleware::rate_limit::{build_limiter, spawn_pruner, PRUNE_INTERVAL};
use summit_api::router::build_app_router;
use summit_api::state::AppState;
use summit_api::storage::HttpBucket;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "summit_api=debug,summit_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Remote bucket when `STORAGE_URL` is set, otherwise an in-process one.
///
/// URLs issued by the in-memory bucket are not served by this process; it
/// only exists so the API can run locally without credentials.
fn build_storage(config: &ServerConfig) -> Arc<dyn StorageBucket> {
    match &config.storage {
        Some(remote) => {
            tracing::info!(url = %remote.url, bucket = %remote.bucket, "Using remote storage bucket");
            Arc::new(HttpBucket::new(remote.clone()))
        }
        None => {
            let base = format!("http://{}:{}/media/", config.host, config.port);
            tracing::warn!(%base, "STORAGE_URL not set, images are kept in memory");
            Arc::new(MemoryBucket::new(base))
        }
    }
}

fn build_mailer(config: &ServerConfig) -> Option<Arc<Mailer>> {
    let Some(email) = &config.email else {
        tracing::info!("SMTP_HOST not set, registration emails disabled");
        return None;
    };
    let mailer = Mailer::new(email).expect("Failed to configure SMTP transport");
    tracing::info!(host = %email.smtp_host, from = %email.from_address, "Registration emails enabled");
    Some(Arc::new(mailer))
}

/// `summit-api hash-password`: read a password from stdin and print the
/// PHC string to put in `ADMIN_PASSWORD_HASH`.
fn print_password_hash() {
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .expect("Failed to read password from stdin");
    let password = password.trim_end_matches(['\r', '\n']);
    assert!(!password.is_empty(), "Password must not be empty");
    println!("{}", hash_password(password).expect("Failed to hash password"));
}

#[tokio::main]
async fn main() {
    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        print_password_hash();
        return;
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        rate_limit_per_minute = config.rate_limit_per_minute.get(),
        trusted_proxies = config.trusted_proxies.len(),
        "Loaded server configuration"
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = summit_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    summit_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    summit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    let limiter = Arc::new(build_limiter(config.rate_limit_per_minute));
    spawn_pruner(limiter.clone(), PRUNE_INTERVAL);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: build_storage(&config),
        mailer: build_mailer(&config),
        limiter,
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Summit API listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to listen for Ctrl-C");
                tracing::info!("SIGINT received, draining connections");
            }
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, draining connections");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl-C");
        tracing::info!("Ctrl-C received, draining connections");
    }
}
