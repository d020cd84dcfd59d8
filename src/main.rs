// Main entry point for the contacts group service

use contacts_api::api::{create_router, AccountStore, AppState, ContactStore, GroupStore};
use contacts_api::auth::auth_middleware::AuthState;
use contacts_api::config::Config;
use contacts_api::core::groups::GroupResource;
use contacts_api::store::pg::{PgAccountStore, PgContactStore, PgGroupStore};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting contacts group service");

    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Configuration loaded"
    );

    // 3. Initialize database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    info!("Database pool initialized");

    // 4. Initialize stores
    let group_store: Arc<dyn GroupStore + Send + Sync> = Arc::new(PgGroupStore::new(pool.clone()));
    let contact_store: Arc<dyn ContactStore + Send + Sync> =
        Arc::new(PgContactStore::new(pool.clone()));
    let account_store: Arc<dyn AccountStore + Send + Sync> = Arc::new(PgAccountStore::new(
        pool,
        Duration::from_secs(config.auth_cache_ttl_secs),
    ));

    info!("Stores initialized");

    // 5. Wire the group resource with its store dependencies
    let groups = GroupResource::new(group_store.clone(), contact_store);

    // 6. Create AuthState and AppState
    let auth_state = Arc::new(AuthState { account_store });

    let app_state = AppState {
        groups,
        group_store,
        config: Arc::new(config.clone()),
    };

    // 7. Create router
    let router = create_router(app_state, Some(auth_state));

    info!("Router created");

    // 8. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "Server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
