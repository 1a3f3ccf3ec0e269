//! Bookdesk Server - REST backend for the book dashboard
//!
//! Serves `/books` over a local JSON-file store.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookdesk::{
    api,
    config::AppConfig,
    repository::LocalStore,
    services::seed,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookdesk={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Bookdesk Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the record store
    let store = match config.storage.path {
        Some(ref path) => LocalStore::open(path).await?,
        None => {
            tracing::warn!("No storage path configured, books are kept in memory only");
            LocalStore::in_memory()
        }
    };

    if config.storage.seed_if_empty {
        let seeded = store.seed_if_empty(&seed::sample_books()).await?;
        if seeded > 0 {
            tracing::info!("Inserted {} sample books", seeded);
        }
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState {
        store: Arc::new(store),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
