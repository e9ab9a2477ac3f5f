//! # Tasklane API Server
//!
//! HTTP entry point for Tasklane: task tracking with an append-only
//! assignment audit trail kept consistent via atomic unit-of-work commits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasklane-api
//! ```

use std::sync::Arc;

use tasklane_api::{
    app::{build_router, AppState},
    config::{Config, StoreBackend},
};
use tasklane_core::store::{memory::MemoryStore, postgres::PgStore, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklane_api=debug,tasklane_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Tasklane API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Postgres => {
            let url = config
                .store
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let store = PgStore::connect(url, config.store.max_connections).await?;
            store.run_migrations().await?;
            tracing::info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when Ctrl+C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
