// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes the prediction registry over HTTP:
//!
//! - `GET /health`
//! - `POST /predictions`
//! - `GET /predictions/{name}?requester=…`
//! - `GET /predictions/{name}/access` and `/history`
//! - `POST /predictions/{name}/grant` and `/revoke`
//! - `GET /chain`, `GET /chain/verify`
//! - `GET /metrics`
//!
//! It embeds a file-backed registry behind one mutex and refuses to start
//! on a corrupted chain.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use tokio::signal;

use config::ApiConfig;
use ledger::{FileChainStore, LedgerConfig, MetricsRegistry, PredictionRegistry, SystemClock};
use state::{AppState, DynStore};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "api_gateway=info,ledger=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::from_env();
    let ledger_cfg = LedgerConfig::from_env();

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = if ledger_cfg.metrics.enabled {
        Some(
            MetricsRegistry::new()
                .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
        )
    } else {
        None
    };

    // ---------------------------
    // Storage + registry
    // ---------------------------

    let store = FileChainStore::open(&ledger_cfg.storage).map_err(|e| {
        format!(
            "failed to open chain store at {}: {e}",
            ledger_cfg.storage.path.display()
        )
    })?;
    let store: DynStore = Box::new(store);

    let registry = PredictionRegistry::open(store, SystemClock, ledger_cfg.registry.clone())
        .map_err(|e| format!("refusing to start: {e}"))?;
    tracing::info!(
        blocks = registry.chain().len(),
        path = %ledger_cfg.storage.path.display(),
        "chain ready"
    );

    let app_state = Arc::new(AppState::new(registry, metrics));

    // ---------------------------
    // HTTP router + server
    // ---------------------------

    let app = routes::router(app_state);

    tracing::info!("API gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
