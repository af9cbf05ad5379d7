//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use ledger::{ChainStore, MetricsRegistry, PredictionRegistry, SystemClock};

/// Store type erased so tests can swap in an in-memory backend.
pub type DynStore = Box<dyn ChainStore + Send>;

/// Registry type served by the gateway.
pub type GatewayRegistry = PredictionRegistry<DynStore, SystemClock>;

/// Shared state held by the request handlers.
///
/// The registry sits behind a single mutex: every append is one serialized
/// read-latest → compute → append → persist section, so two concurrent
/// requests can never link two blocks to the same tail.
pub struct AppState {
    pub registry: Mutex<GatewayRegistry>,
    /// Metrics registry, if metrics are enabled.
    pub metrics: Option<MetricsRegistry>,
}

impl AppState {
    pub fn new(registry: GatewayRegistry, metrics: Option<MetricsRegistry>) -> Self {
        let registry = match &metrics {
            Some(m) => registry.with_metrics(m.ledger.clone()),
            None => registry,
        };
        Self {
            registry: Mutex::new(registry),
            metrics,
        }
    }
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
