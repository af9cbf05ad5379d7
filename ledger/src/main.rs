// src/main.rs
//
// Demo driver that wires up the ledger library:
//
// - file-backed chain store (path from LEDGER_CHAIN_PATH or the default)
// - prediction registry on the system clock
// - a short record / grant / read / revoke / read scenario
// - a final integrity check and a dump of the chain as JSON.

use serde_json::Value;
use tracing::{error, info, warn};

use ledger::{
    AccountId, Clock, DefaultRegistry, FileChainStore, LedgerConfig, LedgerError,
    MetricsRegistry, Payload, PredictionRegistry, SystemClock, Timestamp,
};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "ledger=info,api_gateway=info";

fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        )
        .init();

    if let Err(e) = run() {
        error!("fatal error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), LedgerError> {
    let cfg = LedgerConfig::from_env();

    // ---------------------------
    // Storage + registry
    // ---------------------------

    let store = FileChainStore::open(&cfg.storage)?;
    info!(path = %store.path().display(), "opening chain");

    let mut registry: DefaultRegistry =
        PredictionRegistry::open(store, SystemClock, cfg.registry.clone())?;

    let metrics = if cfg.metrics.enabled {
        match MetricsRegistry::new() {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("failed to initialise metrics registry: {e}");
                None
            }
        }
    } else {
        None
    };
    if let Some(m) = &metrics {
        registry = registry.with_metrics(m.ledger.clone());
    }

    // ---------------------------
    // Scenario
    // ---------------------------

    let patient = AccountId::from("patient123");
    let doctor = AccountId::from("doctorA");
    let prediction = format!("diabetes_pred_{}", registry.chain().len());

    let payload = demo_payload(SystemClock.now());
    registry.record_prediction(&patient, &prediction, payload)?;
    registry.grant_access(&patient, &prediction, &doctor)?;
    report_read(&registry, &doctor, &prediction)?;

    registry.revoke_access(&patient, &prediction, &doctor)?;
    report_read(&registry, &doctor, &prediction)?;

    // ---------------------------
    // Verification + dump
    // ---------------------------

    registry.verify()?;

    let dump = serde_json::to_string_pretty(registry.chain().blocks())
        .map_err(|e| LedgerError::Storage(ledger::StorageError::Encode(e)))?;
    println!("{dump}");

    if let Some(m) = &metrics {
        eprint!("{}", m.gather_text());
    }
    Ok(())
}

/// Prediction data recorded by the demo, stamped with the time it was made.
fn demo_payload(made_at: Timestamp) -> Payload {
    let mut payload = Payload::new();
    payload.insert("result", Value::from("Positive"));
    payload.insert("confidence", Value::from(0.81));
    payload.insert("timestamp", Value::from(made_at.to_string()));
    payload
}

/// Reads `prediction` as `requester`; authorization failures are reported,
/// anything else is propagated.
fn report_read(
    registry: &DefaultRegistry,
    requester: &AccountId,
    prediction: &str,
) -> Result<(), LedgerError> {
    match registry.read_prediction(requester, prediction) {
        Ok(payload) => {
            let payload = Value::Object(payload.0);
            info!(requester = %requester, prediction, payload = %payload, "read succeeded");
            Ok(())
        }
        Err(e @ LedgerError::Unauthorized { .. }) => {
            info!(requester = %requester, prediction, "read refused: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
