use axum::{Json, extract::State, http::header, response::IntoResponse};
use serde::Serialize;

use ledger::Block;

use crate::state::SharedState;

/// Response body for `GET /chain/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// `GET /chain`
///
/// The full block sequence in its persisted layout.
pub async fn blocks(State(state): State<SharedState>) -> Json<Vec<Block>> {
    Json(state.registry.lock().await.chain().blocks().to_vec())
}

/// `GET /chain/verify`
pub async fn verify(State(state): State<SharedState>) -> Json<VerifyResponse> {
    let registry = state.registry.lock().await;
    let outcome = registry.verify();
    Json(VerifyResponse {
        valid: outcome.is_ok(),
        blocks: registry.chain().len(),
        fault: outcome.err().map(|f| f.to_string()),
    })
}

/// `GET /metrics`
///
/// Prometheus text exposition; empty when metrics are disabled.
pub async fn metrics(State(state): State<SharedState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|m| m.gather_text())
        .unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
