use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::SharedState;

/// Simple health-check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Number of blocks in the loaded chain.
    pub blocks: usize,
}

/// `GET /health`
///
/// Returns a basic JSON document indicating liveness. A gateway only runs
/// on a chain that passed validation at startup.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let blocks = state.registry.lock().await.chain().len();
    (StatusCode::OK, Json(HealthResponse { status: "ok", blocks }))
}
