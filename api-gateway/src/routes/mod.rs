//! HTTP routes.

pub mod chain;
pub mod error;
pub mod health;
pub mod predictions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

/// Builds the gateway router over `state`.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/predictions", post(predictions::record_prediction))
        .route("/predictions/{name}", get(predictions::read_prediction))
        .route("/predictions/{name}/access", get(predictions::current_access))
        .route("/predictions/{name}/history", get(predictions::access_history))
        .route("/predictions/{name}/grant", post(predictions::grant_access))
        .route("/predictions/{name}/revoke", post(predictions::revoke_access))
        .route("/chain", get(chain::blocks))
        .route("/chain/verify", get(chain::verify))
        .route("/metrics", get(chain::metrics))
        .with_state(state)
}
