//! Mapping from ledger errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use ledger::LedgerError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Ledger error rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            LedgerError::AlreadyRecorded(_) => StatusCode::CONFLICT,
            LedgerError::Corrupted(_) | LedgerError::Malformed(_) | LedgerError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
