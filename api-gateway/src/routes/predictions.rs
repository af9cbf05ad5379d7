use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ledger::{AccessUpdate, AccountId, Payload};

use super::error::ApiError;
use crate::state::SharedState;

/// Request body for `POST /predictions`.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    /// Account recording (and owning) the prediction.
    pub owner_id: String,
    pub prediction_name: String,
    /// Arbitrary prediction data; `owner_id` is stamped in by the ledger.
    #[serde(default)]
    pub prediction_data: Map<String, Value>,
}

/// Response body for `POST /predictions`.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub prediction_name: String,
    pub hash: String,
}

/// Request body for grant and revoke.
#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    /// Must be the prediction's owner.
    pub requester_id: String,
    /// Account whose access changes.
    pub account_id: String,
}

/// Response body for grant and revoke.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    /// `"appended"` or `"unchanged"`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub access: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    pub requester: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentAccessResponse {
    pub prediction_name: String,
    pub access: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub timestamp: String,
    pub access: Vec<String>,
}

/// `POST /predictions`
pub async fn record_prediction(
    State(state): State<SharedState>,
    Json(body): Json<RecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let owner = AccountId::from(body.owner_id);
    let hash = {
        let mut registry = state.registry.lock().await;
        registry.record_prediction(&owner, &body.prediction_name, Payload::from(body.prediction_data))?
    };

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            prediction_name: body.prediction_name,
            hash: hash.0,
        }),
    ))
}

/// `GET /predictions/{name}?requester=…`
pub async fn read_prediction(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<Value>, ApiError> {
    let requester = AccountId::from(query.requester);
    let payload = state.registry.lock().await.read_prediction(&requester, &name)?;
    Ok(Json(Value::Object(payload.0)))
}

/// `POST /predictions/{name}/grant`
pub async fn grant_access(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(body): Json<AccessRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let requester = AccountId::from(body.requester_id);
    let account = AccountId::from(body.account_id);

    let mut registry = state.registry.lock().await;
    let update = registry.grant_access(&requester, &name, &account)?;
    Ok(Json(access_response(update, registry.current_access(&name).to_vec())))
}

/// `POST /predictions/{name}/revoke`
pub async fn revoke_access(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(body): Json<AccessRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let requester = AccountId::from(body.requester_id);
    let account = AccountId::from(body.account_id);

    let mut registry = state.registry.lock().await;
    let update = registry.revoke_access(&requester, &name, &account)?;
    Ok(Json(access_response(update, registry.current_access(&name).to_vec())))
}

/// `GET /predictions/{name}/access`
///
/// Empty list for unknown predictions.
pub async fn current_access(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<CurrentAccessResponse> {
    let access = state.registry.lock().await.current_access(&name).to_vec();
    Json(CurrentAccessResponse {
        prediction_name: name,
        access,
    })
}

/// `GET /predictions/{name}/history`
pub async fn access_history(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<Vec<HistoryEntry>> {
    let history = state.registry.lock().await.access_history(&name);
    Json(
        history
            .into_iter()
            .map(|s| HistoryEntry {
                hash: s.hash.0,
                timestamp: s.timestamp.to_string(),
                access: s.access_list.to_vec(),
            })
            .collect(),
    )
}

fn access_response(update: AccessUpdate, access: Vec<String>) -> AccessResponse {
    match update {
        AccessUpdate::Appended(hash) => AccessResponse {
            status: "appended",
            hash: Some(hash.0),
            access,
        },
        AccessUpdate::Unchanged => AccessResponse {
            status: "unchanged",
            hash: None,
            access,
        },
    }
}
