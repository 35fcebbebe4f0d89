//! Read-only session introspection: shared collection and user list.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getCollection", get(get_collection_bare))
        .route("/getCollection/{session_id}", get(get_collection))
        .route("/getUsers/{session_id}", get(get_users))
}

async fn get_collection_bare() -> ApiError {
    ApiError::bad_request("A session id is required: /getCollection/{sessionID}")
}

/// The session's effective shared collection (the intersection booster
/// generation would draw from). Empty object when collections are
/// ignored or nobody shares one.
async fn get_collection(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let session = state
        .registry
        .session(&session_id)
        .ok_or_else(|| ApiError::not_found(format!("Session '{session_id}' not found")))?;
    let session = session.lock();
    let collection = session
        .effective_collection(&state.registry)
        .unwrap_or_default();
    Ok(Json(json!(collection)))
}

async fn get_users(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let session = state
        .registry
        .session(&session_id)
        .ok_or_else(|| ApiError::not_found(format!("Session '{session_id}' not found")))?;
    let session = session.lock();
    Ok(Json(session.user_list(&state.registry)))
}
