//! Debug endpoints, guarded by the static `DEBUG_SECRET`. They 404 when
//! no secret is configured.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getSessions/{secret}", get(get_sessions))
        .route("/getConnectedUsers/{secret}", get(get_connected_users))
}

fn check_secret(state: &AppState, given: &str) -> Result<(), ApiError> {
    let expected = state
        .config
        .debug_secret
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    // Constant-time comparison; the secret is static and low-stakes, but
    // there is no reason to leak it byte by byte.
    let mut diff = expected.len() ^ given.len();
    for (a, b) in expected.bytes().zip(given.bytes()) {
        diff |= (a ^ b) as usize;
    }
    if diff == 0 {
        Ok(())
    } else {
        Err(ApiError::forbidden("Bad secret"))
    }
}

async fn get_sessions(
    Path(secret): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    check_secret(&state, &secret)?;
    let summaries: Vec<Value> = state
        .registry
        .session_ids()
        .into_iter()
        .filter_map(|sid| {
            let session = state.registry.session(&sid)?;
            let session = session.lock();
            Some(json!({
                "id": session.id,
                "owner": session.owner,
                "users": session.users,
                "isPublic": session.options.is_public,
                "drafting": session.draft.is_drafting(),
                "disconnected": session.disconnected.len(),
            }))
        })
        .collect();
    Ok(Json(json!(summaries)))
}

async fn get_connected_users(
    Path(secret): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    check_secret(&state, &secret)?;
    let users: Vec<Value> = state
        .registry
        .connected_user_ids()
        .into_iter()
        .filter_map(|uid| {
            let participant = state.registry.participant(&uid)?;
            let p = participant.lock();
            Some(json!({
                "userID": p.user_id,
                "userName": p.user_name,
                "sessionID": p.session_id,
            }))
        })
        .collect();
    Ok(Json(json!(users)))
}
