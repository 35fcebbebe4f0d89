//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::gateway::events::{ClientEvent, EventName, ServerFrame};
use crate::gateway::handler;
use crate::registry::Participant;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

/// Connection handshake, carried as query parameters on the upgrade.
#[derive(Debug, Deserialize)]
pub struct HandshakeQuery {
    #[serde(rename = "userID")]
    user_id: Option<String>,
    #[serde(rename = "userName")]
    user_name: Option<String>,
    #[serde(rename = "sessionID")]
    session_id: Option<String>,
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<HandshakeQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state, query))
}

async fn handle_connection(socket: WebSocket, state: AppState, query: HandshakeQuery) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();

    let user_name = query
        .user_name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Anonymous".to_string());

    // An id that is already attached to a live socket is supplanted: this
    // connection gets a fresh id and is told to adopt it.
    let requested = query.user_id.filter(|s| !s.is_empty());
    let mut user_id = requested
        .clone()
        .unwrap_or_else(|| draftpod_common::id::prefixed_ulid(draftpod_common::id::prefix::USER));
    let supplanted = state.registry.is_connected(&user_id);
    if supplanted {
        user_id = draftpod_common::id::prefixed_ulid(draftpod_common::id::prefix::USER);
    }

    state
        .registry
        .insert_participant(Participant::new(user_id.clone(), user_name, tx));

    tracing::info!(user_id = %user_id, "gateway connection established");

    if supplanted {
        state
            .registry
            .send_to_user(&user_id, ServerFrame::event(EventName::ALREADY_CONNECTED, &user_id));
    }
    state.registry.send_to_user(
        &user_id,
        ServerFrame::event(
            EventName::PUBLIC_SESSIONS,
            &state.registry.public_session_ids(),
        ),
    );

    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.registry.unique_session_code());
    handler::join_session(&state, &user_id, &session_id);

    loop {
        tokio::select! {
            // Outbound frames queued by session operations.
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(error) => {
                        tracing::error!(user_id = %user_id, %error, "failed to serialize frame");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            // Inbound client events.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => handler::handle_event(&state, &user_id, event),
                            Err(error) => {
                                // Unknown or malformed events never crash
                                // the server; they just vanish.
                                tracing::debug!(user_id = %user_id, %error, "unparseable client event dropped");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        tracing::debug!(user_id = %user_id, ?error, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }
        }
    }

    // Clear the sender before session bookkeeping so connectivity checks
    // see this participant as offline, then detach and drop the record.
    if let Some(participant) = state.registry.participant(&user_id) {
        participant.lock().sender = None;
    }
    handler::leave_current_session(&state, &user_id);
    state.registry.remove_participant(&user_id);

    tracing::info!(user_id = %user_id, "gateway connection closed");
}
