//! Inbound event dispatch: one `ClientEvent` arm per session operation.
//!
//! Error policy follows the session error kinds: `Permission` and
//! `BadInput` are dropped after a debug log, `Validation` rides back on
//! the pick acknowledgement, `Fatal` is logged loudly and surfaces as a
//! `message` notice. Nothing here panics on client input.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::booster::parse_custom_card_list;
use crate::catalog::Rarity;
use crate::draft::DraftLogRecipients;
use crate::error::SessionError;
use crate::gateway::events::{ClientEvent, EventName, MessagePayload, PickAckPayload, ServerFrame};
use crate::session::timer::spawn_session_timer;
use crate::session::LeaveOutcome;
use crate::{AppState, SessionId, UserId};

/// Route one client event to its session operation.
pub fn handle_event(state: &AppState, uid: &UserId, event: ClientEvent) {
    use ClientEvent::*;

    let result = match event {
        SetUserName(name) => set_user_name(state, uid, name),
        SetSession(sid) => {
            join_session(state, uid, &sid);
            Ok(())
        }
        SetCollection(collection) => set_collection(state, uid, collection),
        UseCollection(use_collection) => set_use_collection(state, uid, use_collection),
        ChatMessage { text } => with_session(state, uid, |s, state| {
            s.chat_message(&state.registry, uid, &text);
            Ok(())
        }),
        StartDraft => with_session(state, uid, |s, state| {
            let mut rng = StdRng::from_entropy();
            let started = s.start_draft(&state.registry, &state.catalog, uid, &mut rng)?;
            if started && s.options.max_timer > 0 {
                spawn_session_timer(state.registry.clone(), s.id.clone());
            }
            Ok(())
        }),
        PickCard {
            selected_card,
            burned_cards,
        } => {
            let result = with_session(state, uid, |s, state| {
                s.pick_card(
                    &state.registry,
                    &state.catalog,
                    uid,
                    selected_card,
                    &burned_cards,
                )
            });
            let ack = match &result {
                Ok(()) => PickAckPayload::ok(),
                Err(error) => PickAckPayload::err(error.to_string()),
            };
            state
                .registry
                .send_to_user(uid, ServerFrame::event(EventName::PICK_ACK, &ack));
            // The ack already carried the outcome.
            Ok(())
        }
        SetSessionOwner(new_owner) => with_session(state, uid, |s, state| {
            s.set_session_owner(&state.registry, uid, new_owner)
        }),
        RemovePlayer(target) => remove_player(state, uid, &target),
        BoostersPerPlayer(n) => {
            with_session(state, uid, |s, state| {
                s.set_boosters_per_player(&state.registry, uid, n)
            })
        }
        Bots(n) => with_session(state, uid, |s, state| s.set_bots(&state.registry, uid, n)),
        SetRestriction(sets) => {
            with_session(state, uid, |s, state| s.set_restriction(&state.registry, uid, sets))
        }
        ClientEvent::CustomCardList(cards) => with_session(state, uid, |s, state| {
            s.set_custom_card_list(
                &state.registry,
                uid,
                crate::booster::CustomCardList::from_flat(cards),
            )
        }),
        ParseCustomCardList(text) => set_parsed_card_list(state, uid, &text),
        LoadLocalCustomCardList(name) => load_local_card_list(state, uid, &name),
        IgnoreCollections(ignore) => with_session(state, uid, |s, state| {
            s.set_ignore_collections(&state.registry, uid, ignore)
        }),
        SetPickTimer(seconds) => {
            with_session(state, uid, |s, state| s.set_pick_timer(&state.registry, uid, seconds))
        }
        SetMaxPlayers(n) => {
            with_session(state, uid, |s, state| s.set_max_players(&state.registry, uid, n))
        }
        SetMaxRarity(raw) => match Rarity::from_str(&raw) {
            Ok(rarity) => {
                with_session(state, uid, |s, state| s.set_max_rarity(&state.registry, uid, rarity))
            }
            Err(()) => Err(SessionError::BadInput(format!("unknown rarity '{raw}'"))),
        },
        SetColorBalance(on) => {
            with_session(state, uid, |s, state| s.set_color_balance(&state.registry, uid, on))
        }
        SetUseCustomCardList(on) => with_session(state, uid, |s, state| {
            s.set_use_custom_card_list(&state.registry, uid, on)
        }),
        SetFoil(on) => with_session(state, uid, |s, state| s.set_foil(&state.registry, uid, on)),
        SetPublic(public) => set_public(state, uid, public),
        SetMaxDuplicates(limits) => with_session(state, uid, |s, state| {
            s.set_max_duplicates(&state.registry, uid, limits)
        }),
        SetBurnedCardsPerRound(n) => with_session(state, uid, |s, state| {
            s.set_burned_cards_per_round(&state.registry, uid, n)
        }),
        SetCustomBoosters(rounds) => with_session(state, uid, |s, state| {
            s.set_custom_boosters(&state.registry, uid, rounds)
        }),
        SetDistributionMode(raw) => match raw.parse() {
            Ok(mode) => with_session(state, uid, |s, state| {
                s.set_distribution_mode(&state.registry, uid, mode)
            }),
            Err(()) => Err(SessionError::BadInput(format!(
                "unknown distribution mode '{raw}'"
            ))),
        },
        SetDraftLogRecipients(raw) => match DraftLogRecipients::from_str(&raw) {
            Ok(mode) => with_session(state, uid, |s, state| {
                s.set_draft_log_recipients(&state.registry, uid, mode)
            }),
            Err(()) => Err(SessionError::BadInput(format!(
                "unknown draft log recipients '{raw}'"
            ))),
        },
        SetOwnerIsPlayer(is_player) => with_session(state, uid, |s, state| {
            s.set_owner_is_player(&state.registry, uid, is_player)
        }),
        SetSeating(order) => {
            with_session(state, uid, |s, state| s.set_seating(&state.registry, uid, order))
        }
        RandomizeSeating => with_session(state, uid, |s, state| {
            let mut rng = StdRng::from_entropy();
            s.randomize_seating(&state.registry, uid, &mut rng)
        }),
        ReplaceDisconnectedPlayers => with_session(state, uid, |s, state| {
            s.replace_disconnected_players(&state.registry, &state.catalog, uid)
        }),
        DistributeSealed(n) => with_session(state, uid, |s, state| {
            let mut rng = StdRng::from_entropy();
            s.distribute_sealed(&state.registry, &state.catalog, uid, n, &mut rng)
        }),
        DistributeJumpstart => with_session(state, uid, |s, state| {
            let mut rng = StdRng::from_entropy();
            s.distribute_jumpstart(&state.registry, &state.catalog, uid, &mut rng)
        }),
        StartWinstonDraft(count) => with_session(state, uid, |s, state| {
            let mut rng = StdRng::from_entropy();
            s.start_winston_draft(&state.registry, &state.catalog, uid, count, &mut rng)
        }),
        WinstonDraftTakePile => {
            with_session(state, uid, |s, state| s.winston_take_pile(&state.registry, uid))
        }
        WinstonDraftSkipPile => {
            with_session(state, uid, |s, state| s.winston_skip_pile(&state.registry, uid))
        }
        GenerateBracket => {
            with_session(state, uid, |s, state| s.generate_bracket(&state.registry, uid))
        }
        UpdateBracket { index, wins } => with_session(state, uid, |s, state| {
            s.update_bracket(&state.registry, uid, index, wins)
        }),
    };

    if let Err(error) = result {
        report_error(state, uid, error);
    }
}

/// Run `op` against the caller's current session.
fn with_session<F>(state: &AppState, uid: &UserId, op: F) -> Result<(), SessionError>
where
    F: FnOnce(&mut crate::session::Session, &AppState) -> Result<(), SessionError>,
{
    let sid = state
        .registry
        .participant(uid)
        .and_then(|p| p.lock().session_id.clone())
        .ok_or_else(|| SessionError::BadInput("not in a session".to_string()))?;
    let session = state
        .registry
        .session(&sid)
        .ok_or_else(|| SessionError::BadInput("session vanished".to_string()))?;
    let mut session = session.lock();
    op(&mut session, state)
}

fn report_error(state: &AppState, uid: &UserId, error: SessionError) {
    match &error {
        SessionError::Permission => {
            tracing::debug!(user_id = %uid, "non-owner attempted owner operation")
        }
        SessionError::BadInput(msg) => {
            tracing::debug!(user_id = %uid, %msg, "bad client input dropped")
        }
        SessionError::Validation(msg) => {
            tracing::debug!(user_id = %uid, %msg, "validation failure")
        }
        SessionError::Shortage(msg) => {
            tracing::debug!(user_id = %uid, %msg, "card shortage")
        }
        SessionError::Fatal(msg) => {
            tracing::error!(user_id = %uid, %msg, "fatal session error");
            state.registry.send_to_user(
                uid,
                ServerFrame::event(
                    EventName::MESSAGE,
                    &MessagePayload::notice("Internal error", "The session hit an internal error."),
                ),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Participant-level operations
// ---------------------------------------------------------------------------

fn set_user_name(state: &AppState, uid: &UserId, name: String) -> Result<(), SessionError> {
    let participant = state
        .registry
        .participant(uid)
        .ok_or_else(|| SessionError::BadInput("unknown participant".to_string()))?;
    let name: String = name.chars().take(50).collect();
    participant.lock().user_name = name.clone();

    let _ = with_session(state, uid, |s, state| {
        s.broadcast(
            &state.registry,
            ServerFrame::event(
                EventName::UPDATE_USER,
                &json!({
                    "userID": uid,
                    "updatedProperties": { "userName": name },
                }),
            ),
        );
        Ok(())
    });
    Ok(())
}

fn set_collection(
    state: &AppState,
    uid: &UserId,
    collection: std::collections::HashMap<crate::catalog::CardId, u32>,
) -> Result<(), SessionError> {
    let participant = state
        .registry
        .participant(uid)
        .ok_or_else(|| SessionError::BadInput("unknown participant".to_string()))?;
    participant.lock().collection = collection;
    broadcast_user_list(state, uid);
    Ok(())
}

fn set_use_collection(state: &AppState, uid: &UserId, on: bool) -> Result<(), SessionError> {
    let participant = state
        .registry
        .participant(uid)
        .ok_or_else(|| SessionError::BadInput("unknown participant".to_string()))?;
    participant.lock().use_collection = on;
    broadcast_user_list(state, uid);
    Ok(())
}

fn broadcast_user_list(state: &AppState, uid: &UserId) {
    let _ = with_session(state, uid, |s, state| {
        let list = s.user_list(&state.registry);
        s.broadcast(
            &state.registry,
            ServerFrame::event(EventName::SESSION_USERS, &list),
        );
        Ok(())
    });
}

// ---------------------------------------------------------------------------
// Session membership flows
// ---------------------------------------------------------------------------

/// Join `requested`, creating it when unknown. A full or drafting session
/// redirects the joiner to a fresh one (unless they are a disconnected
/// member rejoining). Used by both the handshake and `setSession`.
pub fn join_session(state: &AppState, uid: &UserId, requested: &SessionId) {
    leave_current_session(state, uid);

    let session_arc = state.registry.session_or_create(requested, uid);
    let redirect = {
        let mut session = session_arc.lock();
        if session.disconnected.contains_key(uid) {
            set_participant_session(state, uid, Some(requested.clone()));
            session.reconnect_user(&state.registry, uid);
            tracing::info!(session_id = %requested, user_id = %uid, "participant rejoined draft");
            None
        } else if session.is_joinable(uid) {
            set_participant_session(state, uid, Some(requested.clone()));
            session.add_user(&state.registry, uid);
            None
        } else {
            Some(state.registry.unique_session_code())
        }
    };

    if let Some(new_sid) = redirect {
        tracing::debug!(
            session_id = %requested,
            user_id = %uid,
            redirect = %new_sid,
            "session not joinable, redirecting"
        );
        state
            .registry
            .send_to_user(uid, ServerFrame::event(EventName::SET_SESSION, &new_sid));
        join_session(state, uid, &new_sid);
    }
}

/// Detach a participant from their current session, destroying it when it
/// empties out.
pub fn leave_current_session(state: &AppState, uid: &UserId) {
    let Some(participant) = state.registry.participant(uid) else {
        return;
    };
    let Some(sid) = participant.lock().session_id.take() else {
        return;
    };
    let Some(session_arc) = state.registry.session(&sid) else {
        return;
    };

    let outcome = session_arc.lock().handle_leave(&state.registry, uid);
    match outcome {
        LeaveOutcome::Empty => state.registry.destroy_session(&sid),
        LeaveOutcome::OwnerChanged(new_owner) => {
            tracing::info!(session_id = %sid, new_owner = %new_owner, "session owner left, ownership transferred");
        }
        LeaveOutcome::Kept | LeaveOutcome::Snapshotted => {}
    }
}

fn set_participant_session(state: &AppState, uid: &UserId, sid: Option<SessionId>) {
    if let Some(participant) = state.registry.participant(uid) {
        participant.lock().session_id = sid;
    }
}

/// Owner kicks a player: they are moved to a freshly created session.
fn remove_player(state: &AppState, uid: &UserId, target: &UserId) -> Result<(), SessionError> {
    with_session(state, uid, |s, _state| {
        s.require_owner(uid)?;
        if s.draft.is_drafting() {
            return Err(SessionError::BadInput(
                "cannot remove players while drafting".to_string(),
            ));
        }
        if target == &s.owner || !s.users.contains(target) {
            return Err(SessionError::BadInput("invalid removal target".to_string()));
        }
        Ok(())
    })?;

    let new_sid = state.registry.unique_session_code();
    state.registry.send_to_user(
        target,
        ServerFrame::event(
            EventName::MESSAGE,
            &MessagePayload::notice("Removed", "You were removed from the session."),
        ),
    );
    state
        .registry
        .send_to_user(target, ServerFrame::event(EventName::SET_SESSION, &new_sid));
    join_session(state, target, &new_sid);
    Ok(())
}

// ---------------------------------------------------------------------------
// Custom card lists
// ---------------------------------------------------------------------------

fn set_parsed_card_list(state: &AppState, uid: &UserId, text: &str) -> Result<(), SessionError> {
    let parsed = parse_custom_card_list(&state.catalog, text);
    match parsed {
        Ok(list) => with_session(state, uid, |s, state| {
            s.set_custom_card_list(&state.registry, uid, list)
        }),
        Err(error) => {
            state.registry.send_to_user(
                uid,
                ServerFrame::event(
                    EventName::MESSAGE,
                    &MessagePayload::notice("Invalid card list", error.to_string()),
                ),
            );
            Ok(())
        }
    }
}

fn load_local_card_list(state: &AppState, uid: &UserId, name: &str) -> Result<(), SessionError> {
    // The name indexes server-side files; keep it to a safe charset.
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SessionError::BadInput(format!(
            "invalid card list name '{name}'"
        )));
    }
    let path = std::path::Path::new(&state.config.card_lists_dir).join(format!("{name}.txt"));
    let text = std::fs::read_to_string(&path).map_err(|_| {
        SessionError::BadInput(format!("unknown local card list '{name}'"))
    })?;
    set_parsed_card_list(state, uid, &text)
}

// ---------------------------------------------------------------------------
// Options needing post-lock work
// ---------------------------------------------------------------------------

/// `setPublic` re-broadcasts the public list, which locks every session —
/// so it must run after this session's lock is released.
fn set_public(state: &AppState, uid: &UserId, public: bool) -> Result<(), SessionError> {
    let changed = {
        let sid = state
            .registry
            .participant(uid)
            .and_then(|p| p.lock().session_id.clone())
            .ok_or_else(|| SessionError::BadInput("not in a session".to_string()))?;
        let session = state
            .registry
            .session(&sid)
            .ok_or_else(|| SessionError::BadInput("session vanished".to_string()))?;
        let mut session = session.lock();
        session.set_public(&state.registry, uid, public)?
    };
    if changed {
        state.registry.broadcast_public_sessions();
    }
    Ok(())
}
