//! Process-wide registry of connected participants and live sessions.
//!
//! `DashMap` entries hold `Arc<Mutex<_>>` values so callers clone the Arc
//! and release the map shard before locking — no lock is ever held across
//! a map operation. Locking discipline everywhere else: session first,
//! then participants one at a time, never nested.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use crate::catalog::CardId;
use crate::gateway::events::{EventName, ServerFrame};
use crate::session::Session;
use crate::{SessionId, UserId};

/// Channel sender delivering frames to one participant's socket writer.
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

/// The server's record of one connected (or draft-disconnected)
/// participant.
#[derive(Debug)]
pub struct Participant {
    pub user_id: UserId,
    pub user_name: String,
    pub session_id: Option<SessionId>,
    /// `None` once the socket is gone.
    pub sender: Option<FrameSender>,
    pub collection: HashMap<CardId, u32>,
    pub use_collection: bool,
}

impl Participant {
    pub fn new(user_id: UserId, user_name: String, sender: FrameSender) -> Self {
        Self {
            user_id,
            user_name,
            session_id: None,
            sender: Some(sender),
            collection: HashMap::new(),
            use_collection: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_some()
    }
}

#[derive(Default)]
pub struct Registry {
    participants: DashMap<UserId, Arc<Mutex<Participant>>>,
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // -- participants ------------------------------------------------------

    pub fn participant(&self, uid: &UserId) -> Option<Arc<Mutex<Participant>>> {
        self.participants.get(uid).map(|entry| entry.value().clone())
    }

    pub fn insert_participant(&self, participant: Participant) -> Arc<Mutex<Participant>> {
        let uid = participant.user_id.clone();
        let arc = Arc::new(Mutex::new(participant));
        self.participants.insert(uid, arc.clone());
        arc
    }

    pub fn remove_participant(&self, uid: &UserId) {
        self.participants.remove(uid);
    }

    /// Whether this user id currently has a live socket attached.
    pub fn is_connected(&self, uid: &UserId) -> bool {
        self.participant(uid)
            .map(|p| p.lock().is_connected())
            .unwrap_or(false)
    }

    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.participants
            .iter()
            .filter(|entry| entry.value().lock().is_connected())
            .map(|entry| entry.key().clone())
            .collect()
    }

    // -- sessions ----------------------------------------------------------

    pub fn session(&self, sid: &SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(sid).map(|entry| entry.value().clone())
    }

    /// Fetch or create the session `sid`, the creator becoming owner.
    pub fn session_or_create(&self, sid: &SessionId, owner: &UserId) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(sid.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(sid.clone(), owner.clone()))))
            .value()
            .clone()
    }

    /// Drop a session. Re-broadcasts the public list if it was public.
    pub fn destroy_session(&self, sid: &SessionId) {
        let was_public = self
            .sessions
            .remove(sid)
            .map(|(_, session)| session.lock().options.is_public)
            .unwrap_or(false);
        tracing::info!(session_id = %sid, "session destroyed");
        if was_public {
            self.broadcast_public_sessions();
        }
    }

    /// A join code no live session is using.
    pub fn unique_session_code(&self) -> SessionId {
        let mut rng = StdRng::from_entropy();
        loop {
            let code = draftpod_common::id::session_code(&mut rng);
            if !self.sessions.contains_key(&code) {
                return code;
            }
        }
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    // -- fan-out -----------------------------------------------------------

    /// Queue a frame for one participant. Dropped silently when they are
    /// not connected; per-participant ordering is the channel's.
    pub fn send_to_user(&self, uid: &UserId, frame: ServerFrame) {
        if let Some(participant) = self.participant(uid) {
            let participant = participant.lock();
            if let Some(sender) = &participant.sender {
                let _ = sender.send(frame);
            }
        }
    }

    /// Global broadcast; only the public-session list uses this.
    pub fn send_to_all(&self, frame: ServerFrame) {
        for entry in self.participants.iter() {
            let participant = entry.value().lock();
            if let Some(sender) = &participant.sender {
                let _ = sender.send(frame.clone());
            }
        }
    }

    /// Tear down sessions whose draft lost every member: no connected
    /// users and every disconnect older than `ttl`. Returns how many were
    /// removed.
    pub fn cleanup_stale_sessions(&self, ttl: std::time::Duration) -> usize {
        let stale: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| {
                let session = entry.value().lock();
                session.users.is_empty()
                    && !session.disconnected.is_empty()
                    && session
                        .disconnected
                        .values()
                        .all(|d| d.disconnected_at.elapsed() > ttl)
            })
            .map(|entry| entry.key().clone())
            .collect();
        for sid in &stale {
            self.destroy_session(sid);
        }
        stale.len()
    }

    // -- public session list ----------------------------------------------

    pub fn public_session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| {
                let session = entry.value().lock();
                session.options.is_public && !session.draft.is_drafting()
            })
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn broadcast_public_sessions(&self) {
        let ids = self.public_session_ids();
        self.send_to_all(ServerFrame::event(EventName::PUBLIC_SESSIONS, &ids));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (FrameSender, mpsc::UnboundedReceiver<ServerFrame>) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn send_to_user_queues_in_order() {
        let registry = Registry::new();
        let (tx, mut rx) = channel();
        registry.insert_participant(Participant::new("u1".to_string(), "Alice".to_string(), tx));

        registry.send_to_user(&"u1".to_string(), ServerFrame::signal("first"));
        registry.send_to_user(&"u1".to_string(), ServerFrame::signal("second"));

        assert_eq!(rx.try_recv().unwrap().t, "first");
        assert_eq!(rx.try_recv().unwrap().t, "second");
    }

    #[test]
    fn send_to_disconnected_user_is_dropped() {
        let registry = Registry::new();
        let (tx, rx) = channel();
        let arc = registry.insert_participant(Participant::new(
            "u1".to_string(),
            "Alice".to_string(),
            tx,
        ));
        arc.lock().sender = None;
        drop(rx);

        // Must not panic or error.
        registry.send_to_user(&"u1".to_string(), ServerFrame::signal("lost"));
        assert!(!registry.is_connected(&"u1".to_string()));
    }

    #[test]
    fn session_or_create_sets_first_joiner_as_owner() {
        let registry = Registry::new();
        let session = registry.session_or_create(&"ABCDEF".to_string(), &"u1".to_string());
        assert_eq!(session.lock().owner, "u1");

        // Second call returns the same session, owner unchanged.
        let again = registry.session_or_create(&"ABCDEF".to_string(), &"u2".to_string());
        assert_eq!(again.lock().owner, "u1");
    }

    #[test]
    fn unique_session_code_avoids_live_sessions() {
        let registry = Registry::new();
        let code = registry.unique_session_code();
        assert_eq!(code.len(), draftpod_common::id::JOIN_CODE_LEN);
        assert!(registry.session(&code).is_none());
    }

    #[test]
    fn public_list_excludes_private_and_drafting() {
        let registry = Registry::new();
        registry
            .session_or_create(&"PUBLIC".to_string(), &"u1".to_string())
            .lock()
            .options
            .is_public = true;
        registry.session_or_create(&"HIDDEN".to_string(), &"u2".to_string());

        assert_eq!(registry.public_session_ids(), vec!["PUBLIC".to_string()]);
    }
}
