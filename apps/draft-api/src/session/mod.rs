//! A draft session: membership, options, the live draft, the pick timer,
//! and event fan-out to its participants.
//!
//! Every mutation of one session happens under its registry lock, so all
//! operations here take `&mut self` and are serialized per session. None
//! of them may lock another session (the registry's public-list broadcast
//! locks every session, so callers run it only after releasing this one).

pub mod options;
pub mod timer;

use std::collections::HashMap;

use rand::Rng;
use serde_json::json;

use crate::booster::{
    self, Booster, CardPool, CustomCardList, DistributionMode, MaxDuplicates, PackPlan,
};
use crate::catalog::{jumpstart, CardId, Catalog, Rarity};
use crate::draft::{Bracket, DraftLogRecipients, DraftState, TraditionalDraft, WinstonDraft};
use crate::error::SessionError;
use crate::gateway::events::{EventName, MessagePayload, ServerFrame, Target};
use crate::registry::Registry;
use crate::{SessionId, UserId};

pub use options::SessionOptions;
pub use timer::PickTimer;

/// Maximum sealed boosters per player.
const SEALED_BOOSTER_CAP: u32 = 12;
/// Chat messages are truncated to this many characters.
const CHAT_MAX_CHARS: usize = 255;

/// Snapshot of a participant who dropped mid-draft. Their draft state
/// stays inside the machine; this records who they were and when they
/// left (for the stale-session sweeper).
#[derive(Debug, Clone)]
pub struct DisconnectedPlayer {
    pub user_name: String,
    pub disconnected_at: std::time::Instant,
}

/// What became of a session after a participant left it.
#[derive(Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Session continues with its remaining members.
    Kept,
    /// Ownership moved to the first remaining member.
    OwnerChanged(UserId),
    /// No members remain; the caller should destroy the session.
    Empty,
    /// Mid-draft: the participant was snapshotted, not removed.
    Snapshotted,
}

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub owner: UserId,
    pub owner_is_player: bool,
    /// Membership in seating order.
    pub users: Vec<UserId>,
    pub options: SessionOptions,
    pub draft: DraftState,
    pub disconnected: HashMap<UserId, DisconnectedPlayer>,
    pub bracket: Option<Bracket>,
    pub timer: PickTimer,
}

impl Session {
    pub fn new(id: SessionId, owner: UserId) -> Self {
        tracing::info!(session_id = %id, owner = %owner, "session created");
        Self {
            id,
            owner,
            owner_is_player: true,
            users: Vec::new(),
            options: SessionOptions::default(),
            draft: DraftState::None,
            disconnected: HashMap::new(),
            bracket: None,
            timer: PickTimer::default(),
        }
    }

    pub fn require_owner(&self, caller: &UserId) -> Result<(), SessionError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(SessionError::Permission)
        }
    }

    /// Whether a joining participant must be redirected elsewhere.
    pub fn is_joinable(&self, uid: &UserId) -> bool {
        if self.disconnected.contains_key(uid) {
            return true;
        }
        if self.draft.is_drafting() {
            return false;
        }
        self.options.max_players == 0 || (self.users.len() as u32) < self.options.max_players
    }

    // -- fan-out -----------------------------------------------------------

    /// Everyone who receives session events: members, plus the non-playing
    /// owner.
    fn recipients(&self) -> Vec<UserId> {
        let mut out = self.users.clone();
        if !self.owner_is_player && !out.contains(&self.owner) {
            out.push(self.owner.clone());
        }
        out
    }

    pub fn broadcast(&self, reg: &Registry, frame: ServerFrame) {
        for uid in self.recipients() {
            reg.send_to_user(&uid, frame.clone());
        }
    }

    pub fn broadcast_except(&self, reg: &Registry, except: &UserId, frame: ServerFrame) {
        for uid in self.recipients() {
            if uid != *except {
                reg.send_to_user(&uid, frame.clone());
            }
        }
    }

    pub fn dispatch(&self, reg: &Registry, events: Vec<(Target, ServerFrame)>) {
        for (target, frame) in events {
            match target {
                Target::User(uid) => reg.send_to_user(&uid, frame),
                Target::Session => self.broadcast(reg, frame),
                Target::SessionExcept(uid) => self.broadcast_except(reg, &uid, frame),
                Target::Owner => reg.send_to_user(&self.owner, frame),
            }
        }
    }

    /// `sessionUsers` payload: who is here, with collection status.
    pub fn user_list(&self, reg: &Registry) -> serde_json::Value {
        let users: Vec<serde_json::Value> = self
            .users
            .iter()
            .filter_map(|uid| {
                let participant = reg.participant(uid)?;
                let p = participant.lock();
                Some(json!({
                    "userID": p.user_id,
                    "userName": p.user_name,
                    "collection": p.use_collection && !p.collection.is_empty(),
                }))
            })
            .collect();
        json!(users)
    }

    // -- membership --------------------------------------------------------

    /// Add a participant and bring them up to date.
    pub fn add_user(&mut self, reg: &Registry, uid: &UserId) {
        if !self.users.contains(uid) {
            self.users.push(uid.clone());
        }
        reg.send_to_user(
            uid,
            ServerFrame::event(EventName::SESSION_OPTIONS, &self.options.snapshot()),
        );
        reg.send_to_user(
            uid,
            ServerFrame::event(EventName::SESSION_OWNER, &json!(self.owner)),
        );
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_USERS, &self.user_list(reg)),
        );
    }

    /// Handle a participant leaving or losing their socket.
    pub fn handle_leave(&mut self, reg: &Registry, uid: &UserId) -> LeaveOutcome {
        let seated = match &self.draft {
            DraftState::Traditional(d) => d.players.contains_key(uid),
            DraftState::Winston(d) => d.players.contains(uid),
            DraftState::None => false,
        };
        if self.draft.is_drafting() && seated {
            self.snapshot_disconnect(reg, uid);
            return LeaveOutcome::Snapshotted;
        }

        self.users.retain(|u| u != uid);
        self.disconnected.remove(uid);

        let owner_retained = !self.owner_is_player && reg.is_connected(&self.owner);
        if self.users.is_empty() && !(owner_retained && *uid != self.owner) {
            return LeaveOutcome::Empty;
        }
        if self.users.is_empty() {
            return LeaveOutcome::Kept;
        }

        let outcome = if *uid == self.owner {
            // Implicit transfer: first remaining member takes over.
            self.owner = self.users[0].clone();
            self.owner_is_player = true;
            self.broadcast(
                reg,
                ServerFrame::event(EventName::SESSION_OWNER, &json!(self.owner)),
            );
            LeaveOutcome::OwnerChanged(self.owner.clone())
        } else {
            LeaveOutcome::Kept
        };
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_USERS, &self.user_list(reg)),
        );
        outcome
    }

    fn snapshot_disconnect(&mut self, reg: &Registry, uid: &UserId) {
        let user_name = reg
            .participant(uid)
            .map(|p| p.lock().user_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        self.users.retain(|u| u != uid);
        self.disconnected.insert(
            uid.clone(),
            DisconnectedPlayer {
                user_name,
                disconnected_at: std::time::Instant::now(),
            },
        );
        if let DraftState::Traditional(draft) = &mut self.draft {
            draft.mark_disconnected(uid);
        }
        self.timer.pause();

        let names: Vec<String> = self
            .disconnected
            .values()
            .map(|d| d.user_name.clone())
            .collect();
        self.broadcast(
            reg,
            ServerFrame::event(EventName::USER_DISCONNECTED, &names),
        );
        tracing::info!(session_id = %self.id, user_id = %uid, "participant disconnected mid-draft");
    }

    /// Reconnect a snapshotted participant. Returns `false` when they were
    /// not part of this session's draft.
    pub fn reconnect_user(&mut self, reg: &Registry, uid: &UserId) -> bool {
        let Some(snapshot) = self.disconnected.remove(uid) else {
            return false;
        };
        if !self.users.contains(uid) {
            self.users.push(uid.clone());
        }

        let events = match &mut self.draft {
            DraftState::Traditional(draft) => draft.reconnect(uid).unwrap_or_default(),
            DraftState::Winston(draft) => vec![(
                Target::User(uid.clone()),
                ServerFrame::event(EventName::REJOIN_WINSTON_DRAFT, &draft.rejoin_state(uid)),
            )],
            DraftState::None => Vec::new(),
        };
        self.dispatch(reg, events);

        self.broadcast_except(
            reg,
            uid,
            ServerFrame::event(
                EventName::MESSAGE,
                &MessagePayload::toast(format!("{} reconnected", snapshot.user_name), 5),
            ),
        );
        let names: Vec<String> = self
            .disconnected
            .values()
            .map(|d| d.user_name.clone())
            .collect();
        self.broadcast(
            reg,
            ServerFrame::event(EventName::USER_DISCONNECTED, &names),
        );

        let all_back = match &self.draft {
            DraftState::Traditional(d) => !d.has_disconnected(),
            _ => self.disconnected.is_empty(),
        };
        if all_back {
            // The draft resumes: everyone sees their current pack again.
            if let DraftState::Traditional(d) = &self.draft {
                let events = d.resend_boosters();
                self.dispatch(reg, events);
            }
            self.timer.resume();
        }
        true
    }

    // -- chat --------------------------------------------------------------

    pub fn chat_message(&self, reg: &Registry, sender: &UserId, text: &str) {
        let text: String = text.chars().take(CHAT_MAX_CHARS).collect();
        self.broadcast(
            reg,
            ServerFrame::event(
                EventName::CHAT_MESSAGE,
                &json!({
                    "sender": sender,
                    "text": text,
                    "timestamp": chrono::Utc::now().timestamp_millis(),
                }),
            ),
        );
    }

    // -- owner & seating ---------------------------------------------------

    pub fn set_session_owner(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        new_owner: UserId,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if new_owner == self.owner || !self.users.contains(&new_owner) {
            return Err(SessionError::BadInput("invalid new owner".to_string()));
        }
        self.owner = new_owner;
        self.owner_is_player = true;
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_OWNER, &json!(self.owner)),
        );
        Ok(())
    }

    pub fn set_seating(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        order: Vec<UserId>,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput(
                "seating is frozen while drafting".to_string(),
            ));
        }
        // Must be a permutation of the current membership.
        let mut sorted_new = order.clone();
        let mut sorted_cur = self.users.clone();
        sorted_new.sort();
        sorted_cur.sort();
        if sorted_new != sorted_cur {
            return Err(SessionError::BadInput(
                "seating must contain exactly the current players".to_string(),
            ));
        }
        self.users = order;
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_USERS, &self.user_list(reg)),
        );
        Ok(())
    }

    pub fn randomize_seating<R: Rng>(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        use rand::seq::SliceRandom;
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput(
                "seating is frozen while drafting".to_string(),
            ));
        }
        self.users.shuffle(rng);
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_USERS, &self.user_list(reg)),
        );
        Ok(())
    }

    // -- bracket -----------------------------------------------------------

    pub fn generate_bracket(&mut self, reg: &Registry, caller: &UserId) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        let names: Vec<String> = self
            .users
            .iter()
            .filter_map(|uid| reg.participant(uid).map(|p| p.lock().user_name.clone()))
            .collect();
        let bracket = Bracket::new(names);
        self.broadcast(reg, ServerFrame::event(EventName::BRACKET, &bracket));
        self.bracket = Some(bracket);
        Ok(())
    }

    pub fn update_bracket(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        index: usize,
        wins: [u32; 2],
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        let bracket = self
            .bracket
            .as_mut()
            .ok_or_else(|| SessionError::BadInput("no bracket generated".to_string()))?;
        bracket.update(index, wins)?;
        let frame = ServerFrame::event(EventName::BRACKET, &*bracket);
        self.broadcast(reg, frame);
        Ok(())
    }

    // -- option setters ----------------------------------------------------
    //
    // All owner-gated and idempotent: an unchanged value does nothing, a
    // change is echoed to everyone except the owner who made it.

    fn echo<T: serde::Serialize>(&self, reg: &Registry, caller: &UserId, name: &str, value: &T) {
        self.broadcast_except(reg, caller, ServerFrame::event(name, value));
    }

    /// Coalesced delta for options without a dedicated event.
    fn echo_delta<T: serde::Serialize>(&self, reg: &Registry, caller: &UserId, key: &str, value: &T) {
        self.broadcast_except(
            reg,
            caller,
            ServerFrame::event(EventName::SESSION_OPTIONS, &json!({ key: value })),
        );
    }

    pub fn set_bots(&mut self, reg: &Registry, caller: &UserId, n: u32) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.bots != n {
            self.options.bots = n;
            self.echo(reg, caller, EventName::BOTS, &n);
        }
        Ok(())
    }

    pub fn set_boosters_per_player(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        n: u32,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if n < 1 {
            return Err(SessionError::BadInput(
                "boostersPerPlayer must be at least 1".to_string(),
            ));
        }
        if self.options.boosters_per_player != n {
            self.options.boosters_per_player = n;
            self.echo(reg, caller, EventName::BOOSTERS_PER_PLAYER, &n);
        }
        Ok(())
    }

    pub fn set_restriction(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        sets: Vec<String>,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.set_restriction != sets {
            self.options.set_restriction = sets;
            self.echo(
                reg,
                caller,
                EventName::SET_RESTRICTION,
                &self.options.set_restriction,
            );
        }
        Ok(())
    }

    /// Returns `true` when the public flag changed; the caller must then
    /// re-broadcast the public session list (outside this session's lock).
    pub fn set_public(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        public: bool,
    ) -> Result<bool, SessionError> {
        self.require_owner(caller)?;
        if self.options.is_public == public {
            return Ok(false);
        }
        self.options.is_public = public;
        self.echo(reg, caller, EventName::IS_PUBLIC, &public);
        Ok(true)
    }

    pub fn set_pick_timer(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        seconds: u32,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.max_timer != seconds {
            self.options.max_timer = seconds;
            self.echo(reg, caller, EventName::SET_PICK_TIMER, &seconds);
        }
        Ok(())
    }

    pub fn set_max_players(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        n: u32,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.max_players != n {
            self.options.max_players = n;
            self.echo(reg, caller, EventName::SET_MAX_PLAYERS, &n);
        }
        Ok(())
    }

    pub fn set_max_rarity(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        rarity: Rarity,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.max_rarity != rarity {
            self.options.max_rarity = rarity;
            self.echo(reg, caller, EventName::SET_MAX_RARITY, &rarity);
        }
        Ok(())
    }

    pub fn set_ignore_collections(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        ignore: bool,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.ignore_collections != ignore {
            self.options.ignore_collections = ignore;
            self.echo(reg, caller, EventName::IGNORE_COLLECTIONS, &ignore);
        }
        Ok(())
    }

    pub fn set_color_balance(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        on: bool,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.color_balance != on {
            self.options.color_balance = on;
            self.echo_delta(reg, caller, "colorBalance", &on);
        }
        Ok(())
    }

    pub fn set_foil(&mut self, reg: &Registry, caller: &UserId, on: bool) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.foil != on {
            self.options.foil = on;
            self.echo_delta(reg, caller, "foil", &on);
        }
        Ok(())
    }

    pub fn set_use_custom_card_list(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        on: bool,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.use_custom_card_list != on {
            self.options.use_custom_card_list = on;
            self.echo_delta(reg, caller, "useCustomCardList", &on);
        }
        Ok(())
    }

    pub fn set_custom_card_list(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        list: CustomCardList,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.custom_card_list != list {
            self.options.custom_card_list = list;
            self.options.use_custom_card_list = true;
            self.echo_delta(
                reg,
                caller,
                "customCardListLength",
                &self.options.custom_card_list.card_count(),
            );
        }
        Ok(())
    }

    pub fn set_max_duplicates(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        limits: MaxDuplicates,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.max_duplicates != limits {
            self.options.max_duplicates = limits;
            self.echo_delta(reg, caller, "maxDuplicates", &limits);
        }
        Ok(())
    }

    pub fn set_burned_cards_per_round(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        n: u32,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.burned_cards_per_round != n {
            self.options.burned_cards_per_round = n;
            self.echo_delta(reg, caller, "burnedCardsPerRound", &n);
        }
        Ok(())
    }

    pub fn set_custom_boosters(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        rounds: Vec<String>,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.custom_boosters != rounds {
            self.options.custom_boosters = rounds;
            self.echo_delta(reg, caller, "customBoosters", &self.options.custom_boosters);
        }
        Ok(())
    }

    pub fn set_distribution_mode(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        mode: DistributionMode,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.distribution_mode != mode {
            self.options.distribution_mode = mode;
            self.echo_delta(reg, caller, "distributionMode", &mode);
        }
        Ok(())
    }

    pub fn set_draft_log_recipients(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        mode: DraftLogRecipients,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.options.draft_log_recipients != mode {
            self.options.draft_log_recipients = mode;
            self.echo_delta(reg, caller, "draftLogRecipients", &mode);
        }
        Ok(())
    }

    /// A non-playing owner leaves the seats but keeps receiving session
    /// events and retains ownership.
    pub fn set_owner_is_player(
        &mut self,
        reg: &Registry,
        caller: &UserId,
        is_player: bool,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput(
                "cannot change seats while drafting".to_string(),
            ));
        }
        if self.owner_is_player == is_player {
            return Ok(());
        }
        self.owner_is_player = is_player;
        if is_player {
            if !self.users.contains(&self.owner) {
                self.users.push(self.owner.clone());
            }
        } else {
            let owner = self.owner.clone();
            self.users.retain(|u| *u != owner);
        }
        self.echo_delta(reg, caller, "ownerIsPlayer", &is_player);
        self.broadcast(
            reg,
            ServerFrame::event(EventName::SESSION_USERS, &self.user_list(reg)),
        );
        Ok(())
    }

    // -- collections -------------------------------------------------------

    /// Effective shared collection: intersection over members who opted
    /// in with a non-empty collection. `None` means "use the whole
    /// catalog".
    pub fn effective_collection(&self, reg: &Registry) -> Option<CardPool> {
        if self.options.ignore_collections {
            return None;
        }
        let collections: Vec<HashMap<CardId, u32>> = self
            .users
            .iter()
            .filter_map(|uid| {
                let participant = reg.participant(uid)?;
                let p = participant.lock();
                if p.use_collection && !p.collection.is_empty() {
                    Some(p.collection.clone())
                } else {
                    None
                }
            })
            .collect();
        if collections.is_empty() {
            return None;
        }
        Some(booster::collection_intersection(collections.iter()))
    }

    // -- draft lifecycle ---------------------------------------------------

    fn seated_players(&self, reg: &Registry) -> Vec<(UserId, String)> {
        self.users
            .iter()
            .map(|uid| {
                let name = reg
                    .participant(uid)
                    .map(|p| p.lock().user_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                (uid.clone(), name)
            })
            .collect()
    }

    fn notify_owner_error(&self, reg: &Registry, title: &str, error: impl std::fmt::Display) {
        reg.send_to_user(
            &self.owner,
            ServerFrame::event(
                EventName::MESSAGE,
                &MessagePayload::notice(title, error.to_string()),
            ),
        );
    }

    /// Start a traditional rotation draft. Returns `true` when the draft
    /// actually started (the caller then spawns the timer ticker).
    pub fn start_draft<R: Rng>(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
        rng: &mut R,
    ) -> Result<bool, SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput("a draft is in progress".to_string()));
        }
        let humans = self.seated_players(reg);
        let seats = humans.len() + self.options.bots as usize;
        if seats < 2 {
            self.notify_owner_error(reg, "Not enough players", "A draft needs at least 2 seats.");
            return Ok(false);
        }

        let collection = self.effective_collection(reg);
        let plan = PackPlan {
            boosters_per_player: self.options.boosters_per_player as usize,
            custom_boosters: &self.options.custom_boosters,
            distribution_mode: self.options.distribution_mode,
            options: booster::GenerateOptions {
                set_restriction: self.options.set_restriction.clone(),
                max_rarity: self.options.max_rarity,
                color_balance: self.options.color_balance,
                max_duplicates: self.options.max_duplicates,
                foil: self.options.foil,
            },
            custom_card_list: self
                .options
                .use_custom_card_list
                .then_some(&self.options.custom_card_list),
        };
        let boosters =
            match booster::generate_draft_packs(catalog, collection.as_ref(), &plan, seats, rng) {
                Ok(boosters) => boosters,
                Err(error) => {
                    tracing::warn!(session_id = %self.id, %error, "booster generation failed");
                    self.notify_owner_error(reg, "Unable to start draft", error);
                    return Ok(false);
                }
            };

        let (draft, events) = TraditionalDraft::start(
            self.id.clone(),
            &humans,
            self.options.bots as usize,
            boosters,
            self.options.set_restriction.clone(),
            self.options.burned_cards_per_round,
            self.options.draft_log_recipients,
            catalog,
        );
        self.draft = DraftState::Traditional(draft);
        self.dispatch(reg, events);

        if self.options.max_timer == 0 {
            self.broadcast(reg, ServerFrame::signal(EventName::DISABLE_TIMER));
        } else {
            self.timer.reset(self.options.max_timer, 0);
        }
        tracing::info!(session_id = %self.id, seats, "draft started");
        Ok(true)
    }

    /// Apply one pick. Validation failures surface through the ack; a
    /// successful pick may advance the round or end the draft.
    pub fn pick_card(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
        card: CardId,
        burned: &[CardId],
    ) -> Result<(), SessionError> {
        let max_timer = self.options.max_timer;
        let DraftState::Traditional(draft) = &mut self.draft else {
            return Err(SessionError::Validation("no draft in progress".to_string()));
        };
        let events = draft.pick_card(caller, card, burned, catalog)?;
        let dealt_new_round = events.iter().any(|(_, f)| f.t == EventName::NEXT_BOOSTER);
        let pick_number = draft.pick_number;
        let ended = draft.ended;
        self.dispatch(reg, events);
        if ended {
            self.timer.stop();
        } else if dealt_new_round {
            self.timer.reset(max_timer, pick_number);
        }
        Ok(())
    }

    /// Substitute bots for everyone in the disconnect table (traditional
    /// drafts only) and resume.
    pub fn replace_disconnected_players(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        let max_timer = self.options.max_timer;
        let DraftState::Traditional(draft) = &mut self.draft else {
            return Err(SessionError::BadInput("no draft in progress".to_string()));
        };
        if !draft.has_disconnected() {
            return Ok(());
        }
        let events = draft.replace_disconnected(catalog);
        let pick_number = draft.pick_number;
        let ended = draft.ended;
        self.dispatch(reg, events);
        self.broadcast(
            reg,
            ServerFrame::event(
                EventName::MESSAGE,
                &MessagePayload::toast("Disconnected players replaced by bots", 5),
            ),
        );
        if ended {
            self.timer.stop();
        } else {
            self.timer.reset(max_timer, pick_number);
            self.timer.resume();
        }
        Ok(())
    }

    // -- winston -----------------------------------------------------------

    pub fn start_winston_draft<R: Rng>(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
        booster_count: u32,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput("a draft is in progress".to_string()));
        }
        if self.users.len() != 2 {
            self.notify_owner_error(
                reg,
                "Unable to start Winston draft",
                "Winston draft requires exactly 2 players.",
            );
            return Ok(());
        }
        let booster_count = booster_count.clamp(1, 12) as usize;

        let collection = self.effective_collection(reg);
        let options = booster::GenerateOptions {
            set_restriction: self.options.set_restriction.clone(),
            max_rarity: self.options.max_rarity,
            color_balance: self.options.color_balance,
            max_duplicates: self.options.max_duplicates,
            foil: self.options.foil,
        };
        let packs = if self.options.use_custom_card_list {
            booster::generate_from_custom_list(
                catalog,
                &self.options.custom_card_list,
                self.options.color_balance,
                booster_count,
                rng,
            )
        } else {
            booster::generate(catalog, collection.as_ref(), &options, booster_count, rng)
        };
        let packs = match packs {
            Ok(packs) => packs,
            Err(error) => {
                self.notify_owner_error(reg, "Unable to start Winston draft", error);
                return Ok(());
            }
        };

        let players = [self.users[0].clone(), self.users[1].clone()];
        let (draft, events) = WinstonDraft::start(players, packs, rng);
        self.draft = DraftState::Winston(draft);
        self.dispatch(reg, events);
        tracing::info!(session_id = %self.id, "winston draft started");
        Ok(())
    }

    pub fn winston_take_pile(&mut self, reg: &Registry, caller: &UserId) -> Result<(), SessionError> {
        let DraftState::Winston(draft) = &mut self.draft else {
            return Err(SessionError::Validation(
                "no winston draft in progress".to_string(),
            ));
        };
        let events = draft.take_pile(caller)?;
        self.dispatch(reg, events);
        Ok(())
    }

    pub fn winston_skip_pile(&mut self, reg: &Registry, caller: &UserId) -> Result<(), SessionError> {
        let DraftState::Winston(draft) = &mut self.draft else {
            return Err(SessionError::Validation(
                "no winston draft in progress".to_string(),
            ));
        };
        let events = draft.skip_pile(caller)?;
        self.dispatch(reg, events);
        Ok(())
    }

    // -- sealed / jumpstart ------------------------------------------------

    pub fn distribute_sealed<R: Rng>(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
        boosters_per_player: u32,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput("a draft is in progress".to_string()));
        }
        if boosters_per_player < 1 || boosters_per_player > SEALED_BOOSTER_CAP {
            return Err(SessionError::BadInput(format!(
                "boosters per player must be between 1 and {SEALED_BOOSTER_CAP}"
            )));
        }

        let collection = self.effective_collection(reg);
        let options = booster::GenerateOptions {
            set_restriction: self.options.set_restriction.clone(),
            max_rarity: self.options.max_rarity,
            color_balance: self.options.color_balance,
            max_duplicates: self.options.max_duplicates,
            foil: self.options.foil,
        };
        let per_player = boosters_per_player as usize;
        let quantity = per_player * self.users.len();
        let packs = match booster::generate(catalog, collection.as_ref(), &options, quantity, rng) {
            Ok(packs) => packs,
            Err(error) => {
                self.notify_owner_error(reg, "Unable to distribute sealed pools", error);
                return Ok(());
            }
        };

        for (i, uid) in self.users.iter().enumerate() {
            let pool: Vec<Booster> = packs[i * per_player..(i + 1) * per_player].to_vec();
            reg.send_to_user(uid, ServerFrame::event(EventName::SET_CARD_SELECTION, &pool));
        }
        // Single-shot: nothing is retained server-side.
        self.draft = DraftState::None;
        tracing::info!(session_id = %self.id, per_player, "sealed pools distributed");
        Ok(())
    }

    pub fn distribute_jumpstart<R: Rng>(
        &mut self,
        reg: &Registry,
        catalog: &Catalog,
        caller: &UserId,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        self.require_owner(caller)?;
        if self.draft.is_drafting() {
            return Err(SessionError::BadInput("a draft is in progress".to_string()));
        }
        if catalog.jumpstart_themes.len() < 2 {
            self.notify_owner_error(
                reg,
                "Unable to distribute Jumpstart packs",
                "No Jumpstart themes configured.",
            );
            return Ok(());
        }

        for uid in &self.users {
            let pools = jumpstart::deal_themes(&catalog.jumpstart_themes, 2, rng)
                .expect("theme count checked above");
            reg.send_to_user(uid, ServerFrame::event(EventName::SET_CARD_SELECTION, &pools));
        }
        self.draft = DraftState::None;
        tracing::info!(session_id = %self.id, "jumpstart packs distributed");
        Ok(())
    }
}
