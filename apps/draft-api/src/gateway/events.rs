//! Wire-format messages: the `{t, d}` envelope, outbound event names, and
//! the closed set of inbound client events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::CardId;
use crate::{SessionId, UserId};

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A message sent from the server to a client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame {
    pub t: String,
    pub d: Value,
}

impl ServerFrame {
    /// Build an event frame from any serializable payload.
    pub fn event<T: Serialize>(name: &str, data: &T) -> Self {
        Self {
            t: name.to_string(),
            d: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// Build an event frame with no payload.
    pub fn signal(name: &str) -> Self {
        Self {
            t: name.to_string(),
            d: Value::Null,
        }
    }
}

/// Event names dispatched to clients.
pub struct EventName;

impl EventName {
    pub const ALREADY_CONNECTED: &'static str = "alreadyConnected";
    pub const PUBLIC_SESSIONS: &'static str = "publicSessions";
    pub const SESSION_OWNER: &'static str = "sessionOwner";
    pub const SESSION_USERS: &'static str = "sessionUsers";
    pub const SESSION_OPTIONS: &'static str = "sessionOptions";
    pub const UPDATE_USER: &'static str = "updateUser";
    pub const CHAT_MESSAGE: &'static str = "chatMessage";
    pub const MESSAGE: &'static str = "message";
    pub const SET_SESSION: &'static str = "setSession";
    pub const SET_CARD_SELECTION: &'static str = "setCardSelection";
    pub const START_DRAFT: &'static str = "startDraft";
    pub const NEXT_BOOSTER: &'static str = "nextBooster";
    pub const END_DRAFT: &'static str = "endDraft";
    pub const DRAFT_LOG: &'static str = "draftLog";
    pub const PICK_ACK: &'static str = "pickAck";
    pub const TIMER: &'static str = "timer";
    pub const DISABLE_TIMER: &'static str = "disableTimer";
    pub const USER_DISCONNECTED: &'static str = "userDisconnected";
    pub const REJOIN_DRAFT: &'static str = "rejoinDraft";
    pub const START_WINSTON_DRAFT: &'static str = "startWinstonDraft";
    pub const WINSTON_DRAFT_SYNC: &'static str = "winstonDraftSync";
    pub const WINSTON_DRAFT_NEXT_ROUND: &'static str = "winstonDraftNextRound";
    pub const WINSTON_DRAFT_RANDOM_CARD: &'static str = "winstonDraftRandomCard";
    pub const WINSTON_DRAFT_END: &'static str = "winstonDraftEnd";
    pub const REJOIN_WINSTON_DRAFT: &'static str = "rejoinWinstonDraft";
    pub const BRACKET: &'static str = "bracket";

    // Dedicated option echoes.
    pub const BOTS: &'static str = "bots";
    pub const BOOSTERS_PER_PLAYER: &'static str = "boostersPerPlayer";
    pub const SET_RESTRICTION: &'static str = "setRestriction";
    pub const IS_PUBLIC: &'static str = "isPublic";
    pub const SET_PICK_TIMER: &'static str = "setPickTimer";
    pub const SET_MAX_PLAYERS: &'static str = "setMaxPlayers";
    pub const SET_MAX_RARITY: &'static str = "setMaxRarity";
    pub const IGNORE_COLLECTIONS: &'static str = "ignoreCollections";
}

/// Who a produced event goes to. Session code returns `(Target, frame)`
/// pairs; the fanout layer resolves them against live connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    User(UserId),
    Session,
    SessionExcept(UserId),
    Owner,
}

// ---------------------------------------------------------------------------
// Common payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBoosterPayload {
    pub booster: Vec<CardId>,
    pub booster_number: u32,
    pub pick_number: u32,
}

/// On-screen notice, `message` event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub title: String,
    pub text: String,
    pub show_confirm_button: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
}

impl MessagePayload {
    pub fn notice(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            show_confirm_button: true,
            timer: None,
        }
    }

    /// Auto-dismissing toast.
    pub fn toast(title: impl Into<String>, seconds: u32) -> Self {
        Self {
            title: title.into(),
            text: String::new(),
            show_confirm_button: false,
            timer: Some(seconds * 1000),
        }
    }
}

/// Acknowledgement for `pickCard`.
#[derive(Debug, Clone, Serialize)]
pub struct PickAckPayload {
    pub code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PickAckPayload {
    pub fn ok() -> Self {
        Self {
            code: 0,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            code: 1,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Every event a client may send. Unknown or malformed frames fail to
/// deserialize and are dropped by the connection loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "camelCase")]
pub enum ClientEvent {
    SetUserName(String),
    SetSession(SessionId),
    SetCollection(std::collections::HashMap<CardId, u32>),
    UseCollection(bool),
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        text: String,
    },
    StartDraft,
    #[serde(rename_all = "camelCase")]
    PickCard {
        selected_card: CardId,
        #[serde(default)]
        burned_cards: Vec<CardId>,
    },
    SetSessionOwner(UserId),
    RemovePlayer(UserId),
    BoostersPerPlayer(u32),
    Bots(u32),
    SetRestriction(Vec<String>),
    CustomCardList(Vec<CardId>),
    ParseCustomCardList(String),
    LoadLocalCustomCardList(String),
    IgnoreCollections(bool),
    SetPickTimer(u32),
    SetMaxPlayers(u32),
    SetMaxRarity(String),
    SetColorBalance(bool),
    SetUseCustomCardList(bool),
    SetFoil(bool),
    SetPublic(bool),
    SetMaxDuplicates(crate::booster::MaxDuplicates),
    SetBurnedCardsPerRound(u32),
    SetCustomBoosters(Vec<String>),
    SetDistributionMode(String),
    SetDraftLogRecipients(String),
    SetOwnerIsPlayer(bool),
    SetSeating(Vec<UserId>),
    RandomizeSeating,
    ReplaceDisconnectedPlayers,
    DistributeSealed(u32),
    DistributeJumpstart,
    StartWinstonDraft(u32),
    WinstonDraftTakePile,
    WinstonDraftSkipPile,
    GenerateBracket,
    #[serde(rename_all = "camelCase")]
    UpdateBracket {
        index: usize,
        wins: [u32; 2],
    },
}
