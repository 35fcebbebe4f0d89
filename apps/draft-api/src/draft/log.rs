//! In-memory draft log: every pick and burn, per participant, plus a deep
//! copy of the boosters as generated. Never persisted; dispatched to
//! clients at draft end according to the session's recipient mode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::booster::Booster;
use crate::catalog::CardId;
use crate::{SessionId, UserId};

/// Who receives the draft log when the draft ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftLogRecipients {
    None,
    Owner,
    /// Everyone receives a copy reduced to their own picks; the owner
    /// holds the full log for a later reveal.
    Delayed,
    Everyone,
}

impl std::str::FromStr for DraftLogRecipients {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "owner" => Ok(Self::Owner),
            "delayed" => Ok(Self::Delayed),
            "everyone" => Ok(Self::Everyone),
            _ => Err(()),
        }
    }
}

/// One pick: what was taken, what was burned, and the booster as the
/// player saw it (before removal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickEntry {
    pub pick: CardId,
    pub burn: Vec<CardId>,
    pub booster: Vec<CardId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLogUser {
    pub user_name: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_bot: bool,
    pub picks: Vec<PickEntry>,
    /// Final card list, filled in at draft end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<CardId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLog {
    pub session_id: SessionId,
    /// Unix milliseconds at draft start.
    pub time: i64,
    pub set_restriction: Vec<String>,
    pub boosters: Vec<Booster>,
    pub users: BTreeMap<String, DraftLogUser>,
}

impl DraftLog {
    pub fn new(session_id: SessionId, set_restriction: Vec<String>, boosters: Vec<Booster>) -> Self {
        Self {
            session_id,
            time: chrono::Utc::now().timestamp_millis(),
            set_restriction,
            boosters,
            users: BTreeMap::new(),
        }
    }

    pub fn add_user(&mut self, user_id: &UserId, user_name: &str, is_bot: bool) {
        self.users.insert(
            user_id.clone(),
            DraftLogUser {
                user_name: user_name.to_string(),
                user_id: user_id.clone(),
                is_bot,
                picks: Vec::new(),
                cards: None,
            },
        );
    }

    pub fn record_pick(&mut self, user_id: &UserId, entry: PickEntry) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.picks.push(entry);
        }
    }

    pub fn set_cards(&mut self, user_id: &UserId, cards: Vec<CardId>) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.cards = Some(cards);
        }
    }

    /// Copy of the log reduced to one participant's own picks, for the
    /// `delayed` recipient mode.
    pub fn personalized(&self, user_id: &UserId) -> Self {
        let mut copy = self.clone();
        for (uid, user) in copy.users.iter_mut() {
            if uid != user_id {
                user.picks.clear();
                user.cards = None;
            }
        }
        copy
    }
}
