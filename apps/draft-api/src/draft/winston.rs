//! Winston draft: two players alternate over three face-down piles fed by
//! a shared shuffled pool.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::booster::Booster;
use crate::catalog::CardId;
use crate::error::SessionError;
use crate::gateway::events::{EventName, ServerFrame, Target};
use crate::UserId;

#[derive(Debug)]
pub struct WinstonDraft {
    pub players: [UserId; 2],
    pub round: u32,
    pub piles: [Vec<CardId>; 3],
    pub current_pile: usize,
    /// Remaining shuffled cards, drawn from the back.
    pub card_pool: Vec<CardId>,
    pub picked: HashMap<UserId, Vec<CardId>>,
    pub ended: bool,
}

impl WinstonDraft {
    /// Shuffle all generated packs into one pool and seed the piles with
    /// one card each.
    pub fn start<R: Rng>(
        players: [UserId; 2],
        packs: Vec<Booster>,
        rng: &mut R,
    ) -> (Self, Vec<(Target, ServerFrame)>) {
        let mut card_pool: Vec<CardId> = packs.into_iter().flatten().collect();
        card_pool.shuffle(rng);

        let mut piles: [Vec<CardId>; 3] = Default::default();
        for pile in piles.iter_mut() {
            if let Some(card) = card_pool.pop() {
                pile.push(card);
            }
        }

        let draft = Self {
            picked: players
                .iter()
                .map(|uid| (uid.clone(), Vec::new()))
                .collect(),
            players,
            round: 0,
            piles,
            current_pile: 0,
            card_pool,
            ended: false,
        };

        let mut events = vec![(
            Target::Session,
            ServerFrame::event(
                EventName::START_WINSTON_DRAFT,
                &serde_json::json!({
                    "players": draft.players,
                    "currentPlayer": draft.current_player(),
                }),
            ),
        )];
        events.push(draft.sync_event());
        (draft, events)
    }

    pub fn current_player(&self) -> &UserId {
        &self.players[(self.round % 2) as usize]
    }

    fn sync_event(&self) -> (Target, ServerFrame) {
        (
            Target::Session,
            ServerFrame::event(
                EventName::WINSTON_DRAFT_SYNC,
                &serde_json::json!({
                    "piles": self.piles,
                    "currentPile": self.current_pile,
                    "remainingCards": self.card_pool.len(),
                    "currentPlayer": self.current_player(),
                }),
            ),
        )
    }

    fn require_turn(&self, uid: &UserId) -> Result<(), SessionError> {
        if self.ended {
            return Err(SessionError::Validation("draft already ended".to_string()));
        }
        if self.current_player() != uid {
            return Err(SessionError::Validation("not your turn".to_string()));
        }
        Ok(())
    }

    /// Take the current pile; it is replenished with one pool card.
    pub fn take_pile(&mut self, uid: &UserId) -> Result<Vec<(Target, ServerFrame)>, SessionError> {
        self.require_turn(uid)?;

        let pile = std::mem::take(&mut self.piles[self.current_pile]);
        self.picked.get_mut(uid).expect("player tracked").extend(pile);
        if let Some(card) = self.card_pool.pop() {
            self.piles[self.current_pile].push(card);
        }

        Ok(self.next_round())
    }

    /// Pass on the current pile, growing it by one pool card. Passing on
    /// the last pile hands the player the top of the pool instead.
    pub fn skip_pile(&mut self, uid: &UserId) -> Result<Vec<(Target, ServerFrame)>, SessionError> {
        self.require_turn(uid)?;
        Ok(self.skip_inner(uid))
    }

    fn skip_inner(&mut self, uid: &UserId) -> Vec<(Target, ServerFrame)> {
        if self.current_pile == 2 && self.card_pool.is_empty() {
            // Nothing left to draw; the last pile cannot be skipped.
            return vec![(
                Target::User(uid.clone()),
                ServerFrame::event(
                    EventName::MESSAGE,
                    &crate::gateway::events::MessagePayload::notice(
                        "Cannot skip",
                        "You have to take this pile.",
                    ),
                ),
            )];
        }

        if let Some(card) = self.card_pool.pop() {
            self.piles[self.current_pile].push(card);
        }

        if self.current_pile < 2 {
            self.current_pile += 1;
            if self.piles[self.current_pile].is_empty() {
                return self.skip_inner(uid);
            }
            vec![self.sync_event()]
        } else {
            let mut events = Vec::new();
            if let Some(card) = self.card_pool.pop() {
                self.picked.get_mut(uid).expect("player tracked").push(card);
                events.push((
                    Target::User(uid.clone()),
                    ServerFrame::event(
                        EventName::WINSTON_DRAFT_RANDOM_CARD,
                        &serde_json::json!(card),
                    ),
                ));
            }
            events.extend(self.next_round());
            events
        }
    }

    /// Start the next round, ending the draft when every pile is empty.
    fn next_round(&mut self) -> Vec<(Target, ServerFrame)> {
        self.round += 1;
        self.current_pile = 0;

        if self.piles.iter().all(|p| p.is_empty()) {
            self.ended = true;
            return vec![(
                Target::Session,
                ServerFrame::signal(EventName::WINSTON_DRAFT_END),
            )];
        }

        // A dry pool can leave leading piles empty; position the player on
        // the first pile that still holds cards.
        while self.piles[self.current_pile].is_empty() {
            self.current_pile += 1;
        }

        vec![
            (
                Target::Session,
                ServerFrame::event(
                    EventName::WINSTON_DRAFT_NEXT_ROUND,
                    &serde_json::json!(self.current_player()),
                ),
            ),
            self.sync_event(),
        ]
    }

    /// State payload for a reconnecting player.
    pub fn rejoin_state(&self, uid: &UserId) -> serde_json::Value {
        serde_json::json!({
            "pickedCards": self.picked.get(uid).cloned().unwrap_or_default(),
            "piles": self.piles,
            "currentPile": self.current_pile,
            "round": self.round,
            "currentPlayer": self.current_player(),
            "remainingCards": self.card_pool.len(),
        })
    }

    pub fn total_picked(&self) -> usize {
        self.picked.values().map(|cards| cards.len()).sum()
    }
}
