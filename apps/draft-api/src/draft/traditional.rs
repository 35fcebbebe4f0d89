//! Traditional rotation draft: every seat holds a pack, everyone picks
//! once per round, packs rotate, direction alternates per pack.

use std::collections::{HashMap, HashSet};

use crate::booster::Booster;
use crate::bot::Bot;
use crate::catalog::{CardId, Catalog};
use crate::draft::log::{DraftLog, DraftLogRecipients, PickEntry};
use crate::error::SessionError;
use crate::gateway::events::{EventName, NextBoosterPayload, ServerFrame, Target};
use crate::UserId;

/// A seat at the virtual table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seat {
    Human(UserId),
    Bot(usize),
}

/// Draft-local state of one human participant.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub picked_cards: Vec<CardId>,
    pub picked_this_round: bool,
    pub booster_index: Option<usize>,
}

#[derive(Debug)]
pub struct TraditionalDraft {
    /// Frozen seating: humans in seating order, then pure bots.
    pub seats: Vec<Seat>,
    /// Remaining packs; the first `seats.len()` belong to the current
    /// rotation round.
    pub boosters: Vec<Booster>,
    pub booster_number: u32,
    pub pick_number: u32,
    pub players: HashMap<UserId, PlayerState>,
    bots: Vec<Bot>,
    /// Bot substitutes for disconnected humans, keyed by the human's id.
    substitutes: HashMap<UserId, Bot>,
    disconnected: HashSet<UserId>,
    burned_per_round: u32,
    log_recipients: DraftLogRecipients,
    pub log: DraftLog,
    pub ended: bool,
}

fn neg_mod(value: i64, modulus: usize) -> usize {
    let m = modulus as i64;
    (((value % m) + m) % m) as usize
}

impl TraditionalDraft {
    /// Build the machine and deal the first round.
    ///
    /// `humans` is the frozen seating order with display names; `boosters`
    /// must hold `seats × rounds` packs, round-major.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        session_id: String,
        humans: &[(UserId, String)],
        bot_count: usize,
        boosters: Vec<Booster>,
        set_restriction: Vec<String>,
        burned_per_round: u32,
        log_recipients: DraftLogRecipients,
        catalog: &Catalog,
    ) -> (Self, Vec<(Target, ServerFrame)>) {
        let mut seats: Vec<Seat> = humans
            .iter()
            .map(|(uid, _)| Seat::Human(uid.clone()))
            .collect();
        let mut bots = Vec::with_capacity(bot_count);
        for i in 0..bot_count {
            seats.push(Seat::Bot(i));
            bots.push(Bot::new(
                draftpod_common::id::prefixed_ulid(draftpod_common::id::prefix::BOT),
                humans.len() + i,
            ));
        }

        let mut log = DraftLog::new(session_id, set_restriction, boosters.clone());
        for (uid, name) in humans {
            log.add_user(uid, name, false);
        }
        for bot in &bots {
            log.add_user(&bot.id, &bot.name, true);
        }

        let mut draft = Self {
            players: humans
                .iter()
                .map(|(uid, _)| (uid.clone(), PlayerState::default()))
                .collect(),
            seats,
            boosters,
            booster_number: 0,
            pick_number: 0,
            bots,
            substitutes: HashMap::new(),
            disconnected: HashSet::new(),
            burned_per_round,
            log_recipients,
            log,
            ended: false,
        };

        let mut events = vec![(Target::Session, ServerFrame::signal(EventName::START_DRAFT))];
        events.extend(draft.run_rounds(catalog));
        (draft, events)
    }

    pub fn virtual_count(&self) -> usize {
        self.seats.len()
    }

    /// Booster index for seat `position` in the current round. Direction
    /// alternates per pack: even packs pass one way, odd packs the other.
    fn booster_index_for(&self, position: usize) -> usize {
        let offset: i64 = if self.booster_number % 2 == 0 {
            -(self.pick_number as i64)
        } else {
            self.pick_number as i64
        };
        neg_mod(offset + position as i64, self.virtual_count())
    }

    /// Deal rounds until a human has to act (or the draft ends). With all
    /// humans substituted the loop drains every remaining pack.
    fn run_rounds(&mut self, catalog: &Catalog) -> Vec<(Target, ServerFrame)> {
        let mut events = Vec::new();
        loop {
            events.extend(self.deal_round(catalog));
            if self.ended || self.pending_humans() > 0 {
                return events;
            }
            // Every seat picked without human input; advance immediately.
            if let Some(end_events) = self.advance_state() {
                events.extend(end_events);
                return events;
            }
        }
    }

    /// One rotation round: humans are told their pack, bots pick at once.
    fn deal_round(&mut self, catalog: &Catalog) -> Vec<(Target, ServerFrame)> {
        let mut events = Vec::new();
        for position in 0..self.seats.len() {
            let index = self.booster_index_for(position);
            match self.seats[position].clone() {
                Seat::Human(uid) => {
                    if self.substitutes.contains_key(&uid) {
                        self.substitute_pick(&uid, index, catalog);
                        continue;
                    }
                    let state = self.players.get_mut(&uid).expect("seated player");
                    state.booster_index = Some(index);
                    state.picked_this_round = false;
                    events.push((
                        Target::User(uid),
                        ServerFrame::event(
                            EventName::NEXT_BOOSTER,
                            &NextBoosterPayload {
                                booster: self.boosters[index].clone(),
                                booster_number: self.booster_number,
                                pick_number: self.pick_number,
                            },
                        ),
                    ));
                }
                Seat::Bot(i) => self.bot_pick(i, index, catalog),
            }
        }
        events
    }

    fn bot_pick(&mut self, bot: usize, index: usize, catalog: &Catalog) {
        let booster = &mut self.boosters[index];
        if booster.is_empty() {
            return;
        }
        let snapshot = booster.clone();
        let picked_at = self.bots[bot].pick(booster, catalog);
        let pick = booster.remove(picked_at);
        let burn = self.burn_with_bot(index, BotRef::Pure(bot), catalog);
        let id = self.bots[bot].id.clone();
        self.log.record_pick(
            &id,
            PickEntry {
                pick,
                burn,
                booster: snapshot,
            },
        );
    }

    /// A substitute picks on behalf of a disconnected human; the pick is
    /// credited to the human.
    fn substitute_pick(&mut self, uid: &UserId, index: usize, catalog: &Catalog) {
        let booster = &mut self.boosters[index];
        if booster.is_empty() {
            return;
        }
        let snapshot = booster.clone();
        let sub = self.substitutes.get_mut(uid).expect("substitute exists");
        let picked_at = sub.pick(booster, catalog);
        let pick = booster.remove(picked_at);
        let burn = self.burn_with_bot(index, BotRef::Substitute(uid.clone()), catalog);

        let state = self.players.get_mut(uid).expect("seated player");
        state.picked_cards.push(pick);
        state.picked_this_round = true;
        state.booster_index = Some(index);
        self.log.record_pick(
            uid,
            PickEntry {
                pick,
                burn,
                booster: snapshot,
            },
        );
    }

    fn burn_with_bot(&mut self, index: usize, who: BotRef, catalog: &Catalog) -> Vec<CardId> {
        let mut burned = Vec::new();
        for _ in 0..self.burned_per_round {
            let booster = &mut self.boosters[index];
            if booster.is_empty() {
                break;
            }
            let burn_at = match &who {
                BotRef::Pure(i) => self.bots[*i].burn(booster, catalog),
                BotRef::Substitute(uid) => self
                    .substitutes
                    .get_mut(uid)
                    .expect("substitute exists")
                    .burn(booster, catalog),
            };
            burned.push(self.boosters[index].remove(burn_at));
        }
        burned
    }

    /// Humans who still owe a pick this round. Disconnected players who
    /// have not been replaced keep this non-zero, freezing the draft.
    fn pending_humans(&self) -> usize {
        self.players
            .iter()
            .filter(|(uid, state)| {
                !self.substitutes.contains_key(*uid) && !state.picked_this_round
            })
            .count()
    }

    /// Validate and apply one human pick.
    pub fn pick_card(
        &mut self,
        uid: &UserId,
        card: CardId,
        burned: &[CardId],
        catalog: &Catalog,
    ) -> Result<Vec<(Target, ServerFrame)>, SessionError> {
        if self.ended {
            return Err(SessionError::Validation("draft already ended".to_string()));
        }
        let state = self
            .players
            .get(uid)
            .ok_or_else(|| SessionError::Validation("not seated in this draft".to_string()))?;
        if state.picked_this_round {
            return Err(SessionError::Validation(
                "already picked this round".to_string(),
            ));
        }
        let index = state
            .booster_index
            .filter(|i| *i < self.boosters.len())
            .ok_or_else(|| SessionError::Validation("no booster assigned".to_string()))?;
        let booster = &self.boosters[index];
        if !booster.contains(&card) {
            return Err(SessionError::Validation(
                "selected card is not in your booster".to_string(),
            ));
        }

        // Burn count must be exact: `burnedCardsPerRound`, or everything
        // left once the pack runs thin.
        let expected = (self.burned_per_round as usize).min(booster.len().saturating_sub(1));
        if burned.len() > self.burned_per_round as usize {
            return Err(SessionError::Validation("too many burned cards".to_string()));
        }
        if burned.len() != expected {
            return Err(SessionError::Validation(format!(
                "must burn exactly {expected} card(s)"
            )));
        }
        // Multiset check: pick + burns must all come out of the booster.
        let mut remaining = booster.clone();
        let pick_at = remaining.iter().position(|c| *c == card).expect("checked");
        remaining.remove(pick_at);
        for b in burned {
            let Some(at) = remaining.iter().position(|c| c == b) else {
                return Err(SessionError::Validation(
                    "burned card is not in your booster".to_string(),
                ));
            };
            remaining.remove(at);
        }

        // All validations passed; mutate.
        let snapshot = self.boosters[index].clone();
        self.boosters[index] = remaining;
        let state = self.players.get_mut(uid).expect("checked");
        state.picked_cards.push(card);
        state.picked_this_round = true;
        self.log.record_pick(
            uid,
            PickEntry {
                pick: card,
                burn: burned.to_vec(),
                booster: snapshot,
            },
        );

        let mut events = vec![(
            Target::Session,
            ServerFrame::event(
                EventName::UPDATE_USER,
                &serde_json::json!({
                    "userID": uid,
                    "updatedProperties": { "pickedThisRound": true },
                }),
            ),
        )];
        if self.pending_humans() == 0 {
            match self.advance_state() {
                Some(end_events) => events.extend(end_events),
                None => events.extend(self.run_rounds(catalog)),
            }
        }
        Ok(events)
    }

    /// Move to the next pick; drain the round's packs when empty. Returns
    /// `Some(end events)` when the last pack drained.
    fn advance_state(&mut self) -> Option<Vec<(Target, ServerFrame)>> {
        self.pick_number += 1;
        let v = self.virtual_count();
        if self.boosters[0].is_empty() {
            // All packs of a round drain together.
            self.boosters.drain(0..v);
            self.booster_number += 1;
            self.pick_number = 0;
            if self.boosters.is_empty() {
                return Some(self.end());
            }
        }
        None
    }

    fn end(&mut self) -> Vec<(Target, ServerFrame)> {
        self.ended = true;
        for (uid, state) in &self.players {
            self.log.set_cards(uid, state.picked_cards.clone());
        }
        let bot_cards: Vec<(String, Vec<CardId>)> = self
            .bots
            .iter()
            .map(|b| (b.id.clone(), b.cards.clone()))
            .collect();
        for (id, cards) in bot_cards {
            self.log.set_cards(&id, cards);
        }

        let mut events = Vec::new();
        match self.log_recipients {
            DraftLogRecipients::None => {}
            DraftLogRecipients::Owner => {
                events.push((
                    Target::Owner,
                    ServerFrame::event(EventName::DRAFT_LOG, &self.log),
                ));
            }
            DraftLogRecipients::Everyone => {
                events.push((
                    Target::Session,
                    ServerFrame::event(EventName::DRAFT_LOG, &self.log),
                ));
            }
            DraftLogRecipients::Delayed => {
                events.push((
                    Target::Owner,
                    ServerFrame::event(EventName::DRAFT_LOG, &self.log),
                ));
                for uid in self.players.keys() {
                    events.push((
                        Target::User(uid.clone()),
                        ServerFrame::event(EventName::DRAFT_LOG, &self.log.personalized(uid)),
                    ));
                }
            }
        }
        events.push((Target::Session, ServerFrame::signal(EventName::END_DRAFT)));
        events
    }

    // -- disconnect / reconnect -------------------------------------------

    pub fn mark_disconnected(&mut self, uid: &UserId) {
        if self.players.contains_key(uid) {
            self.disconnected.insert(uid.clone());
        }
    }

    pub fn is_disconnected(&self, uid: &UserId) -> bool {
        self.disconnected.contains(uid)
    }

    pub fn has_disconnected(&self) -> bool {
        !self.disconnected.is_empty()
    }

    /// Reconnect a player: drop any substitute (the human takes back
    /// control) and rebuild their view of the draft.
    pub fn reconnect(&mut self, uid: &UserId) -> Option<Vec<(Target, ServerFrame)>> {
        let state = self.players.get(uid)?;
        self.disconnected.remove(uid);
        self.substitutes.remove(uid);

        let booster = state
            .booster_index
            .filter(|_| !state.picked_this_round)
            .and_then(|i| self.boosters.get(i))
            .cloned();
        Some(vec![(
            Target::User(uid.clone()),
            ServerFrame::event(
                EventName::REJOIN_DRAFT,
                &serde_json::json!({
                    "pickedCards": state.picked_cards,
                    "booster": booster,
                    "boosterNumber": self.booster_number,
                    "pickNumber": self.pick_number,
                    "pickedThisRound": state.picked_this_round,
                }),
            ),
        )])
    }

    /// Current packs for every connected human who still owes a pick.
    /// Used when the draft resumes after a reconnect.
    pub fn resend_boosters(&self) -> Vec<(Target, ServerFrame)> {
        let mut events = Vec::new();
        for (uid, state) in &self.players {
            if self.substitutes.contains_key(uid)
                || self.disconnected.contains(uid)
                || state.picked_this_round
            {
                continue;
            }
            let Some(index) = state.booster_index.filter(|i| *i < self.boosters.len()) else {
                continue;
            };
            events.push((
                Target::User(uid.clone()),
                ServerFrame::event(
                    EventName::NEXT_BOOSTER,
                    &NextBoosterPayload {
                        booster: self.boosters[index].clone(),
                        booster_number: self.booster_number,
                        pick_number: self.pick_number,
                    },
                ),
            ));
        }
        events
    }

    /// Substitute bots for every disconnected player. Each substitute is
    /// fed the human's picks so it inherits their color commitments, then
    /// immediately covers any pick the human owes.
    pub fn replace_disconnected(&mut self, catalog: &Catalog) -> Vec<(Target, ServerFrame)> {
        let waiting: Vec<UserId> = self
            .disconnected
            .iter()
            .filter(|uid| !self.substitutes.contains_key(*uid))
            .cloned()
            .collect();
        for uid in waiting {
            let seat = self
                .seats
                .iter()
                .position(|s| matches!(s, Seat::Human(u) if *u == uid))
                .expect("disconnected player is seated");
            let mut bot = Bot::new(uid.clone(), seat);
            bot.feed(&self.players[&uid].picked_cards, catalog);
            self.substitutes.insert(uid.clone(), bot);

            let state = &self.players[&uid];
            if !state.picked_this_round {
                if let Some(index) = state.booster_index.filter(|i| *i < self.boosters.len()) {
                    self.substitute_pick(&uid, index, catalog);
                }
            }
        }

        if self.ended || self.pending_humans() > 0 {
            Vec::new()
        } else {
            match self.advance_state() {
                Some(end_events) => end_events,
                None => self.run_rounds(catalog),
            }
        }
    }
}

enum BotRef {
    Pure(usize),
    Substitute(UserId),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as StdHashMap;

    use super::*;
    use crate::catalog::{CardFacts, Rarity};

    fn catalog(cards: u32) -> Catalog {
        let map: StdHashMap<CardId, CardFacts> = (1..=cards)
            .map(|id| {
                (
                    id,
                    CardFacts {
                        name: format!("Card {id}"),
                        set: "tst".to_string(),
                        rarity: Rarity::Common,
                        colors: vec![["W", "U", "B", "R", "G"][(id % 5) as usize].to_string()],
                        in_booster: true,
                    },
                )
            })
            .collect();
        Catalog::from_parts(map, vec!["tst".to_string()], StdHashMap::new(), vec![])
    }

    /// `seats` packs per round, `rounds` rounds, `size` cards per pack.
    fn boosters(seats: usize, rounds: usize, size: usize) -> Vec<Booster> {
        let mut next = 1u32;
        let mut out = Vec::new();
        for _ in 0..seats * rounds {
            out.push((0..size).map(|_| {
                let id = next;
                next = next % 60 + 1;
                id
            }).collect());
        }
        out
    }

    fn humans(n: usize) -> Vec<(UserId, String)> {
        (0..n)
            .map(|i| (format!("u{i}"), format!("Player {i}")))
            .collect()
    }

    fn start_two_humans() -> (TraditionalDraft, Vec<(Target, ServerFrame)>, Catalog) {
        let catalog = catalog(60);
        let (draft, events) = TraditionalDraft::start(
            "ABCDEF".to_string(),
            &humans(2),
            0,
            boosters(2, 1, 3),
            vec![],
            0,
            DraftLogRecipients::Everyone,
            &catalog,
        );
        (draft, events, catalog)
    }

    fn frames_named<'a>(
        events: &'a [(Target, ServerFrame)],
        name: &str,
    ) -> Vec<&'a (Target, ServerFrame)> {
        events.iter().filter(|(_, f)| f.t == name).collect()
    }

    #[test]
    fn start_deals_a_booster_to_every_human() {
        let (draft, events, _) = start_two_humans();
        assert_eq!(frames_named(&events, EventName::START_DRAFT).len(), 1);
        assert_eq!(frames_named(&events, EventName::NEXT_BOOSTER).len(), 2);
        assert_eq!(draft.players["u0"].booster_index, Some(0));
        assert_eq!(draft.players["u1"].booster_index, Some(1));
    }

    #[test]
    fn packs_rotate_between_picks() {
        let (mut draft, _, catalog) = start_two_humans();
        let first_u0 = draft.boosters[0][0];
        let first_u1 = draft.boosters[1][0];

        draft.pick_card(&"u0".to_string(), first_u0, &[], &catalog).unwrap();
        let events = draft
            .pick_card(&"u1".to_string(), first_u1, &[], &catalog)
            .unwrap();

        // Round advanced: pick 1, direction reversed on pack 0 (even pack,
        // offset = -pick), so u0 now holds what was pack index 1.
        assert_eq!(draft.pick_number, 1);
        assert_eq!(draft.players["u0"].booster_index, Some(1));
        assert_eq!(draft.players["u1"].booster_index, Some(0));
        assert_eq!(frames_named(&events, EventName::NEXT_BOOSTER).len(), 2);
    }

    #[test]
    fn draft_ends_when_packs_drain() {
        let (mut draft, _, catalog) = start_two_humans();
        let mut end_seen = false;
        // 3 cards per pack, 1 round: 3 picks each.
        for _ in 0..3 {
            for uid in ["u0", "u1"] {
                let uid = uid.to_string();
                if draft.ended {
                    break;
                }
                let index = draft.players[&uid].booster_index.unwrap();
                let card = draft.boosters[index][0];
                let events = draft.pick_card(&uid, card, &[], &catalog).unwrap();
                if !frames_named(&events, EventName::END_DRAFT).is_empty() {
                    end_seen = true;
                }
            }
        }
        assert!(draft.ended);
        assert!(end_seen);
        assert_eq!(draft.players["u0"].picked_cards.len(), 3);
        assert_eq!(draft.players["u1"].picked_cards.len(), 3);
        // Log carries final card lists.
        assert_eq!(draft.log.users["u0"].cards.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn pick_rejects_card_not_in_booster() {
        let (mut draft, _, catalog) = start_two_humans();
        let err = draft
            .pick_card(&"u0".to_string(), 9999, &[], &catalog)
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        // No state change.
        assert!(draft.players["u0"].picked_cards.is_empty());
    }

    #[test]
    fn pick_rejects_double_pick() {
        let (mut draft, _, catalog) = start_two_humans();
        let card = draft.boosters[0][0];
        draft.pick_card(&"u0".to_string(), card, &[], &catalog).unwrap();
        let again = draft.boosters[0].first().copied().unwrap();
        let err = draft
            .pick_card(&"u0".to_string(), again, &[], &catalog)
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[test]
    fn burn_count_must_be_exact() {
        let catalog = catalog(60);
        let (mut draft, _) = TraditionalDraft::start(
            "ABCDEF".to_string(),
            &humans(2),
            0,
            boosters(2, 1, 4),
            vec![],
            1,
            DraftLogRecipients::None,
            &catalog,
        );
        let card = draft.boosters[0][0];

        // Zero burns when one is owed: rejected.
        let err = draft
            .pick_card(&"u0".to_string(), card, &[], &catalog)
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        // Correct burn count: accepted, both cards leave the pack.
        let burn = draft.boosters[0][1];
        draft
            .pick_card(&"u0".to_string(), card, &[burn], &catalog)
            .unwrap();
        assert_eq!(draft.boosters[0].len(), 2);
        let entry = &draft.log.users["u0"].picks[0];
        assert_eq!(entry.pick, card);
        assert_eq!(entry.burn, vec![burn]);
        assert_eq!(entry.booster.len(), 4);
    }

    #[test]
    fn bots_pick_synchronously() {
        let catalog = catalog(60);
        let (draft, events) = TraditionalDraft::start(
            "ABCDEF".to_string(),
            &humans(1),
            3,
            boosters(4, 1, 3),
            vec![],
            0,
            DraftLogRecipients::None,
            &catalog,
        );
        // Only the human gets a nextBooster; the three bot packs already
        // lost one card each.
        assert_eq!(frames_named(&events, EventName::NEXT_BOOSTER).len(), 1);
        let human_index = draft.players["u0"].booster_index.unwrap();
        for (i, pack) in draft.boosters.iter().enumerate() {
            let expected = if i == human_index { 3 } else { 2 };
            assert_eq!(pack.len(), expected, "pack {i}");
        }
    }

    #[test]
    fn replace_disconnected_finishes_the_draft() {
        let catalog = catalog(60);
        let (mut draft, _) = TraditionalDraft::start(
            "ABCDEF".to_string(),
            &humans(2),
            2,
            boosters(4, 1, 3),
            vec![],
            0,
            DraftLogRecipients::None,
            &catalog,
        );

        // u1 vanishes before picking; u0 keeps drafting.
        draft.mark_disconnected(&"u1".to_string());
        let index = draft.players["u0"].booster_index.unwrap();
        let card = draft.boosters[index][0];
        draft.pick_card(&"u0".to_string(), card, &[], &catalog).unwrap();
        // Round frozen on u1.
        assert_eq!(draft.pick_number, 0);

        let events = draft.replace_disconnected(&catalog);
        // Substitute covered u1's owed pick, the round advanced, u0 got a
        // new pack and the substitute already picked from the new round.
        assert_eq!(draft.pick_number, 1);
        assert!(!frames_named(&events, EventName::NEXT_BOOSTER).is_empty());
        assert_eq!(draft.players["u1"].picked_cards.len(), 2);
        assert_eq!(draft.log.users["u1"].picks.len(), 2);

        // Drive u0 to the end; the substitute finishes u1's seat.
        while !draft.ended {
            let index = draft.players["u0"].booster_index.unwrap();
            let card = draft.boosters[index][0];
            draft.pick_card(&"u0".to_string(), card, &[], &catalog).unwrap();
        }
        assert_eq!(draft.players["u1"].picked_cards.len(), 3);
        assert_eq!(draft.log.users["u1"].picks.len(), 3);
    }

    #[test]
    fn reconnect_restores_current_booster() {
        let (mut draft, _, _) = start_two_humans();
        draft.mark_disconnected(&"u1".to_string());

        let events = draft.reconnect(&"u1".to_string()).expect("seated");
        assert_eq!(events.len(), 1);
        let (target, frame) = &events[0];
        assert_eq!(*target, Target::User("u1".to_string()));
        assert_eq!(frame.t, EventName::REJOIN_DRAFT);
        let booster = frame.d.get("booster").unwrap();
        assert!(booster.is_array());
        assert!(!draft.is_disconnected(&"u1".to_string()));
    }

    #[test]
    fn pick_sum_matches_generated_cards() {
        // 2 humans + 2 bots, 2 rounds of 4-card packs: every generated
        // card ends up in exactly one pile.
        let catalog = catalog(60);
        let packs = boosters(4, 2, 4);
        let total: usize = packs.iter().map(|p| p.len()).sum();
        let (mut draft, _) = TraditionalDraft::start(
            "ABCDEF".to_string(),
            &humans(2),
            2,
            packs,
            vec![],
            0,
            DraftLogRecipients::None,
            &catalog,
        );
        while !draft.ended {
            for uid in ["u0", "u1"] {
                let uid = uid.to_string();
                if draft.ended || draft.players[&uid].picked_this_round {
                    continue;
                }
                let index = draft.players[&uid].booster_index.unwrap();
                let card = draft.boosters[index][0];
                draft.pick_card(&uid, card, &[], &catalog).unwrap();
            }
        }
        let human_cards: usize = draft
            .players
            .values()
            .map(|s| s.picked_cards.len())
            .sum();
        let bot_cards: usize = draft.bots.iter().map(|b| b.cards.len()).sum();
        assert_eq!(human_cards + bot_cards, total);
    }
}
