//! Bot drafters.
//!
//! A bot's policy is deterministic per instance: its RNG is seeded from
//! its identity and seat index, so replaying the same draft with the same
//! seats reproduces the same picks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::{CardId, Catalog, ColorIdentity};

/// Rarity weight dominates early scoring; color affinity takes over once
/// the bot commits.
const RARITY_WEIGHT: [u32; 4] = [10, 30, 60, 80];
/// Affinity contribution cap, so a long mono-color run cannot outscore a
/// bomb rare forever.
const AFFINITY_CAP: u32 = 25;
/// Flat bonus for colorless cards: playable in any deck.
const COLORLESS_BONUS: u32 = 4;

#[derive(Debug, Clone)]
pub struct Bot {
    pub id: String,
    pub name: String,
    pub seat: usize,
    pub cards: Vec<CardId>,
    color_affinity: [u32; 5],
    rng: StdRng,
}

impl Bot {
    pub fn new(id: impl Into<String>, seat: usize) -> Self {
        let id = id.into();
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        seat.hash(&mut hasher);
        Self {
            name: format!("Bot #{}", seat + 1),
            rng: StdRng::seed_from_u64(hasher.finish()),
            id,
            seat,
            cards: Vec::new(),
            color_affinity: [0; 5],
        }
    }

    /// Replay a human's prior picks into this bot so a substitute
    /// approximates the player's color commitments.
    pub fn feed(&mut self, picks: &[CardId], catalog: &Catalog) {
        for &card in picks {
            self.record(card, catalog);
        }
    }

    /// Choose a card to keep. Records the pick.
    pub fn pick(&mut self, booster: &[CardId], catalog: &Catalog) -> usize {
        debug_assert!(!booster.is_empty());
        let index = self.best_index(booster, catalog);
        self.record(booster[index], catalog);
        index
    }

    /// Choose a card to throw away: the one the bot wants least. Records
    /// nothing.
    pub fn burn(&mut self, booster: &[CardId], catalog: &Catalog) -> usize {
        debug_assert!(!booster.is_empty());
        let mut worst = 0;
        let mut worst_score = u32::MAX;
        for (i, &card) in booster.iter().enumerate() {
            let score = self.score(card, catalog) + self.jitter();
            if score < worst_score {
                worst_score = score;
                worst = i;
            }
        }
        worst
    }

    fn best_index(&mut self, booster: &[CardId], catalog: &Catalog) -> usize {
        let mut best = 0;
        let mut best_score = 0;
        for (i, &card) in booster.iter().enumerate() {
            let score = self.score(card, catalog) + self.jitter();
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        best
    }

    fn score(&self, card: CardId, catalog: &Catalog) -> u32 {
        let Some(facts) = catalog.card(card) else {
            return 0;
        };
        let rarity = RARITY_WEIGHT[facts.rarity as usize];
        let affinity = match facts.color_identity() {
            ColorIdentity::Colorless => COLORLESS_BONUS,
            ColorIdentity::Multi => {
                // Multicolor needs both colors; be conservative.
                *self.color_affinity.iter().min().unwrap_or(&0)
            }
            identity => match identity.wubrg_index() {
                Some(i) => self.color_affinity[i].min(AFFINITY_CAP),
                None => 0,
            },
        };
        rarity + affinity
    }

    fn record(&mut self, card: CardId, catalog: &Catalog) {
        self.cards.push(card);
        if let Some(facts) = catalog.card(card) {
            if let Some(i) = facts.color_identity().wubrg_index() {
                self.color_affinity[i] += 3;
            }
        }
    }

    fn jitter(&mut self) -> u32 {
        self.rng.gen_range(0..3)
    }
}
