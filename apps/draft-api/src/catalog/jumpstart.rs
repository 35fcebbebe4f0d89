//! Jumpstart themed packs: pre-built 20-card piles dealt two at a time.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::CardId;

/// One themed pack from the static Jumpstart table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpstartTheme {
    pub name: String,
    pub cards: Vec<CardId>,
}

/// Deal `count` distinct random themes as separate card piles.
///
/// Returns `None` when the table holds fewer than `count` themes.
pub fn deal_themes<R: Rng>(
    themes: &[JumpstartTheme],
    count: usize,
    rng: &mut R,
) -> Option<Vec<Vec<CardId>>> {
    if themes.len() < count {
        return None;
    }
    Some(
        themes
            .choose_multiple(rng, count)
            .map(|t| t.cards.clone())
            .collect(),
    )
}
