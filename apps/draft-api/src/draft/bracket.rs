//! Single-elimination bracket for after the draft. Eight seats, seven
//! match slots; pairings are derived from seat order client-side.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Quarterfinals (4) + semifinals (2) + final (1).
pub const MATCH_SLOTS: usize = 7;
pub const BRACKET_SEATS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    /// Display names in seating order, padded to eight with `None`.
    pub players: Vec<Option<String>>,
    /// Win counts per match slot, `[player_a, player_b]`.
    pub results: Vec<[u32; 2]>,
}

impl Bracket {
    pub fn new(player_names: Vec<String>) -> Self {
        let mut players: Vec<Option<String>> =
            player_names.into_iter().take(BRACKET_SEATS).map(Some).collect();
        players.resize(BRACKET_SEATS, None);
        Self {
            players,
            results: vec![[0, 0]; MATCH_SLOTS],
        }
    }

    pub fn update(&mut self, index: usize, wins: [u32; 2]) -> Result<(), SessionError> {
        if index >= MATCH_SLOTS {
            return Err(SessionError::BadInput(format!(
                "match index {index} out of range"
            )));
        }
        self.results[index] = wins;
        Ok(())
    }
}
