//! The closed set of per-session configuration options.

use std::str::FromStr;

use serde_json::{json, Value};

use crate::booster::{CustomCardList, DistributionMode, MaxDuplicates};
use crate::catalog::Rarity;
use crate::draft::DraftLogRecipients;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Allowed set codes; empty means every set.
    pub set_restriction: Vec<String>,
    pub is_public: bool,
    pub ignore_collections: bool,
    pub boosters_per_player: u32,
    pub bots: u32,
    /// 0 means unlimited.
    pub max_players: u32,
    /// Seconds per pick; 0 disables the pick timer.
    pub max_timer: u32,
    pub max_rarity: Rarity,
    pub color_balance: bool,
    pub max_duplicates: MaxDuplicates,
    pub foil: bool,
    pub use_custom_card_list: bool,
    pub custom_card_list: CustomCardList,
    pub burned_cards_per_round: u32,
    /// Per-round set overrides; `""` falls back to `set_restriction`.
    pub custom_boosters: Vec<String>,
    pub distribution_mode: DistributionMode,
    pub draft_log_recipients: DraftLogRecipients,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            set_restriction: Vec::new(),
            is_public: false,
            ignore_collections: false,
            boosters_per_player: 3,
            bots: 0,
            max_players: 8,
            max_timer: 75,
            max_rarity: Rarity::Mythic,
            color_balance: true,
            max_duplicates: MaxDuplicates::default(),
            foil: false,
            use_custom_card_list: false,
            custom_card_list: CustomCardList::default(),
            burned_cards_per_round: 0,
            custom_boosters: Vec::new(),
            distribution_mode: DistributionMode::Regular,
            draft_log_recipients: DraftLogRecipients::Everyone,
        }
    }
}

impl SessionOptions {
    /// Full snapshot sent to a joining participant.
    pub fn snapshot(&self) -> Value {
        json!({
            "setRestriction": self.set_restriction,
            "isPublic": self.is_public,
            "ignoreCollections": self.ignore_collections,
            "boostersPerPlayer": self.boosters_per_player,
            "bots": self.bots,
            "maxPlayers": self.max_players,
            "maxTimer": self.max_timer,
            "maxRarity": self.max_rarity,
            "colorBalance": self.color_balance,
            "maxDuplicates": self.max_duplicates,
            "foil": self.foil,
            "useCustomCardList": self.use_custom_card_list,
            "customCardListLength": self.custom_card_list.card_count(),
            "burnedCardsPerRound": self.burned_cards_per_round,
            "customBoosters": self.custom_boosters,
            "distributionMode": self.distribution_mode,
            "draftLogRecipients": self.draft_log_recipients,
        })
    }
}

impl FromStr for DistributionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "shufflePlayerBoosters" => Ok(Self::ShufflePlayerBoosters),
            "shuffleBoosterPool" => Ok(Self::ShuffleBoosterPool),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_standard_eight_player_draft() {
        let options = SessionOptions::default();
        assert_eq!(options.boosters_per_player, 3);
        assert_eq!(options.max_players, 8);
        assert_eq!(options.max_rarity, Rarity::Mythic);
        assert!(options.color_balance);
        assert!(!options.is_public);
    }

    #[test]
    fn snapshot_uses_wire_casing() {
        let snapshot = SessionOptions::default().snapshot();
        assert!(snapshot.get("boostersPerPlayer").is_some());
        assert!(snapshot.get("draftLogRecipients").is_some());
        assert_eq!(snapshot["distributionMode"], "regular");
    }

    #[test]
    fn distribution_mode_parses() {
        assert_eq!(
            "shuffleBoosterPool".parse::<DistributionMode>(),
            Ok(DistributionMode::ShuffleBoosterPool)
        );
        assert!("chaotic".parse::<DistributionMode>().is_err());
    }
}
