//! Immutable card database: card facts, set list, land-slot pools and
//! Jumpstart themes. Loaded once at startup, read-only after.

pub mod jumpstart;
pub mod land_slot;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use jumpstart::JumpstartTheme;
pub use land_slot::LandSlot;

/// Numeric catalog id of a card. This is also what travels on the wire:
/// a client's `selectedCard` integer *is* the card id.
pub type CardId = u32;

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Card rarity. Variant order matters: `Ord` is used for the `maxRarity`
/// session option (`common < uncommon < rare < mythic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Mythic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Mythic => "mythic",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "mythic" => Ok(Self::Mythic),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Color identity
// ---------------------------------------------------------------------------

/// A card's color identity, collapsed to a single bucket the way the
/// booster generator partitions commons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorIdentity {
    W,
    U,
    B,
    R,
    G,
    Multi,
    Colorless,
}

impl ColorIdentity {
    /// Collapse a color list (`["W"]`, `["U","B"]`, `[]`) into an identity.
    pub fn from_colors(colors: &[String]) -> Self {
        match colors {
            [] => Self::Colorless,
            [c] => match c.as_str() {
                "W" => Self::W,
                "U" => Self::U,
                "B" => Self::B,
                "R" => Self::R,
                "G" => Self::G,
                _ => Self::Colorless,
            },
            _ => Self::Multi,
        }
    }

    /// Index into a `[_; 5]` WUBRG table, `None` for multi/colorless.
    pub fn wubrg_index(&self) -> Option<usize> {
        match self {
            Self::W => Some(0),
            Self::U => Some(1),
            Self::B => Some(2),
            Self::R => Some(3),
            Self::G => Some(4),
            Self::Multi | Self::Colorless => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Card facts & catalog
// ---------------------------------------------------------------------------

/// Everything the server knows about one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardFacts {
    pub name: String,
    pub set: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub colors: Vec<String>,
    /// Whether the card can appear in generated boosters.
    #[serde(default = "default_true")]
    pub in_booster: bool,
}

fn default_true() -> bool {
    true
}

impl CardFacts {
    pub fn color_identity(&self) -> ColorIdentity {
        ColorIdentity::from_colors(&self.colors)
    }
}

/// On-disk shape of the card database file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    cards: HashMap<CardId, CardFacts>,
    #[serde(default)]
    sets: Vec<String>,
    #[serde(default)]
    land_slots: HashMap<String, Vec<CardId>>,
    #[serde(default)]
    jumpstart: Vec<JumpstartTheme>,
}

/// The immutable card catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    pub cards: HashMap<CardId, CardFacts>,
    /// Ordered set list, as the file declares it.
    pub set_list: Vec<String>,
    /// Sets with a dedicated land slot, and the card ids that fill it.
    pub land_slots: HashMap<String, Vec<CardId>>,
    pub jumpstart_themes: Vec<JumpstartTheme>,
    /// Name → id index for resolving custom card lists.
    by_name: HashMap<String, CardId>,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read card database: {e}"),
            Self::Parse(e) => write!(f, "failed to parse card database: {e}"),
        }
    }
}

impl Catalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(CatalogError::Io)?;
        let file: CatalogFile = serde_json::from_str(&raw).map_err(CatalogError::Parse)?;
        Ok(Self::from_parts(file.cards, file.sets, file.land_slots, file.jumpstart))
    }

    /// Build a catalog from already-parsed parts. Test harnesses use this
    /// to avoid touching the filesystem.
    pub fn from_parts(
        cards: HashMap<CardId, CardFacts>,
        set_list: Vec<String>,
        land_slots: HashMap<String, Vec<CardId>>,
        jumpstart_themes: Vec<JumpstartTheme>,
    ) -> Self {
        let by_name = cards
            .iter()
            .map(|(id, facts)| (facts.name.to_lowercase(), *id))
            .collect();
        Self {
            cards,
            set_list,
            land_slots,
            jumpstart_themes,
            by_name,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&CardFacts> {
        self.cards.get(&id)
    }

    /// Case-insensitive lookup by card name.
    pub fn card_by_name(&self, name: &str) -> Option<CardId> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    /// Ids of every card allowed to appear in generated boosters.
    pub fn booster_cards(&self) -> impl Iterator<Item = (CardId, &CardFacts)> + '_ {
        self.cards
            .iter()
            .filter(|(_, facts)| facts.in_booster)
            .map(|(id, facts)| (*id, facts))
    }
}
