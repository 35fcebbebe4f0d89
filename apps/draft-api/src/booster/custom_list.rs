//! Custom card list parsing.
//!
//! Two shapes, one text format. A flat list of card names is a cube
//! (15-card packs drawn from the whole bag). Sheet headers turn it into a
//! sheet list: each `[Name(count)]` section contributes `count` cards per
//! pack from its own bag.
//!
//! ```text
//! [Creatures(8)]
//! 2 Gray Merchant of Asphodel
//! Baleful Eidolon
//! [Spells(7)]
//! ...
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{CardId, Catalog};

/// Sheet name used internally for the flat cube path.
pub const CUBE_SHEET: &str = "cube";

/// A parsed custom card list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCardList {
    pub name: Option<String>,
    /// Cards each pack draws from each sheet. Empty = cube mode.
    pub cards_per_booster: BTreeMap<String, u32>,
    /// Sheet contents; duplicate entries are duplicate copies.
    pub sheets: BTreeMap<String, Vec<CardId>>,
}

impl CustomCardList {
    /// Build a cube-mode list from a flat bag of card ids.
    pub fn from_flat(cards: Vec<CardId>) -> Self {
        let mut sheets = BTreeMap::new();
        sheets.insert(CUBE_SHEET.to_string(), cards);
        Self {
            name: None,
            cards_per_booster: BTreeMap::new(),
            sheets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.values().all(|cards| cards.is_empty())
    }

    pub fn card_count(&self) -> usize {
        self.sheets.values().map(|cards| cards.len()).sum()
    }
}

/// A parse failure, pointing at the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomListError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CustomListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse the text format against the catalog's name index.
pub fn parse_custom_card_list(
    catalog: &Catalog,
    text: &str,
) -> Result<CustomCardList, CustomListError> {
    let mut list = CustomCardList::default();
    let mut current_sheet: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        if line.starts_with('[') {
            let (name, count) = parse_sheet_header(line).ok_or_else(|| CustomListError {
                line: line_no,
                message: format!("malformed sheet header '{line}'"),
            })?;
            if !list.cards_per_booster.is_empty() && current_sheet.is_none() {
                // Unreachable by construction, kept as a guard.
                return Err(CustomListError {
                    line: line_no,
                    message: "sheet header after flat card lines".to_string(),
                });
            }
            if list.sheets.contains_key(CUBE_SHEET) {
                return Err(CustomListError {
                    line: line_no,
                    message: "sheet header after flat card lines".to_string(),
                });
            }
            list.cards_per_booster.insert(name.clone(), count);
            list.sheets.entry(name.clone()).or_default();
            current_sheet = Some(name);
            continue;
        }

        let (copies, name) = parse_card_line(line);
        let id = catalog.card_by_name(name).ok_or_else(|| CustomListError {
            line: line_no,
            message: format!("unknown card '{name}'"),
        })?;

        let sheet = current_sheet
            .clone()
            .unwrap_or_else(|| CUBE_SHEET.to_string());
        let entry = list.sheets.entry(sheet).or_default();
        entry.extend(std::iter::repeat(id).take(copies as usize));
    }

    if list.is_empty() {
        return Err(CustomListError {
            line: 0,
            message: "list contains no cards".to_string(),
        });
    }
    Ok(list)
}

/// `[Name(12)]` → `("Name", 12)`.
fn parse_sheet_header(line: &str) -> Option<(String, u32)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let open = inner.rfind('(')?;
    let close = inner.rfind(')')?;
    if close != inner.len() - 1 || open >= close {
        return None;
    }
    let name = inner[..open].trim();
    let count: u32 = inner[open + 1..close].trim().parse().ok()?;
    if name.is_empty() || count == 0 {
        return None;
    }
    Some((name.to_string(), count))
}

/// `2 Lightning Bolt` → `(2, "Lightning Bolt")`; bare names count as 1.
fn parse_card_line(line: &str) -> (u32, &str) {
    if let Some((head, tail)) = line.split_once(' ') {
        if let Ok(copies) = head.parse::<u32>() {
            return (copies.max(1), tail.trim());
        }
    }
    (1, line)
}
