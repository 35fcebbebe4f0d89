//! Booster pack generation.
//!
//! Everything here is pure over its inputs: the catalog, an optional
//! effective collection, the generation options, and a caller-supplied
//! RNG. Tests seed the RNG; production passes one seeded from entropy.

pub mod custom_list;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{CardId, Catalog, LandSlot, Rarity};

pub use custom_list::{parse_custom_card_list, CustomCardList, CustomListError};

/// One booster pack, in hand-to-player order.
pub type Booster = Vec<CardId>;

/// A bag of cards: id → remaining copies. `BTreeMap` keeps draws
/// deterministic for a given seed.
pub type CardPool = BTreeMap<CardId, u32>;

/// Probability that a pack contains a foil when the option is on.
const FOIL_RATE: f64 = 15.0 / 63.0;
/// Probability that a rare slot is promoted to mythic.
const MYTHIC_PROMOTION_RATE: f64 = 1.0 / 8.0;
/// Cards per pack on the custom-cube path.
const CUBE_PACK_SIZE: u32 = 15;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-rarity duplicate limits applied when no collection constrains the
/// pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", default)]
pub struct MaxDuplicates {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub mythic: u32,
}

impl Default for MaxDuplicates {
    fn default() -> Self {
        Self {
            common: 8,
            uncommon: 4,
            rare: 2,
            mythic: 1,
        }
    }
}

impl MaxDuplicates {
    pub fn get(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Mythic => self.mythic,
        }
    }
}

/// How generated packs are distributed to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistributionMode {
    Regular,
    ShufflePlayerBoosters,
    ShuffleBoosterPool,
}

/// Options for one generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Allowed set codes; empty means every set.
    pub set_restriction: Vec<String>,
    pub max_rarity: Rarity,
    pub color_balance: bool,
    pub max_duplicates: MaxDuplicates,
    pub foil: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            set_restriction: Vec::new(),
            max_rarity: Rarity::Mythic,
            color_balance: true,
            max_duplicates: MaxDuplicates::default(),
            foil: false,
        }
    }
}

/// A full draft's worth of packs: per-round set overrides plus the
/// distribution mode.
#[derive(Debug, Clone)]
pub struct PackPlan<'a> {
    pub boosters_per_player: usize,
    /// Per-round set code overrides; `""` falls back to `set_restriction`.
    pub custom_boosters: &'a [String],
    pub distribution_mode: DistributionMode,
    pub options: GenerateOptions,
    pub custom_card_list: Option<&'a CustomCardList>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Generation failure. `Shortage` is the only retryable kind: the caller
/// reports it to the session owner and the draft does not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoosterError {
    Shortage {
        what: String,
        needed: u32,
        available: u32,
    },
    EmptyCustomList,
}

impl fmt::Display for BoosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortage {
                what,
                needed,
                available,
            } => write!(
                f,
                "not enough {what} cards: need {needed}, have {available}"
            ),
            Self::EmptyCustomList => write!(f, "custom card list is empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rarity targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Targets {
    rare: u32,
    uncommon: u32,
    common: u32,
}

impl Targets {
    fn for_max_rarity(max_rarity: Rarity) -> Self {
        match max_rarity {
            Rarity::Mythic | Rarity::Rare => Self {
                rare: 1,
                uncommon: 3,
                common: 10,
            },
            Rarity::Uncommon => Self {
                rare: 0,
                uncommon: 3,
                common: 11,
            },
            Rarity::Common => Self {
                rare: 0,
                uncommon: 0,
                common: 14,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Effective collection
// ---------------------------------------------------------------------------

/// Intersection of participant collections: for each card owned by every
/// participant, the minimum owned count.
pub fn collection_intersection<'a, I>(collections: I) -> CardPool
where
    I: IntoIterator<Item = &'a HashMap<CardId, u32>>,
{
    let mut iter = collections.into_iter();
    let Some(first) = iter.next() else {
        return CardPool::new();
    };
    let mut result: CardPool = first.iter().map(|(id, n)| (*id, *n)).collect();
    for collection in iter {
        result.retain(|id, count| match collection.get(id) {
            Some(n) => {
                *count = (*count).min(*n);
                true
            }
            None => false,
        });
    }
    result
}

/// Build the consumable bag a generation call draws from.
///
/// With a collection, only its `in_booster` cards enter. Without one,
/// every `in_booster` card enters at its duplicate limit.
fn build_bag(
    catalog: &Catalog,
    collection: Option<&CardPool>,
    max_duplicates: &MaxDuplicates,
) -> CardPool {
    match collection {
        Some(col) => col
            .iter()
            .filter(|(id, count)| {
                **count > 0 && catalog.card(**id).map(|f| f.in_booster).unwrap_or(false)
            })
            .map(|(id, count)| (*id, *count))
            .collect(),
        None => catalog
            .booster_cards()
            .map(|(id, facts)| (id, max_duplicates.get(facts.rarity)))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Consumes a shared bag across every pack of one generation call.
struct Generator<'a> {
    catalog: &'a Catalog,
    bag: CardPool,
}

impl<'a> Generator<'a> {
    fn new(catalog: &'a Catalog, collection: Option<&CardPool>, max_dup: &MaxDuplicates) -> Self {
        Self {
            catalog,
            bag: build_bag(catalog, collection, max_dup),
        }
    }

    fn in_restriction(&self, id: CardId, restriction: &[String]) -> bool {
        restriction.is_empty()
            || self
                .catalog
                .card(id)
                .map(|f| restriction.iter().any(|s| *s == f.set))
                .unwrap_or(false)
    }

    fn available(&self, rarity: Rarity, restriction: &[String]) -> u32 {
        self.bag
            .iter()
            .filter(|(id, _)| {
                self.catalog.card(**id).map(|f| f.rarity) == Some(rarity)
                    && self.in_restriction(**id, restriction)
            })
            .map(|(_, n)| *n)
            .sum()
    }

    /// Weighted draw (by remaining copies) of a card matching `pred`,
    /// excluding ids already drawn into the current pack.
    fn draw<R: Rng, F: Fn(CardId) -> bool>(
        &mut self,
        rng: &mut R,
        exclude: &BTreeSet<CardId>,
        pred: F,
    ) -> Option<CardId> {
        let total: u32 = self
            .bag
            .iter()
            .filter(|(id, _)| !exclude.contains(id) && pred(**id))
            .map(|(_, n)| *n)
            .sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..total);
        let mut chosen = None;
        for (id, count) in self
            .bag
            .iter()
            .filter(|(id, _)| !exclude.contains(id) && pred(**id))
        {
            if roll < *count {
                chosen = Some(*id);
                break;
            }
            roll -= *count;
        }
        let id = chosen?;
        self.take(id);
        Some(id)
    }

    fn take(&mut self, id: CardId) {
        if let Some(count) = self.bag.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.bag.remove(&id);
            }
        }
    }

    fn draw_rarity<R: Rng>(
        &mut self,
        rng: &mut R,
        exclude: &BTreeSet<CardId>,
        rarity: Rarity,
        restriction: &[String],
    ) -> Option<CardId> {
        let catalog = self.catalog;
        let restr: Vec<String> = restriction.to_vec();
        self.draw(rng, exclude, move |id| {
            catalog.card(id).map(|f| f.rarity) == Some(rarity)
                && (restr.is_empty()
                    || catalog
                        .card(id)
                        .map(|f| restr.iter().any(|s| *s == f.set))
                        .unwrap_or(false))
        })
    }

    /// Draw the common block for one pack: with color balance, first up to
    /// one common of each WUBRG color, then fill, then shuffle the block so
    /// slot position leaks no signal.
    fn draw_commons<R: Rng>(
        &mut self,
        rng: &mut R,
        exclude: &mut BTreeSet<CardId>,
        count: u32,
        color_balance: bool,
        restriction: &[String],
    ) -> Vec<CardId> {
        let mut block = Vec::new();

        if color_balance {
            for color_index in 0..5usize {
                if block.len() as u32 >= count {
                    break;
                }
                let catalog = self.catalog;
                let restr: Vec<String> = restriction.to_vec();
                let drawn = self.draw(rng, exclude, move |id| {
                    let Some(facts) = catalog.card(id) else {
                        return false;
                    };
                    facts.rarity == Rarity::Common
                        && facts.color_identity().wubrg_index() == Some(color_index)
                        && (restr.is_empty() || restr.iter().any(|s| *s == facts.set))
                });
                if let Some(id) = drawn {
                    exclude.insert(id);
                    block.push(id);
                }
            }
        }

        while (block.len() as u32) < count {
            match self.draw_rarity(rng, exclude, Rarity::Common, restriction) {
                Some(id) => {
                    exclude.insert(id);
                    block.push(id);
                }
                None => break,
            }
        }

        block.shuffle(rng);
        block
    }

    /// Generate `quantity` standard packs under one set restriction.
    fn standard_packs<R: Rng>(
        &mut self,
        rng: &mut R,
        options: &GenerateOptions,
        restriction: &[String],
        quantity: usize,
    ) -> Result<Vec<Booster>, BoosterError> {
        let targets = Targets::for_max_rarity(options.max_rarity);

        // Supply check before anything is consumed.
        for (rarity, per_pack) in [
            (Rarity::Common, targets.common),
            (Rarity::Uncommon, targets.uncommon),
            (Rarity::Rare, targets.rare),
        ] {
            let needed = per_pack * quantity as u32;
            let available = self.available(rarity, restriction);
            if available < needed {
                return Err(BoosterError::Shortage {
                    what: rarity.to_string(),
                    needed,
                    available,
                });
            }
        }

        // Land slot only applies to a single-set restriction.
        let land_slot = match restriction {
            [set] => {
                let mut commons: CardPool = self
                    .bag
                    .iter()
                    .filter(|(id, _)| {
                        self.catalog.card(**id).map(|f| f.rarity) == Some(Rarity::Common)
                    })
                    .map(|(id, n)| (*id, *n))
                    .collect();
                let slot = LandSlot::setup(set, self.catalog, &mut commons);
                if slot.is_some() {
                    // Cards the slot consumed must leave the shared bag too.
                    let catalog = self.catalog;
                    self.bag.retain(|id, _| {
                        commons.contains_key(id)
                            || catalog.card(*id).map(|f| f.rarity) != Some(Rarity::Common)
                    });
                }
                slot
            }
            _ => None,
        };

        let mut packs = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let mut exclude = BTreeSet::new();
            let mut pack = Vec::new();
            let mut foils_added = 0u32;

            if options.foil && rng.gen_bool(FOIL_RATE) {
                let roll: f64 = rng.gen();
                let rarity = if roll < 1.0 / 128.0 {
                    Rarity::Mythic
                } else if roll < 8.0 / 128.0 {
                    Rarity::Rare
                } else if roll < 4.0 / 16.0 {
                    Rarity::Uncommon
                } else {
                    Rarity::Common
                };
                if let Some(id) = self.draw_rarity(rng, &exclude, rarity, restriction) {
                    exclude.insert(id);
                    pack.push(id);
                    foils_added = 1;
                }
            }

            for _ in 0..targets.rare {
                let promote = options.max_rarity == Rarity::Mythic
                    && self.available(Rarity::Mythic, restriction) > 0
                    && rng.gen_bool(MYTHIC_PROMOTION_RATE);
                let rarity = if promote { Rarity::Mythic } else { Rarity::Rare };
                if let Some(id) = self.draw_rarity(rng, &exclude, rarity, restriction) {
                    exclude.insert(id);
                    pack.push(id);
                }
            }

            for _ in 0..targets.uncommon {
                if let Some(id) = self.draw_rarity(rng, &exclude, Rarity::Uncommon, restriction) {
                    exclude.insert(id);
                    pack.push(id);
                }
            }

            let common_count = targets.common.saturating_sub(foils_added);
            let block = self.draw_commons(
                rng,
                &mut exclude,
                common_count,
                options.color_balance,
                restriction,
            );
            pack.extend(block);

            if let Some(slot) = &land_slot {
                pack.push(slot.pick(rng));
            }

            packs.push(pack);
        }
        Ok(packs)
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Generate `quantity` packs from the standard (non-custom) path.
pub fn generate<R: Rng>(
    catalog: &Catalog,
    collection: Option<&CardPool>,
    options: &GenerateOptions,
    quantity: usize,
    rng: &mut R,
) -> Result<Vec<Booster>, BoosterError> {
    let mut generator = Generator::new(catalog, collection, &options.max_duplicates);
    generator.standard_packs(rng, options, &options.set_restriction, quantity)
}

/// Generate `quantity` packs from a custom card list (sheet or cube path).
pub fn generate_from_custom_list<R: Rng>(
    catalog: &Catalog,
    list: &CustomCardList,
    color_balance: bool,
    quantity: usize,
    rng: &mut R,
) -> Result<Vec<Booster>, BoosterError> {
    if list.is_empty() {
        return Err(BoosterError::EmptyCustomList);
    }

    // Sheets are consumable bags for the whole call.
    let mut sheet_bags: BTreeMap<&str, CardPool> = BTreeMap::new();
    for (name, cards) in &list.sheets {
        let mut bag = CardPool::new();
        for &id in cards {
            *bag.entry(id).or_insert(0) += 1;
        }
        sheet_bags.insert(name.as_str(), bag);
    }

    // Per-sheet counts; the cube path is a single 15-wide sheet.
    let per_booster: Vec<(&str, u32)> = if list.cards_per_booster.is_empty() {
        vec![(custom_list::CUBE_SHEET, CUBE_PACK_SIZE)]
    } else {
        list.cards_per_booster
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect()
    };

    // Supply check per sheet.
    for (name, count) in &per_booster {
        let available: u32 = sheet_bags
            .get(name)
            .map(|bag| bag.values().sum())
            .unwrap_or(0);
        let needed = count * quantity as u32;
        if available < needed {
            return Err(BoosterError::Shortage {
                what: format!("'{name}' sheet"),
                needed,
                available,
            });
        }
    }

    // Color balance applies to the widest sheet when it spans >= 5 cards.
    let balanced_sheet = per_booster
        .iter()
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count >= 5)
        .map(|(name, _)| *name);

    let mut packs = Vec::with_capacity(quantity);
    for _ in 0..quantity {
        let mut pack = Vec::new();
        for (name, count) in &per_booster {
            let bag = sheet_bags.get_mut(name).expect("checked above");
            let balance = color_balance && balanced_sheet == Some(*name);
            let mut block = draw_from_sheet(catalog, bag, *count, balance, rng);
            block.shuffle(rng);
            pack.extend(block);
        }
        packs.push(pack);
    }
    Ok(packs)
}

/// Draw `count` cards from one sheet bag, optionally color balanced.
fn draw_from_sheet<R: Rng>(
    catalog: &Catalog,
    bag: &mut CardPool,
    count: u32,
    color_balance: bool,
    rng: &mut R,
) -> Vec<CardId> {
    let mut exclude = BTreeSet::new();
    let mut block = Vec::new();

    let draw = |bag: &mut CardPool,
                    exclude: &BTreeSet<CardId>,
                    rng: &mut R,
                    pred: &dyn Fn(CardId) -> bool|
     -> Option<CardId> {
        let total: u32 = bag
            .iter()
            .filter(|(id, _)| !exclude.contains(id) && pred(**id))
            .map(|(_, n)| *n)
            .sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..total);
        let mut chosen = None;
        for (id, n) in bag.iter().filter(|(id, _)| !exclude.contains(id) && pred(**id)) {
            if roll < *n {
                chosen = Some(*id);
                break;
            }
            roll -= *n;
        }
        let id = chosen?;
        let n = bag.get_mut(&id).expect("just found");
        *n -= 1;
        if *n == 0 {
            bag.remove(&id);
        }
        Some(id)
    };

    if color_balance {
        for color_index in 0..5usize {
            if block.len() as u32 >= count {
                break;
            }
            let pred = |id: CardId| {
                catalog
                    .card(id)
                    .map(|f| f.color_identity().wubrg_index() == Some(color_index))
                    .unwrap_or(false)
            };
            if let Some(id) = draw(bag, &exclude, rng, &pred) {
                exclude.insert(id);
                block.push(id);
            }
        }
    }

    while (block.len() as u32) < count {
        match draw(bag, &exclude, rng, &|_| true) {
            Some(id) => {
                exclude.insert(id);
                block.push(id);
            }
            None => break,
        }
    }
    block
}

/// Generate every pack for a traditional draft: one round per
/// `boosters_per_player`, per-round set overrides, then the distribution
/// mode's shuffle. The result is round-major: round `r`'s packs occupy
/// `[r * players, (r + 1) * players)`.
pub fn generate_draft_packs<R: Rng>(
    catalog: &Catalog,
    collection: Option<&CardPool>,
    plan: &PackPlan<'_>,
    players: usize,
    rng: &mut R,
) -> Result<Vec<Booster>, BoosterError> {
    let rounds = plan.boosters_per_player;
    let quantity = rounds * players;

    if let Some(list) = plan.custom_card_list {
        return generate_from_custom_list(catalog, list, plan.options.color_balance, quantity, rng);
    }

    // One shared bag across all rounds so duplicate limits hold for the
    // whole draft, not per round.
    let mut generator = Generator::new(catalog, collection, &plan.options.max_duplicates);

    // stacks[player][round]
    let mut stacks: Vec<Vec<Booster>> = vec![Vec::with_capacity(rounds); players];
    for round in 0..rounds {
        let override_set = plan.custom_boosters.get(round).filter(|s| !s.is_empty());
        let restriction: Vec<String> = match override_set {
            Some(set) => vec![set.clone()],
            None => plan.options.set_restriction.clone(),
        };
        let round_packs = generator.standard_packs(rng, &plan.options, &restriction, players)?;
        for (player, pack) in round_packs.into_iter().enumerate() {
            stacks[player].push(pack);
        }
    }

    match plan.distribution_mode {
        DistributionMode::Regular => {}
        DistributionMode::ShufflePlayerBoosters => {
            for stack in &mut stacks {
                stack.shuffle(rng);
            }
        }
        DistributionMode::ShuffleBoosterPool => {
            let mut pool: Vec<Booster> = stacks.into_iter().flatten().collect();
            pool.shuffle(rng);
            stacks = vec![Vec::with_capacity(rounds); players];
            for (i, pack) in pool.into_iter().enumerate() {
                stacks[i % players].push(pack);
            }
        }
    }

    let mut boosters = Vec::with_capacity(quantity);
    for round in 0..rounds {
        for stack in &stacks {
            boosters.push(stack[round].clone());
        }
    }
    Ok(boosters)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::catalog::CardFacts;

    const WUBRG: [&str; 5] = ["W", "U", "B", "R", "G"];

    /// Catalog shaped like a real small set: colors cycle through WUBRG.
    fn catalog_with(set: &str, commons: u32, uncommons: u32, rares: u32, mythics: u32) -> Catalog {
        let mut cards = HashMap::new();
        let mut next_id = 1u32;
        let mut add = |count: u32, rarity: Rarity, cards: &mut HashMap<CardId, CardFacts>| {
            for i in 0..count {
                cards.insert(
                    next_id,
                    CardFacts {
                        name: format!("{rarity} {next_id}"),
                        set: set.to_string(),
                        rarity,
                        colors: vec![WUBRG[(i % 5) as usize].to_string()],
                        in_booster: true,
                    },
                );
                next_id += 1;
            }
        };
        add(commons, Rarity::Common, &mut cards);
        add(uncommons, Rarity::Uncommon, &mut cards);
        add(rares, Rarity::Rare, &mut cards);
        add(mythics, Rarity::Mythic, &mut cards);
        Catalog::from_parts(cards, vec![set.to_string()], HashMap::new(), vec![])
    }

    /// THB-shaped pool from the reference scenario.
    fn thb() -> Catalog {
        catalog_with("thb", 101, 80, 53, 15)
    }

    fn rarity_counts(catalog: &Catalog, pack: &Booster) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for id in pack {
            match catalog.card(*id).unwrap().rarity {
                Rarity::Common => counts.0 += 1,
                Rarity::Uncommon => counts.1 += 1,
                Rarity::Rare => counts.2 += 1,
                Rarity::Mythic => counts.3 += 1,
            }
        }
        counts
    }

    #[test]
    fn packs_hit_rarity_targets() {
        let catalog = thb();
        let options = GenerateOptions::default();
        let mut rng = StdRng::seed_from_u64(100);
        let packs = generate(&catalog, None, &options, 6, &mut rng).expect("enough cards");

        assert_eq!(packs.len(), 6);
        for pack in &packs {
            assert_eq!(pack.len(), 14);
            let (commons, uncommons, rares, mythics) = rarity_counts(&catalog, pack);
            assert_eq!(commons, 10);
            assert_eq!(uncommons, 3);
            assert_eq!(rares + mythics, 1);
        }
    }

    #[test]
    fn color_balanced_commons_cover_wubrg() {
        let catalog = thb();
        let options = GenerateOptions {
            max_rarity: Rarity::Rare,
            ..GenerateOptions::default()
        };

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let packs = generate(&catalog, None, &options, 2, &mut rng).expect("enough cards");
            for pack in &packs {
                assert!(pack.len() >= 14);
                let mut seen = [false; 5];
                for id in pack {
                    let facts = catalog.card(*id).unwrap();
                    if facts.rarity == Rarity::Common {
                        if let Some(i) = facts.color_identity().wubrg_index() {
                            seen[i] = true;
                        }
                    }
                }
                assert!(seen.iter().all(|s| *s), "seed {seed}: missing a color");
            }
        }
    }

    #[test]
    fn set_restriction_is_respected() {
        // Two sets in one catalog; restrict to one of them.
        let mut cards = HashMap::new();
        let mut next_id = 1u32;
        for set in ["aaa", "bbb"] {
            for i in 0..40u32 {
                let rarity = match i % 14 {
                    0 => Rarity::Rare,
                    1..=3 => Rarity::Uncommon,
                    _ => Rarity::Common,
                };
                cards.insert(
                    next_id,
                    CardFacts {
                        name: format!("{set} {next_id}"),
                        set: set.to_string(),
                        rarity,
                        colors: vec![WUBRG[(i % 5) as usize].to_string()],
                        in_booster: true,
                    },
                );
                next_id += 1;
            }
        }
        let catalog = Catalog::from_parts(
            cards,
            vec!["aaa".to_string(), "bbb".to_string()],
            HashMap::new(),
            vec![],
        );

        let options = GenerateOptions {
            set_restriction: vec!["aaa".to_string()],
            color_balance: false,
            ..GenerateOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let packs = generate(&catalog, None, &options, 2, &mut rng).expect("enough cards");
        for pack in &packs {
            for id in pack {
                assert_eq!(catalog.card(*id).unwrap().set, "aaa");
            }
        }
    }

    #[test]
    fn generation_is_reproducible_per_seed() {
        let catalog = thb();
        let options = GenerateOptions {
            foil: true,
            ..GenerateOptions::default()
        };

        let a = generate(&catalog, None, &options, 8, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(&catalog, None, &options, 8, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);

        let c = generate(&catalog, None, &options, 8, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn foil_keeps_pack_size_constant() {
        let catalog = thb();
        let options = GenerateOptions {
            foil: true,
            ..GenerateOptions::default()
        };
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let packs = generate(&catalog, None, &options, 4, &mut rng).unwrap();
            for pack in &packs {
                assert_eq!(pack.len(), 14, "seed {seed}");
            }
        }
    }

    #[test]
    fn shortage_is_reported_not_generated() {
        // One common at 8 duplicate copies: 8 available, 20 needed.
        let catalog = catalog_with("tin", 1, 80, 53, 15);
        let options = GenerateOptions::default();
        let mut rng = StdRng::seed_from_u64(1);

        let err = generate(&catalog, None, &options, 2, &mut rng).unwrap_err();
        match err {
            BoosterError::Shortage {
                what,
                needed,
                available,
            } => {
                assert_eq!(what, "common");
                assert_eq!(needed, 20);
                assert_eq!(available, 8);
            }
            other => panic!("expected shortage, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_limits_bound_the_bag() {
        // One single common card: maxDuplicates.common copies total.
        let catalog = catalog_with("uno", 1, 80, 53, 15);
        let options = GenerateOptions {
            color_balance: false,
            max_rarity: Rarity::Mythic,
            ..GenerateOptions::default()
        };
        // 10 commons per pack, 8 copies available: even one pack is short.
        let mut rng = StdRng::seed_from_u64(2);
        assert!(matches!(
            generate(&catalog, None, &options, 1, &mut rng),
            Err(BoosterError::Shortage { .. })
        ));
    }

    #[test]
    fn collection_intersection_takes_minimum_counts() {
        let a: HashMap<CardId, u32> = [(1, 4), (2, 2), (3, 1)].into_iter().collect();
        let b: HashMap<CardId, u32> = [(1, 3), (2, 4)].into_iter().collect();

        let shared = collection_intersection([&a, &b]);
        assert_eq!(shared.get(&1), Some(&3));
        assert_eq!(shared.get(&2), Some(&2));
        assert!(!shared.contains_key(&3));
    }

    #[test]
    fn collection_bounds_generation() {
        let catalog = thb();
        // A collection with exactly 10 commons, 3 uncommons, 1 rare: one
        // pack works, two packs are short.
        let mut collection = CardPool::new();
        let mut commons = 0;
        let mut uncommons = 0;
        let mut rares = 0;
        for (id, facts) in catalog.booster_cards() {
            match facts.rarity {
                Rarity::Common if commons < 10 => {
                    collection.insert(id, 1);
                    commons += 1;
                }
                Rarity::Uncommon if uncommons < 3 => {
                    collection.insert(id, 1);
                    uncommons += 1;
                }
                Rarity::Rare if rares < 1 => {
                    collection.insert(id, 1);
                    rares += 1;
                }
                _ => {}
            }
        }
        let options = GenerateOptions {
            color_balance: false,
            ..GenerateOptions::default()
        };

        let one = generate(&catalog, Some(&collection), &options, 1, &mut StdRng::seed_from_u64(3));
        assert!(one.is_ok());
        let two = generate(&catalog, Some(&collection), &options, 2, &mut StdRng::seed_from_u64(3));
        assert!(matches!(two, Err(BoosterError::Shortage { .. })));
    }

    #[test]
    fn land_slot_appends_a_land() {
        let mut catalog = thb();
        // Declare the first two commons as the thb land slot.
        let slot_ids: Vec<CardId> = catalog
            .booster_cards()
            .filter(|(_, f)| f.rarity == Rarity::Common)
            .map(|(id, _)| id)
            .take(2)
            .collect();
        catalog.land_slots.insert("thb".to_string(), slot_ids.clone());

        let options = GenerateOptions {
            set_restriction: vec!["thb".to_string()],
            ..GenerateOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let packs = generate(&catalog, None, &options, 3, &mut rng).unwrap();
        for pack in &packs {
            assert_eq!(pack.len(), 15);
            let land = pack.last().unwrap();
            assert!(slot_ids.contains(land));
            // Slot cards never double as regular commons.
            assert_eq!(pack.iter().filter(|id| slot_ids.contains(*id)).count(), 1);
        }
    }

    #[test]
    fn cube_path_builds_fifteen_card_packs() {
        let catalog = thb();
        let cards: Vec<CardId> = catalog.booster_cards().map(|(id, _)| id).take(45).collect();
        let list = CustomCardList::from_flat(cards);

        let mut rng = StdRng::seed_from_u64(6);
        let packs = generate_from_custom_list(&catalog, &list, true, 3, &mut rng).unwrap();
        assert_eq!(packs.len(), 3);
        for pack in &packs {
            assert_eq!(pack.len(), 15);
        }

        // The bag is consumed: 45 cards, 45 slots, no card twice overall.
        let mut all: Vec<CardId> = packs.into_iter().flatten().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 45);
    }

    #[test]
    fn sheet_path_draws_declared_counts() {
        let catalog = thb();
        let ids: Vec<CardId> = catalog.booster_cards().map(|(id, _)| id).collect();
        let mut list = CustomCardList::default();
        list.cards_per_booster.insert("commons".to_string(), 5);
        list.cards_per_booster.insert("specials".to_string(), 2);
        list.sheets
            .insert("commons".to_string(), ids[..30].to_vec());
        list.sheets
            .insert("specials".to_string(), ids[30..40].to_vec());

        let mut rng = StdRng::seed_from_u64(8);
        let packs = generate_from_custom_list(&catalog, &list, false, 4, &mut rng).unwrap();
        for pack in &packs {
            assert_eq!(pack.len(), 7);
            let from_specials = pack
                .iter()
                .filter(|id| ids[30..40].contains(*id))
                .count();
            assert_eq!(from_specials, 2);
        }
    }

    #[test]
    fn sheet_shortage_names_the_sheet() {
        let catalog = thb();
        let ids: Vec<CardId> = catalog.booster_cards().map(|(id, _)| id).collect();
        let mut list = CustomCardList::default();
        list.cards_per_booster.insert("tiny".to_string(), 5);
        list.sheets.insert("tiny".to_string(), ids[..8].to_vec());

        let mut rng = StdRng::seed_from_u64(9);
        let err = generate_from_custom_list(&catalog, &list, false, 2, &mut rng).unwrap_err();
        match err {
            BoosterError::Shortage { what, .. } => assert!(what.contains("tiny")),
            other => panic!("expected shortage, got {other:?}"),
        }
    }

    #[test]
    fn draft_packs_are_round_major_with_set_overrides() {
        // Second round forced to set "bbb".
        let mut cards = HashMap::new();
        let mut next_id = 1u32;
        for set in ["aaa", "bbb"] {
            for i in 0..60u32 {
                let rarity = match i % 15 {
                    0 => Rarity::Rare,
                    1..=3 => Rarity::Uncommon,
                    _ => Rarity::Common,
                };
                cards.insert(
                    next_id,
                    CardFacts {
                        name: format!("{set} {next_id}"),
                        set: set.to_string(),
                        rarity,
                        colors: vec![WUBRG[(i % 5) as usize].to_string()],
                        in_booster: true,
                    },
                );
                next_id += 1;
            }
        }
        let catalog = Catalog::from_parts(
            cards,
            vec!["aaa".to_string(), "bbb".to_string()],
            HashMap::new(),
            vec![],
        );

        let custom = vec!["".to_string(), "bbb".to_string()];
        let plan = PackPlan {
            boosters_per_player: 2,
            custom_boosters: &custom,
            distribution_mode: DistributionMode::Regular,
            options: GenerateOptions {
                set_restriction: vec!["aaa".to_string()],
                color_balance: false,
                ..GenerateOptions::default()
            },
            custom_card_list: None,
        };
        let mut rng = StdRng::seed_from_u64(21);
        let packs = generate_draft_packs(&catalog, None, &plan, 2, &mut rng).unwrap();
        assert_eq!(packs.len(), 4);

        // Round 0 (packs 0-1) from "aaa", round 1 (packs 2-3) from "bbb".
        for pack in &packs[..2] {
            assert!(pack.iter().all(|id| catalog.card(*id).unwrap().set == "aaa"));
        }
        for pack in &packs[2..] {
            assert!(pack.iter().all(|id| catalog.card(*id).unwrap().set == "bbb"));
        }
    }

    #[test]
    fn shuffled_pool_preserves_pack_count() {
        let catalog = thb();
        let plan = PackPlan {
            boosters_per_player: 3,
            custom_boosters: &[],
            distribution_mode: DistributionMode::ShuffleBoosterPool,
            options: GenerateOptions {
                color_balance: false,
                ..GenerateOptions::default()
            },
            custom_card_list: None,
        };
        let mut rng = StdRng::seed_from_u64(22);
        let packs = generate_draft_packs(&catalog, None, &plan, 2, &mut rng).unwrap();
        assert_eq!(packs.len(), 6);
        assert!(packs.iter().all(|p| p.len() == 14));
    }
}
