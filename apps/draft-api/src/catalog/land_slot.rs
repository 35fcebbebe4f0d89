//! Dedicated land slots for sets whose boosters always end on a land.

use rand::Rng;

use super::{CardId, Catalog};
use crate::booster::CardPool;

/// A set's land slot: a standalone pool the generator appends one card
/// from at the end of each pack.
#[derive(Debug, Clone)]
pub struct LandSlot {
    pool: Vec<CardId>,
}

impl LandSlot {
    /// Build the land slot for `set`, if the catalog declares one.
    ///
    /// Consumes the slot's cards out of `commons` so they cannot also be
    /// drawn as regular commons. Cards absent from the common pool (basic
    /// lands are usually not collection-tracked) still enter the slot with
    /// a single entry — the slot itself draws with replacement.
    pub fn setup(set: &str, catalog: &Catalog, commons: &mut CardPool) -> Option<Self> {
        let ids = catalog.land_slots.get(set)?;
        let mut pool = Vec::new();
        for &id in ids {
            let owned = commons.remove(&id).unwrap_or(0);
            let copies = owned.max(1) as usize;
            pool.extend(std::iter::repeat(id).take(copies));
        }
        if pool.is_empty() {
            return None;
        }
        Some(Self { pool })
    }

    /// Draw one land for a pack. With replacement: the same basic can show
    /// up in every pack of the run.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> CardId {
        self.pool[rng.gen_range(0..self.pool.len())]
    }
}
