//! Per-owner tile occupancy index
//!
//! Derived from unit tile assignments; never a second source of truth. Two
//! owners may hold the same tile id because their boards are separate until
//! mirroring places them in different matches.

use ahash::AHashMap;

use crate::board::TileId;
use crate::core::types::{OwnerId, UnitId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Occupancy {
    slots: AHashMap<(TileId, OwnerId), UnitId>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tile: TileId, owner: OwnerId) -> Option<UnitId> {
        self.slots.get(&(tile, owner)).copied()
    }

    pub fn is_free_for(&self, tile: TileId, owner: OwnerId, unit: UnitId) -> bool {
        self.get(tile, owner).map_or(true, |occupant| occupant == unit)
    }

    pub fn claim(&mut self, tile: TileId, owner: OwnerId, unit: UnitId) {
        self.slots.insert((tile, owner), unit);
    }

    /// Release a slot, but only if `unit` is the one holding it
    pub fn release(&mut self, tile: TileId, owner: OwnerId, unit: UnitId) {
        if self.get(tile, owner) == Some(unit) {
            self.slots.remove(&(tile, owner));
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, OwnerId, UnitId)> + '_ {
        self.slots.iter().map(|(&(tile, owner), &unit)| (tile, owner, unit))
    }
}
