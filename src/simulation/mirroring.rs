//! Pair preparation and round teardown
//!
//! Every player places on the friendly half. When two owners are paired the
//! bottom owner keeps their layout and the top owner's units are reflected
//! onto the enemy half.

use std::collections::BTreeSet;

use crate::board::{TileId, TileSide};
use crate::core::types::{MatchId, OwnerId, UnitId, Vec2};
use crate::simulation::engine::{BattleSimulation, MatchPair};
use crate::units::UnitStatus;

impl BattleSimulation {
    /// Assign match ids, mirror paired owners, bench everyone else's board units
    pub fn prepare_pairs(&mut self, pairs: &[(OwnerId, OwnerId)]) {
        self.pairs = pairs
            .iter()
            .enumerate()
            .map(|(i, &(bottom, top))| MatchPair {
                match_id: MatchId(i as u32),
                bottom,
                top,
            })
            .collect();
        self.occupancy.clear();

        let paired: BTreeSet<OwnerId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();

        for pair in self.pairs.clone() {
            self.move_owner_to_side(pair.bottom, TileSide::Friendly);
            self.move_owner_to_side(pair.top, TileSide::Enemy);
            for unit in self.units.values_mut() {
                if pair.contains(unit.owner) {
                    unit.match_id = Some(pair.match_id);
                }
            }
        }

        let sitting_out: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| !paired.contains(&u.owner))
            .map(|u| u.id)
            .collect();
        for id in sitting_out {
            if self.units.get(&id).is_some_and(|u| u.tile_id.is_some()) {
                self.send_to_bench(id, false);
            }
            if let Some(unit) = self.units.get_mut(&id) {
                unit.match_id = None;
            }
        }
    }

    /// Place each of an owner's units with a home tile onto `side`
    ///
    /// Bottom owners land on their home tile. Top owners land on its mirror
    /// image; if that slot is taken, on the first open tile in fallback order.
    /// A unit with nowhere to go is benched for the round.
    pub(crate) fn move_owner_to_side(&mut self, owner: OwnerId, side: TileSide) {
        // Enemy-side overrides have no home; they hold their tile for the round
        let unhomed: Vec<(UnitId, TileId)> = self
            .units_of(owner)
            .filter(|u| u.home_tile_id.is_none())
            .filter_map(|u| u.tile_id.map(|tile| (u.id, tile)))
            .collect();
        for (unit_id, tile) in unhomed {
            self.occupancy.claim(tile, owner, unit_id);
        }

        let homed: Vec<(UnitId, TileId)> = self
            .units_of(owner)
            .filter_map(|u| u.home_tile_id.map(|home| (u.id, home)))
            .collect();

        for (unit_id, home) in homed {
            let Some(home_tile) = self.board.tile(home) else {
                continue;
            };
            let mirrored = if side == TileSide::Friendly {
                Some(home_tile.id)
            } else {
                self.board.mirror(home_tile, side).map(|t| t.id)
            };

            let target = match mirrored {
                Some(tile) if self.occupancy.is_free_for(tile, owner, unit_id) => Some(tile),
                _ => self.find_open_tile(side, owner),
            };

            let Some(target) = target else {
                tracing::debug!(unit = %unit_id, owner = %owner, ?side, "no open mirror tile, unit sits out");
                self.send_to_bench(unit_id, false);
                continue;
            };

            let Some(center) = self.tile_center(target) else {
                continue;
            };
            if let Some(unit) = self.units.get_mut(&unit_id) {
                if let Some(prev) = unit.tile_id {
                    self.occupancy.release(prev, owner, unit_id);
                }
                unit.tile_id = Some(target);
                unit.position = center;
                unit.status = UnitStatus::Board;
                self.occupancy.claim(target, owner, unit_id);
            }
        }
    }

    /// First tile on `side` with no unit of `owner`, nearest the owner's back line first
    pub fn find_open_tile(&self, side: TileSide, owner: OwnerId) -> Option<TileId> {
        self.board
            .fallback_order(side)
            .into_iter()
            .map(|t| t.id)
            .find(|&tile| self.occupancy.get(tile, owner).is_none())
    }

    /// Put every unit back on its home tile and rebuild occupancy from scratch
    ///
    /// Units without a home go to the bench. If two units share a home (one was
    /// moved to the enemy half and the tile reused), the lower id keeps it and
    /// the other is benched and loses its home.
    pub fn restore_home_positions(&mut self) {
        self.occupancy.clear();
        let board = &self.board;
        for unit in self.units.values_mut() {
            unit.match_id = None;
            let home = unit
                .home_tile_id
                .and_then(|home| board.tile(home))
                .filter(|tile| self.occupancy.get(tile.id, unit.owner).is_none());
            match home {
                Some(tile) => {
                    unit.tile_id = Some(tile.id);
                    unit.position = tile.center;
                    unit.status = UnitStatus::Board;
                    self.occupancy.claim(tile.id, unit.owner, unit.id);
                }
                None => {
                    unit.tile_id = None;
                    unit.home_tile_id = None;
                    unit.position = Vec2::ZERO;
                    unit.status = UnitStatus::Bench;
                }
            }
        }
    }
}
