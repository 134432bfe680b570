//! Battle simulation state and placement mutations
//!
//! `BattleSimulation` exclusively owns the board, units, occupancy index and
//! projectiles. Every mutation goes through its methods; the occupancy index
//! is updated in the same call that changes a unit's tile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::{Board, Tile, TileId, TileSide};
use crate::core::config::ArenaConfig;
use crate::core::error::PlacementError;
use crate::core::types::{MatchId, OwnerId, Tick, UnitId, Vec2};
use crate::simulation::occupancy::Occupancy;
use crate::units::{Projectile, Unit, UnitStatus, UnitType};

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Placement, // Players arrange units, no ticking
    Combat,    // Matches run tick by tick
}

/// One paired combat instance for the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub match_id: MatchId,
    /// Keeps its home layout on the friendly side
    pub bottom: OwnerId,
    /// Mirrored onto the enemy side
    pub top: OwnerId,
}

impl MatchPair {
    pub fn contains(&self, owner: OwnerId) -> bool {
        self.bottom == owner || self.top == owner
    }
}

/// Which battlefield side a placement may target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRule {
    /// Normal play: own half only
    FriendlyOnly,
    /// Friendly half or the enemy half
    AllowEnemy,
}

/// The authoritative battle engine
#[derive(Debug, Clone)]
pub struct BattleSimulation {
    pub(crate) config: ArenaConfig,
    pub(crate) board: Board,
    /// Ordered by id; iteration order is the documented targeting tiebreak
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) occupancy: Occupancy,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) phase: Phase,
    pub(crate) tick: Tick,
    pub(crate) pairs: Vec<MatchPair>,
    pub(crate) accelerated: bool,
    next_unit_id: u64,
}

impl BattleSimulation {
    pub fn new(config: ArenaConfig) -> Self {
        let board = Board::generate(&config);
        Self {
            config,
            board,
            units: BTreeMap::new(),
            occupancy: Occupancy::new(),
            projectiles: Vec::new(),
            phase: Phase::Placement,
            tick: 0,
            pairs: Vec::new(),
            accelerated: false,
            next_unit_id: 1,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn pairs(&self) -> &[MatchPair] {
        &self.pairs
    }

    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    /// Toggle the accelerated sub-phase. Only meaningful during combat.
    pub fn set_accelerated(&mut self, accelerated: bool) {
        self.accelerated = accelerated && self.phase == Phase::Combat;
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All units in id order
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn units_of(&self, owner: OwnerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == owner)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn owns(&self, owner: OwnerId, unit_id: UnitId) -> bool {
        self.units.get(&unit_id).is_some_and(|u| u.owner == owner)
    }

    /// Create a benched unit. Currency is the caller's concern.
    pub fn spawn_unit(&mut self, owner: OwnerId, unit_type: UnitType) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let unit = Unit::new(id, owner, unit_type, self.config.speed_scale());
        self.units.insert(id, unit);
        tracing::debug!(unit = %id, owner = %owner, %unit_type, "spawned unit");
        id
    }

    /// Place an owned unit on a friendly battlefield tile
    pub fn place_unit(
        &mut self,
        owner: OwnerId,
        unit_id: UnitId,
        row: i32,
        col: i32,
    ) -> Result<(), PlacementError> {
        self.place_unit_with(owner, unit_id, row, col, PlacementRule::FriendlyOnly)
    }

    /// Place an owned unit under an explicit side rule
    pub fn place_unit_with(
        &mut self,
        owner: OwnerId,
        unit_id: UnitId,
        row: i32,
        col: i32,
        rule: PlacementRule,
    ) -> Result<(), PlacementError> {
        let unit = match self.units.get(&unit_id) {
            Some(u) if u.owner == owner => u,
            _ => return Err(PlacementError::UnitNotFound(unit_id)),
        };
        let tile = self
            .board
            .find(row, col)
            .ok_or(PlacementError::TileNotFound { row, col })?;
        if tile.is_bench {
            return Err(PlacementError::BenchTile);
        }
        if self.phase != Phase::Placement {
            return Err(PlacementError::WrongPhase);
        }
        let side_ok = match rule {
            PlacementRule::FriendlyOnly => tile.side == TileSide::Friendly,
            PlacementRule::AllowEnemy => {
                matches!(tile.side, TileSide::Friendly | TileSide::Enemy)
            }
        };
        if !side_ok {
            return Err(PlacementError::WrongSide {
                allowed: TileSide::Friendly,
                found: tile.side,
            });
        }
        if let Some(occupant) = self.occupancy.get(tile.id, owner) {
            if occupant != unit_id {
                return Err(PlacementError::Occupied(occupant));
            }
        }

        let (tile_id, center, side) = (tile.id, tile.center, tile.side);
        let previous = unit.tile_id;
        if let Some(prev) = previous {
            self.occupancy.release(prev, owner, unit_id);
        }
        self.occupancy.claim(tile_id, owner, unit_id);

        if let Some(unit) = self.units.get_mut(&unit_id) {
            unit.tile_id = Some(tile_id);
            unit.position = center;
            unit.status = UnitStatus::Board;
            // Enemy-side placement never overwrites the home tile
            if side == TileSide::Friendly {
                unit.home_tile_id = Some(tile_id);
            }
        }
        Ok(())
    }

    /// Return an owned unit to the bench. Idempotent.
    pub fn bench_unit(&mut self, owner: OwnerId, unit_id: UnitId) -> Result<(), PlacementError> {
        if !self.owns(owner, unit_id) {
            return Err(PlacementError::UnitNotFound(unit_id));
        }
        if self.phase != Phase::Placement {
            return Err(PlacementError::WrongPhase);
        }
        self.send_to_bench(unit_id, true);
        Ok(())
    }

    /// Clear a unit's tile, position and board status.
    ///
    /// `forget_home` drops the home tile too; a player benching a unit wants
    /// it off the board for good, while a unit sitting out a round must come
    /// back to its tile afterwards.
    pub(crate) fn send_to_bench(&mut self, unit_id: UnitId, forget_home: bool) {
        let Some(unit) = self.units.get_mut(&unit_id) else {
            return;
        };
        if let Some(tile) = unit.tile_id.take() {
            self.occupancy.release(tile, unit.owner, unit_id);
        }
        unit.status = UnitStatus::Bench;
        unit.position = Vec2::ZERO;
        if forget_home {
            unit.home_tile_id = None;
        }
    }

    /// Delete a unit and free its slot. Refunds are the caller's concern.
    pub fn remove_unit(&mut self, unit_id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&unit_id)?;
        if let Some(tile) = unit.tile_id {
            self.occupancy.release(tile, unit.owner, unit_id);
        }
        self.projectiles.retain(|p| p.target != unit_id);
        Some(unit)
    }

    /// Remove every unit an owner has. Returns how many were removed.
    pub fn remove_owner_units(&mut self, owner: OwnerId) -> usize {
        let ids: Vec<UnitId> = self.units_of(owner).map(|u| u.id).collect();
        for id in &ids {
            self.remove_unit(*id);
        }
        ids.len()
    }

    pub(crate) fn tile_center(&self, tile: TileId) -> Option<Vec2> {
        self.board.tile(tile).map(|t: &Tile| t.center)
    }
}
