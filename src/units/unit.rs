//! Per-unit state and its snapshot form

use serde::{Deserialize, Serialize};

use crate::board::TileId;
use crate::core::types::{MatchId, OwnerId, Tick, UnitId, Vec2};
use crate::units::unit_type::UnitType;

/// Lifecycle status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    Bench, // Off the battlefield
    Board, // Placed, takes part in combat
    Dead,  // Killed this round; revived at teardown
}

/// A unit owned by a player
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub owner: OwnerId,
    pub unit_type: UnitType,

    // Stats
    pub max_hp: f32,
    pub hp: f32,
    pub damage: f32,
    pub attack_range: f32,
    /// Distance covered per tick
    pub move_speed: f32,

    // Placement
    pub status: UnitStatus,
    pub position: Vec2,
    pub tile_id: Option<TileId>,
    /// Friendly-side tile chosen during placement; restored after each round
    pub home_tile_id: Option<TileId>,

    // Combat
    pub attack_cooldown: u32,
    pub last_attack_tick: Option<Tick>,
    pub match_id: Option<MatchId>,
}

impl Unit {
    /// Create a benched unit. `speed_scale` converts catalog speed to per-tick distance.
    pub fn new(id: UnitId, owner: OwnerId, unit_type: UnitType, speed_scale: f32) -> Self {
        let stats = unit_type.stats();
        Self {
            id,
            owner,
            unit_type,
            max_hp: stats.hp,
            hp: stats.hp,
            damage: stats.damage,
            attack_range: stats.range,
            move_speed: stats.speed * speed_scale,
            status: UnitStatus::Bench,
            position: Vec2::ZERO,
            tile_id: None,
            home_tile_id: None,
            attack_cooldown: 0,
            last_attack_tick: None,
            match_id: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// On the board with hp left: can act, can be targeted, counts toward winning
    pub fn is_active(&self) -> bool {
        self.status == UnitStatus::Board && self.is_alive()
    }

    /// Restore full health and combat counters. Position is the caller's concern.
    pub fn reset_combat_state(&mut self) {
        self.hp = self.max_hp;
        self.status = if self.tile_id.is_some() {
            UnitStatus::Board
        } else {
            UnitStatus::Bench
        };
        self.attack_cooldown = 0;
        self.last_attack_tick = None;
    }

    /// Apply damage, marking the unit dead at zero hp. Returns true if this killed it.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.status = UnitStatus::Dead;
        }
        was_alive && !self.is_alive()
    }

    pub fn to_view(&self) -> UnitView {
        UnitView {
            id: self.id,
            owner: self.owner,
            unit_type: self.unit_type,
            hp: self.hp,
            max_hp: self.max_hp,
            x: self.position.x,
            y: self.position.y,
            status: self.status,
            tile_id: self.tile_id,
            home_tile_id: self.home_tile_id,
            attack_at: self.last_attack_tick,
            match_id: self.match_id,
        }
    }
}

/// Serialized unit, everything a client needs to draw it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: OwnerId,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub hp: f32,
    pub max_hp: f32,
    pub x: f32,
    pub y: f32,
    pub status: UnitStatus,
    pub tile_id: Option<TileId>,
    pub home_tile_id: Option<TileId>,
    /// Tick of the most recent attack, drives the attack pose
    pub attack_at: Option<Tick>,
    pub match_id: Option<MatchId>,
}
