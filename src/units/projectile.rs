//! Homing projectiles

use serde::{Deserialize, Serialize};

use crate::core::types::{MatchId, Tick, UnitId, Vec2};

/// A shot in flight toward a unit
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub target: UnitId,
    pub damage: f32,
    pub speed: f32,
    pub spawn_tick: Tick,
    pub match_id: Option<MatchId>,
    /// Rendering hint only. Melee attacks fire invisible projectiles.
    pub visible: bool,
    pub active: bool,
}

impl Projectile {
    pub fn new(
        position: Vec2,
        target: UnitId,
        damage: f32,
        speed: f32,
        spawn_tick: Tick,
        match_id: Option<MatchId>,
        visible: bool,
    ) -> Self {
        Self {
            position,
            target,
            damage,
            speed,
            spawn_tick,
            match_id,
            visible,
            active: true,
        }
    }

    /// Has this projectile outlived `ttl` ticks?
    pub fn expired(&self, now: Tick, ttl: Tick) -> bool {
        now.saturating_sub(self.spawn_tick) > ttl
    }

    pub fn to_view(&self) -> ProjectileView {
        ProjectileView {
            x: self.position.x,
            y: self.position.y,
            target: self.target,
            match_id: self.match_id,
            visible: self.visible,
        }
    }
}

/// Serialized projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub target: UnitId,
    pub match_id: Option<MatchId>,
    pub visible: bool,
}
