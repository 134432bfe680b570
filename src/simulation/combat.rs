//! Combat loop
//!
//! Each tick: units (target -> attack or move -> cooldown) -> projectiles -> resolution check.
//! All matches advance together in a single pass.

use ordered_float::OrderedFloat;

use crate::core::types::{OwnerId, Tick, UnitId};
use crate::simulation::engine::{BattleSimulation, Phase};
use crate::units::{Projectile, Unit};

/// What happened during one call to [`BattleSimulation::step`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub tick: Tick,
    pub shots_fired: usize,
    pub killed: Vec<UnitId>,
    /// Every match has at most one owner with a living board unit.
    /// Advisory; the orchestrator makes the final call.
    pub all_resolved: bool,
}

impl BattleSimulation {
    /// Enter combat with the given (bottom, top) pairs
    ///
    /// No-op returning false when there are no pairs or combat is already running.
    pub fn start_combat(&mut self, pairs: &[(OwnerId, OwnerId)]) -> bool {
        if pairs.is_empty() || self.phase != Phase::Placement {
            return false;
        }
        self.prepare_pairs(pairs);
        self.phase = Phase::Combat;
        self.tick = 0;
        self.projectiles.clear();
        self.accelerated = false;
        self.reset_units_to_tiles();
        tracing::info!(matches = self.pairs.len(), "combat started");
        true
    }

    /// Tear down combat and return to placement with everyone home and healed
    pub fn end_combat(&mut self) {
        self.phase = Phase::Placement;
        self.projectiles.clear();
        self.restore_home_positions();
        self.pairs.clear();
        self.accelerated = false;
        self.reset_units_to_tiles();
    }

    fn reset_units_to_tiles(&mut self) {
        let board = &self.board;
        for unit in self.units.values_mut() {
            unit.reset_combat_state();
            if let Some(tile) = unit.tile_id.and_then(|t| board.tile(t)) {
                unit.position = tile.center;
            }
        }
    }

    /// Nearest living enemy board unit in the seeker's match
    ///
    /// Distance ties go to the lowest unit id. Pure function of current state.
    pub fn find_target(&self, seeker: &Unit) -> Option<&Unit> {
        seeker.match_id?;
        self.units
            .values()
            .filter(|u| u.owner != seeker.owner && u.is_active() && u.match_id == seeker.match_id)
            .min_by_key(|u| OrderedFloat(seeker.position.distance(&u.position)))
    }

    /// Advance combat by one tick. Does nothing outside combat.
    pub fn step(&mut self) -> TickOutcome {
        if self.phase != Phase::Combat {
            return TickOutcome {
                tick: self.tick,
                ..TickOutcome::default()
            };
        }
        self.tick += 1;
        let tick = self.tick;

        let mut outcome = TickOutcome {
            tick,
            ..TickOutcome::default()
        };

        let delay = self.config.attack_delay(self.accelerated);
        let decrement = if self.accelerated {
            self.config.accel_attack_factor
        } else {
            1
        };
        let melee_threshold = self.config.melee_range_threshold;
        let projectile_speed = self.config.projectile_speed();

        // Units act in id order and see earlier units' moves from this tick
        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            let Some(seeker) = self.units.get(&id) else {
                continue;
            };
            if !seeker.is_active() {
                continue;
            }
            let Some(target) = self.find_target(seeker) else {
                continue;
            };
            let (target_id, target_pos) = (target.id, target.position);

            let Some(unit) = self.units.get_mut(&id) else {
                continue;
            };
            let dist = unit.position.distance(&target_pos);
            if dist <= unit.attack_range {
                if unit.attack_cooldown == 0 {
                    unit.attack_cooldown = delay;
                    unit.last_attack_tick = Some(tick);
                    let visible = unit.attack_range > melee_threshold;
                    self.projectiles.push(Projectile::new(
                        unit.position,
                        target_id,
                        unit.damage,
                        projectile_speed,
                        tick,
                        unit.match_id,
                        visible,
                    ));
                    outcome.shots_fired += 1;
                }
            } else if dist > 0.0 {
                unit.position = unit.position.step_toward(target_pos, unit.move_speed);
            }

            unit.attack_cooldown = unit.attack_cooldown.saturating_sub(decrement);
        }

        self.advance_projectiles(&mut outcome);
        outcome.all_resolved = self.is_combat_resolved();
        outcome
    }

    fn advance_projectiles(&mut self, outcome: &mut TickOutcome) {
        let tick = self.tick;
        let ttl = self.config.projectile_ttl_ticks;
        let hit_radius = self.config.projectile_hit_radius;

        for projectile in &mut self.projectiles {
            let target = match self.units.get_mut(&projectile.target) {
                Some(t) if t.is_alive() && t.match_id == projectile.match_id => t,
                _ => {
                    projectile.active = false;
                    continue;
                }
            };
            if projectile.expired(tick, ttl) {
                projectile.active = false;
                continue;
            }

            // Home on the target's current position; the larger reach stops
            // fast projectiles from stepping over a close target
            let dist = projectile.position.distance(&target.position);
            if dist <= hit_radius.max(projectile.speed) {
                if target.take_damage(projectile.damage) {
                    outcome.killed.push(target.id);
                }
                projectile.active = false;
            } else {
                projectile.position = projectile.position.step_toward(target.position, projectile.speed);
            }
        }

        self.projectiles.retain(|p| p.active);
    }
}
