//! Server configuration with documented constants
//!
//! All tunable numbers are collected here. Durations are given in seconds and
//! converted to tick counts once, at phase entry, via the helper methods.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ArenaError, Result};

/// Tick period is whole milliseconds, so the rate tops out at one tick per ms
pub const MAX_TICKS_PER_SECOND: u32 = 1000;

/// Configuration for the arena server and the simulation it drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // === BOARD ===
    /// Battlefield rows owned by each side. Total battlefield rows is twice this.
    pub rows_per_side: i32,

    /// Columns per row
    pub cols: i32,

    /// Hex radius in board units. Sets the spacing of tile centers.
    pub hex_radius: f32,

    /// Number of bench rows below the battlefield
    pub bench_rows: i32,

    /// Vertical gap between the last battlefield row and the first bench row
    pub bench_gap: f32,

    /// Canvas the board is centered in
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === TIMING ===
    /// Fixed simulation rate during combat
    pub ticks_per_second: u32,

    /// Displayed placement timer. Placement has no deadline; this is informational.
    pub prep_seconds: u32,

    /// Combat time before attack cadence accelerates
    pub combat_seconds: u32,

    /// Additional time after acceleration before a forced resolution
    pub accel_seconds: u32,

    /// How often lobby/state are re-broadcast while idle in placement
    pub idle_broadcast_ms: u64,

    // === COMBAT ===
    /// Ticks between attacks at normal cadence
    pub attack_delay_ticks: u32,

    /// Cooldown divisor and decrement multiplier during acceleration
    pub accel_attack_factor: u32,

    /// Distance at which a projectile connects with its target
    pub projectile_hit_radius: f32,

    /// Projectiles older than this are discarded without effect
    pub projectile_ttl_ticks: u64,

    /// Attack ranges at or below this fire invisible projectiles
    pub melee_range_threshold: f32,

    // === PLAYERS & ECONOMY ===
    pub max_players: usize,

    /// Minimum ready players before combat may begin. Values below 2 are treated as 2.
    pub min_ready_to_start: usize,

    pub player_start_health: i32,
    pub loss_health_penalty: i32,
    pub starting_gold: u32,
    pub max_name_len: usize,

    /// Seed for pairing shuffles. `None` draws one from the OS at startup.
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rows_per_side: 4,
            cols: 7,
            hex_radius: 38.0,
            bench_rows: 1,
            bench_gap: 35.0,
            canvas_width: 1420.0,
            canvas_height: 960.0,

            ticks_per_second: 20,
            prep_seconds: 30,
            combat_seconds: 30,
            accel_seconds: 10,
            idle_broadcast_ms: 1000,

            attack_delay_ticks: 20,
            accel_attack_factor: 2,
            projectile_hit_radius: 14.0,
            projectile_ttl_ticks: 60,
            melee_range_threshold: 90.0,

            max_players: 8,
            min_ready_to_start: 2,
            player_start_health: 20,
            loss_health_penalty: 2,
            starting_gold: 10,
            max_name_len: 24,
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.rows_per_side <= 0 || self.cols <= 0 {
            return Err(ArenaError::InvalidConfig(format!(
                "board must have positive dimensions, got {} rows per side x {} cols",
                self.rows_per_side, self.cols
            )));
        }
        if self.bench_rows < 0 {
            return Err(ArenaError::InvalidConfig("bench_rows cannot be negative".into()));
        }
        if self.hex_radius <= 0.0 {
            return Err(ArenaError::InvalidConfig("hex_radius must be positive".into()));
        }
        if self.ticks_per_second == 0 || self.ticks_per_second > MAX_TICKS_PER_SECOND {
            return Err(ArenaError::InvalidConfig(format!(
                "ticks_per_second must be in 1..={MAX_TICKS_PER_SECOND}, got {}",
                self.ticks_per_second
            )));
        }
        if self.accel_attack_factor == 0 {
            return Err(ArenaError::InvalidConfig("accel_attack_factor must be positive".into()));
        }
        if self.max_players < 2 {
            return Err(ArenaError::InvalidConfig(format!(
                "max_players ({}) must allow at least one pair",
                self.max_players
            )));
        }
        if self.loss_health_penalty <= 0 {
            return Err(ArenaError::InvalidConfig("loss_health_penalty must be positive".into()));
        }
        Ok(())
    }

    /// Ready players required to start, never less than one pair
    pub fn min_players_to_start(&self) -> usize {
        self.min_ready_to_start.max(2)
    }

    /// Wall-clock length of one tick in milliseconds, never zero
    pub fn tick_millis(&self) -> u64 {
        (1000 / u64::from(self.ticks_per_second.max(1))).max(1)
    }

    /// Ticks of normal-cadence combat
    pub fn combat_ticks(&self) -> u64 {
        u64::from(self.combat_seconds) * u64::from(self.ticks_per_second)
    }

    /// Tick at which combat is force-resolved, counted from combat start
    pub fn deadline_ticks(&self) -> u64 {
        u64::from(self.combat_seconds + self.accel_seconds) * u64::from(self.ticks_per_second)
    }

    /// Idle broadcast period expressed in ticks (at least one)
    pub fn idle_broadcast_ticks(&self) -> u64 {
        (self.idle_broadcast_ms / self.tick_millis().max(1)).max(1)
    }

    /// Attack delay in effect, halved (at least 1) while accelerated
    pub fn attack_delay(&self, accelerated: bool) -> u32 {
        if accelerated {
            (self.attack_delay_ticks / self.accel_attack_factor).max(1)
        } else {
            self.attack_delay_ticks
        }
    }

    /// Per-tick movement scale. Catalog speeds are tuned for a 60 Hz baseline.
    pub fn speed_scale(&self) -> f32 {
        60.0 / self.ticks_per_second as f32
    }

    /// Distance a projectile travels per tick
    pub fn projectile_speed(&self) -> f32 {
        10.0 * self.speed_scale()
    }
}
