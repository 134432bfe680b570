//! Combat deadlines in ticks and the timer block shown to clients

use serde::{Deserialize, Serialize};

use crate::core::config::ArenaConfig;
use crate::core::types::Tick;

/// Which countdown the client should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Placement,
    Combat,
    Accelerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    pub phase: TimerPhase,
    /// Seconds left in the displayed countdown
    pub remaining: f32,
}

/// What the clock wants done after a combat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Keep ticking
    Idle,
    /// Normal-cadence time is up; switch to accelerated attacks
    Accelerate,
    /// Hard deadline reached; resolve by hp
    Deadline,
}

/// Deadlines for one combat phase, fixed at phase entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatClock {
    combat_ticks: Tick,
    deadline_ticks: Tick,
    ticks_per_second: u32,
    accelerated: bool,
}

impl CombatClock {
    pub fn start(config: &ArenaConfig) -> Self {
        Self {
            combat_ticks: config.combat_ticks(),
            deadline_ticks: config.deadline_ticks(),
            ticks_per_second: config.ticks_per_second.max(1),
            accelerated: false,
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    /// Check the combat tick counter against the deadlines. `Accelerate` fires once.
    pub fn check(&mut self, tick: Tick) -> ClockEvent {
        if tick >= self.deadline_ticks {
            ClockEvent::Deadline
        } else if tick >= self.combat_ticks && !self.accelerated {
            self.accelerated = true;
            ClockEvent::Accelerate
        } else {
            ClockEvent::Idle
        }
    }

    pub fn timers(&self, tick: Tick) -> Timers {
        let target = if self.accelerated {
            self.deadline_ticks
        } else {
            self.combat_ticks
        };
        let remaining = target.saturating_sub(tick) as f32 / self.ticks_per_second as f32;
        Timers {
            phase: if self.accelerated {
                TimerPhase::Accelerated
            } else {
                TimerPhase::Combat
            },
            remaining,
        }
    }

    /// Static placement countdown
    pub fn placement_timers(config: &ArenaConfig) -> Timers {
        Timers {
            phase: TimerPhase::Placement,
            remaining: config.prep_seconds as f32,
        }
    }
}
