//! Full engine snapshot, the only view clients get of the simulation

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::simulation::engine::{BattleSimulation, MatchPair, Phase};
use crate::units::{ProjectileView, UnitView};

/// Complete engine state as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub phase: Phase,
    pub tick: Tick,
    pub accelerated: bool,
    pub units: Vec<UnitView>,
    pub projectiles: Vec<ProjectileView>,
    pub pairs: Vec<MatchPair>,
}

impl BattleSimulation {
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            phase: self.phase,
            tick: self.tick,
            accelerated: self.accelerated,
            units: self.units.values().map(|u| u.to_view()).collect(),
            projectiles: self.projectiles.iter().map(|p| p.to_view()).collect(),
            pairs: self.pairs.clone(),
        }
    }
}
