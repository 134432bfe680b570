//! Battle simulation engine
//!
//! Placement mutations, pair mirroring, the per-tick combat step and round
//! resolution queries, all on one owned `BattleSimulation`.

pub mod combat;
pub mod engine;
pub mod mirroring;
pub mod occupancy;
pub mod resolution;
pub mod snapshot;

pub use combat::TickOutcome;
pub use engine::{BattleSimulation, MatchPair, Phase, PlacementRule};
pub use occupancy::Occupancy;
pub use resolution::{decide_match, MatchResult, MatchSnapshot};
pub use snapshot::SimulationSnapshot;
