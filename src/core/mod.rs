pub mod config;
pub mod error;
pub mod types;

pub use config::ArenaConfig;
pub use error::{ArenaError, CommandError, PlacementError, Result};
pub use types::{MatchId, OwnerId, Tick, UnitId, Vec2};
