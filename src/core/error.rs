use thiserror::Error;

use crate::board::TileSide;
use crate::core::types::{OwnerId, UnitId};

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;

/// Why the engine refused a placement mutation. State is unchanged on any of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("No tile at row {row}, col {col}")]
    TileNotFound { row: i32, col: i32 },

    #[error("Cannot place units on the bench row")]
    BenchTile,

    #[error("Placement is closed during combat")]
    WrongPhase,

    #[error("Tile is on the {found:?} side, expected {allowed:?}")]
    WrongSide { allowed: TileSide, found: TileSide },

    #[error("Tile already holds unit {0}")]
    Occupied(UnitId),
}

/// Rejections raised by the orchestrator while handling a player command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Server full")]
    ServerFull,

    #[error("Unknown player {0}")]
    UnknownPlayer(OwnerId),

    #[error("Unknown unit type")]
    UnknownUnitType(String),

    #[error("Not enough gold")]
    NotEnoughGold { needed: u32, available: u32 },

    #[error("You do not own that unit")]
    NotOwner(UnitId),

    #[error("Cannot {0} units during combat")]
    CombatInProgress(&'static str),

    #[error("Could not place unit")]
    Placement(#[from] PlacementError),

    #[error("Player has been eliminated")]
    Eliminated,
}
