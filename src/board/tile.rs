//! Board tiles and their side classification

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Vec2;

/// Tile identity: offset coordinates on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub row: i32,
    pub col: i32,
}

impl TileId {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Which half of the board a tile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSide {
    /// Top half. The opponent's units are mirrored here for combat.
    Enemy,
    /// Bottom half. Every player places here during placement.
    Friendly,
    /// Battlefield rows past both halves; unreachable in normal play
    Neutral,
    Bench,
}

impl TileSide {
    /// Classify a tile from its row and bench membership alone
    pub fn classify(row: i32, is_bench: bool, rows_per_side: i32) -> Self {
        if is_bench {
            TileSide::Bench
        } else if row < rows_per_side {
            TileSide::Enemy
        } else if row < rows_per_side * 2 {
            TileSide::Friendly
        } else {
            TileSide::Neutral
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            TileSide::Enemy => TileSide::Friendly,
            TileSide::Friendly => TileSide::Enemy,
            other => *other,
        }
    }
}

/// A single immutable hex on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub center: Vec2,
    pub is_bench: bool,
    pub side: TileSide,
}

impl Tile {
    pub fn new(id: TileId, center: Vec2, is_bench: bool, rows_per_side: i32) -> Self {
        Self {
            id,
            center,
            is_bench,
            side: TileSide::classify(id.row, is_bench, rows_per_side),
        }
    }

    pub fn row(&self) -> i32 {
        self.id.row
    }

    pub fn col(&self) -> i32 {
        self.id.col
    }
}
