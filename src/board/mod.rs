//! Hex board: fixed battlefield plus bench rows
//!
//! The board is generated once from config and never mutated. Everything else
//! refers to tiles by `TileId`.

pub mod layout;
pub mod tile;

pub use layout::Board;
pub use tile::{Tile, TileId, TileSide};
