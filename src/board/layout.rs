//! Hex board generation and lookup
//!
//! Offset rows: odd rows shift right by half a column, which produces a true
//! hex tiling. Battlefield rows come first, bench rows follow below a gap.

use ahash::AHashMap;

use crate::board::tile::{Tile, TileId, TileSide};
use crate::core::config::ArenaConfig;
use crate::core::types::Vec2;

const SQRT_3: f32 = 1.732_050_8;

/// Minimum distance from the canvas top to the first row of centers
const MIN_TOP_MARGIN: f32 = 80.0;

/// The full, immutable tile set
#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Tile>,
    index: AHashMap<TileId, usize>,
    rows_per_side: i32,
    cols: i32,
}

impl Board {
    /// Generate the board described by `config`. Same config, same tiles.
    pub fn generate(config: &ArenaConfig) -> Self {
        let r = config.hex_radius;
        let rows_per_side = config.rows_per_side;
        let battle_rows = rows_per_side * 2;
        let cols = config.cols;
        let col_pitch = r * SQRT_3;
        let row_pitch = r * 1.5;
        let odd_shift = col_pitch / 2.0;

        // Center the footprint horizontally, keep a margin at the top
        let center_span_x = col_pitch * (cols - 1) as f32 + odd_shift;
        let total_width = center_span_x + 2.0 * r;
        let start_x = (config.canvas_width - total_width) / 2.0 + r;
        let center_span_y = row_pitch * (battle_rows - 1) as f32;
        let bench_span_y = if config.bench_rows > 0 {
            row_pitch * (config.bench_rows - 1) as f32
        } else {
            0.0
        };
        let total_height = center_span_y + bench_span_y + config.bench_gap + 2.0 * r;
        let start_y = MIN_TOP_MARGIN.max((config.canvas_height - total_height) / 2.0 + r);

        let row_x = |row: i32, col: i32| {
            let shift = if row % 2 == 0 { 0.0 } else { odd_shift };
            start_x + col as f32 * col_pitch + shift
        };

        let mut tiles = Vec::with_capacity(((battle_rows + config.bench_rows) * cols) as usize);
        for row in 0..battle_rows {
            for col in 0..cols {
                let center = Vec2::new(row_x(row, col), start_y + row as f32 * row_pitch);
                tiles.push(Tile::new(TileId::new(row, col), center, false, rows_per_side));
            }
        }

        let bench_start_y = start_y + battle_rows as f32 * row_pitch + config.bench_gap;
        for bench_row in 0..config.bench_rows {
            let row = battle_rows + bench_row;
            for col in 0..cols {
                let center = Vec2::new(row_x(row, col), bench_start_y + bench_row as f32 * row_pitch);
                tiles.push(Tile::new(TileId::new(row, col), center, true, rows_per_side));
            }
        }

        let index = tiles.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        Self { tiles, index, rows_per_side, cols }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn rows_per_side(&self) -> i32 {
        self.rows_per_side
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.index.get(&id).map(|&i| &self.tiles[i])
    }

    pub fn find(&self, row: i32, col: i32) -> Option<&Tile> {
        self.tile(TileId::new(row, col))
    }

    /// Reflect a tile across the centerline onto `to_side`
    ///
    /// Bench tiles and tiles already on `to_side` map to themselves. Friendly
    /// and enemy tiles swap with row and column both reflected, so a unit in
    /// the bottom-left corner appears in the top-right corner.
    pub fn mirror<'a>(&'a self, tile: &'a Tile, to_side: TileSide) -> Option<&'a Tile> {
        let n = self.rows_per_side;
        let col = (self.cols - 1) - tile.col();
        match (tile.side, to_side) {
            (TileSide::Bench, _) => Some(tile),
            (TileSide::Friendly, TileSide::Enemy) => self.find(n - 1 - (tile.row() - n), col),
            (TileSide::Enemy, TileSide::Friendly) => self.find(n + (n - 1 - tile.row()), col),
            _ => Some(tile),
        }
    }

    /// Battlefield tiles of one side, ordered for fallback placement
    ///
    /// Enemy side scans from the top back line down; friendly side scans from
    /// the bottom back line up. Within a row, columns ascend.
    pub fn fallback_order(&self, side: TileSide) -> Vec<&Tile> {
        let mut candidates: Vec<&Tile> = self
            .tiles
            .iter()
            .filter(|t| !t.is_bench && t.side == side)
            .collect();
        if side == TileSide::Friendly {
            candidates.sort_by(|a, b| b.row().cmp(&a.row()).then(a.col().cmp(&b.col())));
        } else {
            candidates.sort_by(|a, b| a.row().cmp(&b.row()).then(a.col().cmp(&b.col())));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::generate(&ArenaConfig::default())
    }

    #[test]
    fn test_tile_counts() {
        let board = board();
        assert_eq!(board.len(), 9 * 7);
        assert_eq!(board.tiles().iter().filter(|t| t.is_bench).count(), 7);
        assert_eq!(
            board.tiles().iter().filter(|t| t.side == TileSide::Friendly).count(),
            28
        );
        assert_eq!(board.tiles().iter().filter(|t| t.side == TileSide::Enemy).count(), 28);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = board();
        let b = board();
        assert_eq!(a.tiles(), b.tiles());
    }

    #[test]
    fn test_neighbors_are_equidistant() {
        let board = board();
        let center = board.find(4, 3).unwrap().center;
        let right = board.find(4, 4).unwrap().center;
        let below = board.find(5, 3).unwrap().center;
        let d1 = center.distance(&right);
        let d2 = center.distance(&below);
        assert!((d1 - d2).abs() < 0.01, "{d1} vs {d2}");
    }

    #[test]
    fn test_mirror_corners() {
        let board = board();
        let bottom_left = board.find(7, 0).unwrap();
        let mirrored = board.mirror(bottom_left, TileSide::Enemy).unwrap();
        assert_eq!(mirrored.id, TileId::new(0, 6));
        let front = board.find(4, 2).unwrap();
        assert_eq!(board.mirror(front, TileSide::Enemy).unwrap().id, TileId::new(3, 4));
    }

    #[test]
    fn test_mirror_bench_is_identity() {
        let board = board();
        let bench = board.find(8, 1).unwrap();
        assert_eq!(board.mirror(bench, TileSide::Enemy).unwrap().id, bench.id);
    }

    #[test]
    fn test_fallback_order_prefers_back_line() {
        let board = board();
        let enemy = board.fallback_order(TileSide::Enemy);
        assert_eq!(enemy[0].id, TileId::new(0, 0));
        let friendly = board.fallback_order(TileSide::Friendly);
        assert_eq!(friendly[0].id, TileId::new(7, 0));
    }

    #[test]
    fn test_board_centered_with_top_margin() {
        let board = board();
        let first = board.find(0, 0).unwrap();
        assert!(first.center.y >= MIN_TOP_MARGIN);
        assert!(first.center.x > 0.0);
    }
}
