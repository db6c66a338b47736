//! The placed tiles of a level, row-major.

use crate::types::Position;

use super::tiles::{PlacedTile, TileRef};

/// Rows may differ in length; a cell beyond the end of its row does not
/// exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<PlacedTile>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<PlacedTile>>) -> Self {
        Self { rows }
    }

    pub fn from_refs(rows: &[Vec<TileRef>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|tile| tile.resolve()).collect())
            .collect();
        Self { rows }
    }

    pub fn tile(&self, position: Position) -> Option<PlacedTile> {
        self.rows.get(position.y)?.get(position.x).copied()
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        self.tile(position).is_some()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Every placed tile with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, PlacedTile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, tile)| (Position::new(x, y), *tile))
        })
    }
}
