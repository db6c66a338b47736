//! Movement legality.
//!
//! A move from one cell to the next needs three things: the neighbour must
//! exist, the current tile must let the player out on the side it faces, and
//! the neighbour must let the player in on the opposite side. Connectivity
//! is deliberately asymmetric, so a corridor can be passable one way only.

use crate::types::{Direction, Position};

use super::grid::Grid;
use super::tiles::{PlacedTile, SideKind, TileCatalog};

#[derive(Debug, Clone, Copy)]
pub struct Movement<'a> {
    catalog: &'a TileCatalog,
    grid: &'a Grid,
}

impl<'a> Movement<'a> {
    pub fn new(catalog: &'a TileCatalog, grid: &'a Grid) -> Self {
        Self { catalog, grid }
    }

    pub fn can_exit_tile(&self, tile: PlacedTile, direction: Direction) -> bool {
        tile.is_open(self.catalog, direction, SideKind::Out)
    }

    pub fn can_enter_tile(&self, tile: PlacedTile, side: Direction) -> bool {
        tile.is_open(self.catalog, side, SideKind::In)
    }

    /// The adjacent cell in `direction`, or `None` at any edge of the grid.
    pub fn destination(&self, position: Position, direction: Direction) -> Option<Position> {
        position
            .step(direction)
            .filter(|next| self.grid.in_bounds(*next))
    }

    pub fn can_pass(&self, position: Position, direction: Direction) -> bool {
        let Some(next) = self.destination(position, direction) else {
            return false;
        };
        let (Some(current), Some(target)) = (self.grid.tile(position), self.grid.tile(next)) else {
            return false;
        };
        self.can_exit_tile(current, direction) && self.can_enter_tile(target, direction.opposite())
    }
}

pub fn turn(orientation: Direction, clockwise: bool) -> Direction {
    if clockwise {
        orientation.clockwise()
    } else {
        orientation.counter_clockwise()
    }
}

/// The turns that bring `from` round to face `to`: `(clockwise, count)`.
///
/// A single quarter turn goes the short way. A half turn always goes
/// counter-clockwise.
pub fn turns_toward(from: Direction, to: Direction) -> (bool, u8) {
    match (to.index() + 4 - from.index()) % 4 {
        0 => (false, 0),
        1 => (true, 1),
        2 => (false, 2),
        _ => (false, 1),
    }
}
