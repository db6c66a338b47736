//! Tile types and their open sides.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::Direction;

bitflags! {
    /// The sides of a tile through which the player may pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Sides: u8 {
        const UP    = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN  = 1 << 2;
        const LEFT  = 1 << 3;
    }
}

impl Sides {
    pub fn of(direction: Direction) -> Self {
        Self::from_bits_truncate(1 << direction.index())
    }

    pub fn has(self, direction: Direction) -> bool {
        self.contains(Self::of(direction))
    }

    /// Rotate every side clockwise by `rotation` quarter turns.
    pub fn rotated(self, rotation: u8) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|side| self.has(*side))
            .map(|side| Self::of(Direction::from_index(side.index() as i64 + rotation as i64)))
            .collect()
    }
}

impl FromIterator<Direction> for Sides {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        iter.into_iter().map(Sides::of).collect()
    }
}

/// Whether a side is asked about for entering or for leaving a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideKind {
    In,
    Out,
}

/// A class of grid cell. Sides are given unrotated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileType {
    pub open_in: Sides,
    pub open_out: Sides,
}

impl TileType {
    pub const ROCK: TileType = TileType {
        open_in: Sides::empty(),
        open_out: Sides::empty(),
    };

    pub fn sides(&self, kind: SideKind) -> Sides {
        match kind {
            SideKind::In => self.open_in,
            SideKind::Out => self.open_out,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileCatalog {
    types: Vec<TileType>,
}

impl TileCatalog {
    pub fn new(types: Vec<TileType>) -> Self {
        Self { types }
    }

    pub fn get(&self, type_id: usize) -> Option<&TileType> {
        self.types.get(type_id)
    }

    /// Unrotated open sides of a tile type. Unknown ids are fully closed.
    pub fn open_sides(&self, type_id: usize, kind: SideKind) -> Sides {
        self.get(type_id)
            .map_or(Sides::empty(), |tile_type| tile_type.sides(kind))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A tile type placed on the grid, turned clockwise by `rotation` quarter
/// turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub type_id: usize,
    pub rotation: u8,
}

impl PlacedTile {
    pub fn new(type_id: usize, rotation: i64) -> Self {
        Self {
            type_id,
            rotation: rotation.rem_euclid(4) as u8,
        }
    }

    /// Whether `side` is open for `kind` once the rotation is applied.
    pub fn is_open(&self, catalog: &TileCatalog, side: Direction, kind: SideKind) -> bool {
        catalog
            .open_sides(self.type_id, kind)
            .has(side.rotated_back(self.rotation))
    }

    pub fn effective_sides(&self, catalog: &TileCatalog, kind: SideKind) -> Sides {
        catalog.open_sides(self.type_id, kind).rotated(self.rotation)
    }
}

/// How a level file names a tile: a bare type id, or `[type id, rotation]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileRef {
    Bare(usize),
    Rotated(usize, i64),
}

impl TileRef {
    pub fn resolve(self) -> PlacedTile {
        match self {
            TileRef::Bare(type_id) => PlacedTile::new(type_id, 0),
            TileRef::Rotated(type_id, rotation) => PlacedTile::new(type_id, rotation),
        }
    }
}
