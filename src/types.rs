//! Shared boundary types for the Planes maze simulator.
//!
//! This module defines the vocabulary every layer agrees on:
//! - grid geometry (`Direction`, `Position`, `PixelPos`) used by the engine
//!   and the session controller
//! - terminal style primitives (`Style`, `Cell`, `DrawOp`) used by the
//!   renderer when it rasterizes a scene

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid geometry
// ---------------------------------------------------------------------------

/// One of the four sides of a tile, and the way the player faces.
///
/// Serialized as its integer index (0 = up, 1 = right, 2 = down, 3 = left),
/// which is how level files encode orientations and open sides. Defaults to
/// up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Wraps any integer onto the direction cycle.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(4) as usize]
    }

    pub fn clockwise(self) -> Self {
        Self::from_index(self.index() as i64 + 1)
    }

    pub fn counter_clockwise(self) -> Self {
        Self::from_index(self.index() as i64 - 1)
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() as i64 + 2)
    }

    /// Undo a clockwise rotation of `rotation` quarter turns.
    pub fn rotated_back(self, rotation: u8) -> Self {
        Self::from_index(4 + self.index() as i64 - rotation as i64)
    }

    /// Grid delta of one step in this direction (y grows downwards).
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDirection(pub u8);

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "direction must be 0..=3, got {}", self.0)
    }
}

impl std::error::Error for InvalidDirection {}

impl TryFrom<u8> for Direction {
    type Error = InvalidDirection;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=3 => Ok(Self::ALL[value as usize]),
            other => Err(InvalidDirection(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction.index()
    }
}

/// A grid cell: `x` selects the column within a row, `y` selects the row.
///
/// Level files write positions as `[x, y]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `direction`, or `None` when that would
    /// leave the non-negative quadrant.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Self { x, y })
    }
}

impl From<[usize; 2]> for Position {
    fn from([x, y]: [usize; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [usize; 2] {
    fn from(position: Position) -> Self {
        [position.x, position.y]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Pixel-space coordinate of a sprite's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of a cell. Saturates for cells too far out to
    /// address, which can only be off the grid anyway.
    pub fn of_cell(position: Position, tile_size: u32) -> Self {
        let scale = |v: usize| {
            let px = i64::try_from(v)
                .unwrap_or(i64::MAX)
                .saturating_mul(i64::from(tile_size));
            px.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Self {
            x: scale(position.x),
            y: scale(position.y),
        }
    }

    /// Move `distance` pixels in `direction`.
    pub fn offset(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add((dx as i32).saturating_mul(distance)),
            y: self.y.saturating_add((dy as i32).saturating_mul(distance)),
        }
    }

    /// Manhattan distance in pixels.
    pub fn distance(self, other: PixelPos) -> i64 {
        (i64::from(self.x) - i64::from(other.x)).abs()
            + (i64::from(self.y) - i64::from(other.y)).abs()
    }
}

// ---------------------------------------------------------------------------
// Terminal style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub fn fg(color: NamedColor) -> Self {
        Style {
            fg: Some(Color::Named(color)),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// A single character placed on the terminal canvas. Higher `z_order`
/// paints over lower.
#[derive(Debug, Clone)]
pub struct DrawOp {
    pub x: u16,
    pub y: u16,
    pub ch: char,
    pub style: Style,
    pub z_order: i32,
}
