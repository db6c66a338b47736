//! Engine — the pure core of the simulator.
//!
//! Decides what happens (which tiles connect, where a move lands) and how it
//! looks over time (the per-tick animation frames). The engine never sleeps,
//! draws, or reads input; the session controller owns all of that.

pub mod animation;
pub mod grid;
pub mod level;
pub mod movement;
pub mod tiles;

pub use animation::{Action, Activity, Animation, AnimationFrame, CollisionOverlay};
pub use grid::Grid;
pub use level::{Level, LevelDefinition};
pub use movement::Movement;
pub use tiles::{PlacedTile, SideKind, Sides, TileCatalog, TileRef, TileType};
