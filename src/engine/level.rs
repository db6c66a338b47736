//! Level definitions in the authored JSON format, and the built-in levels,
//! resolved into runtime `Level`s.
//!
//! Definitions are validated lazily: an unknown tile id is a closed tile and
//! a position off the grid simply has no tile, both discovered when a move
//! asks about them.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Position};

use super::grid::Grid;
use super::tiles::{Sides, TileCatalog, TileRef, TileType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub name: String,
    pub tile_types: Vec<TileTypeDefinition>,
    #[serde(default)]
    pub tile_images: String,
    pub tiles: Vec<Vec<TileRef>>,
    pub player: PlayerDefinition,
    pub goal: GoalDefinition,
    #[serde(default)]
    pub collision: CollisionDefinition,
}

/// Open sides of a tile type. Missing lists mean closed, so `{}` is rock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileTypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_in: Option<Vec<Direction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_out: Option<Vec<Direction>>,
}

impl TileTypeDefinition {
    fn open(open_in: &[Direction], open_out: &[Direction]) -> Self {
        Self {
            open_in: Some(open_in.to_vec()),
            open_out: Some(open_out.to_vec()),
        }
    }

    pub fn to_tile_type(&self) -> TileType {
        let sides = |list: &Option<Vec<Direction>>| -> Sides {
            list.iter().flatten().copied().collect()
        };
        TileType {
            open_in: sides(&self.open_in),
            open_out: sides(&self.open_out),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDefinition {
    #[serde(default)]
    pub img: String,
    pub position: Position,
    pub orientation: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDefinition {
    #[serde(default)]
    pub img: String,
    pub position: Position,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionDefinition {
    #[serde(default)]
    pub img: String,
}

impl LevelDefinition {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Image references of a level. Opaque to everything but a renderer that
/// decodes images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelAssets {
    pub tiles: String,
    pub player: String,
    pub goal: String,
    pub collision: String,
}

/// A level ready to play. Its structure never changes after loading.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub catalog: TileCatalog,
    pub grid: Grid,
    pub start: Position,
    pub start_orientation: Direction,
    pub goal: Position,
    pub assets: LevelAssets,
}

impl Level {
    pub fn from_definition(definition: &LevelDefinition) -> Self {
        let catalog = TileCatalog::new(
            definition
                .tile_types
                .iter()
                .map(TileTypeDefinition::to_tile_type)
                .collect(),
        );
        Self {
            name: definition.name.clone(),
            catalog,
            grid: Grid::from_refs(&definition.tiles),
            start: definition.player.position,
            start_orientation: definition.player.orientation,
            goal: definition.goal.position,
            assets: LevelAssets {
                tiles: definition.tile_images.clone(),
                player: definition.player.img.clone(),
                goal: definition.goal.img.clone(),
                collision: definition.collision.img.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in levels
// ---------------------------------------------------------------------------

pub const DEFAULT_LEVEL: &str = "level 1";

pub fn builtin_levels() -> Vec<LevelDefinition> {
    vec![level_one()]
}

pub fn find_builtin(name: &str) -> Option<LevelDefinition> {
    builtin_levels().into_iter().find(|level| level.name == name)
}

/// The level played when a requested one does not exist.
pub fn default_level() -> LevelDefinition {
    level_one()
}

fn level_one() -> LevelDefinition {
    use Direction::{Down, Left, Right, Up};
    use TileRef::{Bare as B, Rotated as R};

    LevelDefinition {
        name: DEFAULT_LEVEL.into(),
        tile_types: vec![
            TileTypeDefinition::default(),
            TileTypeDefinition::open(&[Up, Right, Down, Left], &[Up, Right, Down, Left]),
            TileTypeDefinition::open(&[Right, Down, Left], &[Right, Down, Left]),
            TileTypeDefinition::open(&[Down, Left], &[Down, Left]),
            TileTypeDefinition::open(&[Left], &[Left]),
            TileTypeDefinition::open(&[Right, Left], &[Right, Left]),
        ],
        tile_images: "tiles01.png".into(),
        tiles: vec![
            vec![B(0), B(0), B(0), B(0), B(0), B(0)],
            vec![B(0), R(4, 2), B(5), B(5), B(3), B(0)],
            vec![B(0), R(3, 3), B(5), B(5), R(3, 1), B(0)],
            vec![B(0), R(3, 2), B(5), B(5), B(3), B(0)],
            vec![B(0), R(3, 3), B(5), B(5), R(3, 1), B(0)],
            vec![B(0), R(3, 2), B(5), B(5), B(4), B(0)],
            vec![B(0), B(0), B(0), B(0), B(0), B(0)],
        ],
        player: PlayerDefinition {
            img: "sprite01.png".into(),
            position: Position::new(1, 1),
            orientation: Down,
        },
        goal: GoalDefinition {
            img: "treasure.png".into(),
            position: Position::new(4, 5),
        },
        collision: CollisionDefinition {
            img: "collision.png".into(),
        },
    }
}
