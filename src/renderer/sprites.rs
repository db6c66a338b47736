//! Glyph sprite sheets.
//!
//! A sheet is a list of strips, each strip a list of equally sized frames,
//! addressed `[state][subframe]` the way an image sprite sheet is cut into
//! rows of frames. Cells equal to the layout's transparent key are skipped
//! when blitting.

use crate::engine::animation::{COLLISION_FRAMES, SUBFRAMES};
use crate::engine::tiles::{PlacedTile, SideKind, TileCatalog};
use crate::types::{Direction, DrawOp, NamedColor, Style};

/// Terminal cells covered by one tile.
pub const TILE_COLS: u16 = 7;
pub const TILE_ROWS: u16 = 3;

const TRANSPARENT: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    /// Frame width and height in cells.
    pub frame_size: (u16, u16),
    pub frame_count: usize,
    pub transparent: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    rows: Vec<Vec<char>>,
    style: Style,
}

impl Sprite {
    pub fn glyph(ch: char, style: Style) -> Self {
        Self {
            rows: vec![vec![ch]],
            style,
        }
    }

    pub fn from_rows(rows: Vec<Vec<char>>, style: Style) -> Self {
        Self { rows, style }
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Emit draw ops with the sprite's top-left cell at (`col`, `row`).
    /// Cells left of or above the canvas are dropped.
    pub fn blit(
        &self,
        ops: &mut Vec<DrawOp>,
        col: i32,
        row: i32,
        z_order: i32,
        transparent: Option<char>,
    ) {
        for (dy, line) in self.rows.iter().enumerate() {
            for (dx, &ch) in line.iter().enumerate() {
                if Some(ch) == transparent {
                    continue;
                }
                let x = col.saturating_add(dx as i32);
                let y = row.saturating_add(dy as i32);
                if x < 0 || y < 0 || x > u16::MAX as i32 || y > u16::MAX as i32 {
                    continue;
                }
                ops.push(DrawOp {
                    x: x as u16,
                    y: y as u16,
                    ch,
                    style: self.style.clone(),
                    z_order,
                });
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpriteSheet {
    layout: StripLayout,
    strips: Vec<Vec<Sprite>>,
}

impl SpriteSheet {
    /// Build a sheet from strips, each truncated or padded (by repeating its
    /// last frame) to the layout's frame count.
    pub fn from_strips(layout: StripLayout, strips: Vec<Vec<Sprite>>) -> Self {
        let strips = strips
            .into_iter()
            .map(|mut strip| {
                strip.truncate(layout.frame_count);
                while strip.len() < layout.frame_count {
                    match strip.last().cloned() {
                        Some(last) => strip.push(last),
                        None => break,
                    }
                }
                strip
            })
            .collect();
        Self { layout, strips }
    }

    pub fn layout(&self) -> StripLayout {
        self.layout
    }

    pub fn frame(&self, state: usize, subframe: usize) -> Option<&Sprite> {
        self.strips.get(state)?.get(subframe)
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::Up => '↑',
        Direction::Right => '→',
        Direction::Down => '↓',
        Direction::Left => '←',
    }
}

fn dashed_arrow(direction: Direction) -> char {
    match direction {
        Direction::Up => '⇡',
        Direction::Right => '⇢',
        Direction::Down => '⇣',
        Direction::Left => '⇠',
    }
}

/// Diagonal between `direction` and its clockwise neighbour.
fn diagonal(direction: Direction) -> char {
    match direction {
        Direction::Up => '↗',
        Direction::Right => '↘',
        Direction::Down => '↙',
        Direction::Left => '↖',
    }
}

/// Eight strips of four frames: walk cycles for strips 0-3, quarter turns
/// for strips 4-7, matching `Activity::strip`.
pub fn player_sheet() -> SpriteSheet {
    let style = Style::fg(NamedColor::Cyan).bold();
    let walk = Direction::ALL.into_iter().map(|d| {
        [arrow(d), dashed_arrow(d), arrow(d), dashed_arrow(d)]
            .into_iter()
            .map(|ch| Sprite::glyph(ch, style.clone()))
            .collect::<Vec<_>>()
    });
    let turn = Direction::ALL.into_iter().map(|d| {
        [arrow(d), diagonal(d), diagonal(d), arrow(d.clockwise())]
            .into_iter()
            .map(|ch| Sprite::glyph(ch, style.clone()))
            .collect::<Vec<_>>()
    });
    SpriteSheet::from_strips(
        StripLayout {
            frame_size: (1, 1),
            frame_count: SUBFRAMES as usize,
            transparent: Some(TRANSPARENT),
        },
        walk.chain(turn).collect(),
    )
}

pub fn collision_sheet() -> SpriteSheet {
    let style = Style::fg(NamedColor::Red).bold();
    let frames = ['✶', '✷', '✸', '·']
        .into_iter()
        .map(|ch| Sprite::glyph(ch, style.clone()))
        .collect();
    SpriteSheet::from_strips(
        StripLayout {
            frame_size: (1, 1),
            frame_count: COLLISION_FRAMES as usize,
            transparent: Some(TRANSPARENT),
        },
        vec![frames],
    )
}

pub fn goal_sheet() -> SpriteSheet {
    SpriteSheet::from_strips(
        StripLayout {
            frame_size: (1, 1),
            frame_count: 1,
            transparent: Some(TRANSPARENT),
        },
        vec![vec![Sprite::glyph('$', Style::fg(NamedColor::Yellow).bold())]],
    )
}

/// One strip per tile type, one frame per rotation.
pub fn tile_sheet(catalog: &TileCatalog) -> SpriteSheet {
    let strips = (0..catalog.len())
        .map(|type_id| {
            (0..4)
                .map(|rotation| tile_sprite(catalog, PlacedTile::new(type_id, rotation)))
                .collect()
        })
        .collect();
    SpriteSheet::from_strips(
        StripLayout {
            frame_size: (TILE_COLS, TILE_ROWS),
            frame_count: 4,
            transparent: None,
        },
        strips,
    )
}

/// Tile art. Open sides are gaps in the wall; a side open only one way
/// shows an arrow pointing in the direction of travel.
pub fn tile_sprite(catalog: &TileCatalog, tile: PlacedTile) -> Sprite {
    let open_in = tile.effective_sides(catalog, SideKind::In);
    let open_out = tile.effective_sides(catalog, SideKind::Out);
    let cols = TILE_COLS as usize;

    if open_in.is_empty() && open_out.is_empty() {
        return Sprite::from_rows(
            vec![vec!['▒'; cols]; TILE_ROWS as usize],
            Style::default().dim(),
        );
    }

    let marker = |side: Direction, wall: char| -> char {
        match (open_in.has(side), open_out.has(side)) {
            (true, true) => ' ',
            (true, false) => arrow(side.opposite()),
            (false, true) => arrow(side),
            (false, false) => wall,
        }
    };
    let edge = |side: Direction| -> char {
        if open_in.has(side) || open_out.has(side) { ' ' } else { '─' }
    };

    let mid = cols / 2;
    let mut top = vec![edge(Direction::Up); cols];
    let mut bottom = vec![edge(Direction::Down); cols];
    top[mid] = marker(Direction::Up, '─');
    bottom[mid] = marker(Direction::Down, '─');
    for row in [&mut top, &mut bottom] {
        row[0] = '+';
        row[cols - 1] = '+';
    }
    let mut middle = vec![' '; cols];
    middle[0] = marker(Direction::Left, '│');
    middle[cols - 1] = marker(Direction::Right, '│');

    Sprite::from_rows(vec![top, middle, bottom], Style::fg(NamedColor::Green))
}
