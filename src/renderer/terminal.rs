//! Terminal renderer.
//!
//! Rasterizes each scene onto a cell grid and writes only the cells that
//! changed since the previous tick. Pixel space maps onto the grid at
//! `TILE_COLS` x `TILE_ROWS` cells per tile.

use std::io::{self, Write};

use crossterm::{cursor, execute, queue, style, terminal};

use crate::engine::tiles::TileCatalog;
use crate::menubar;
use crate::types::{Cell, Color, DrawOp, NamedColor, PixelPos, Style};

use super::sprites::{self, SpriteSheet, TILE_COLS, TILE_ROWS};
use super::{Renderer, Scene};

/// Rows reserved above the board for the menu bar.
const BOARD_OFFSET: u16 = 1;

const Z_TILE: i32 = 0;
const Z_GOAL: i32 = 1;
const Z_PLAYER: i32 = 2;
const Z_COLLISION: i32 = 3;

pub struct TerminalRenderer {
    out: io::Stdout,
    player: SpriteSheet,
    collision: SpriteSheet,
    goal: SpriteSheet,
    tiles: Option<(TileCatalog, SpriteSheet)>,
    caption: String,
    prev_grid: Option<Vec<Vec<Cell>>>,
}

impl TerminalRenderer {
    /// Take over the terminal. It is restored when the renderer is dropped.
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;
        Ok(Self {
            out,
            player: sprites::player_sheet(),
            collision: sprites::collision_sheet(),
            goal: sprites::goal_sheet(),
            tiles: None,
            caption: String::new(),
            prev_grid: None,
        })
    }

    fn refresh_tiles(&mut self, catalog: &TileCatalog) {
        let stale = !matches!(&self.tiles, Some((cached, _)) if cached == catalog);
        if stale {
            self.tiles = Some((catalog.clone(), sprites::tile_sheet(catalog)));
        }
    }

    fn render_diff(&mut self, grid: &[Vec<Cell>]) -> io::Result<()> {
        for (y, row) in grid.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let unchanged = self
                    .prev_grid
                    .as_ref()
                    .and_then(|prev| prev.get(y)?.get(x))
                    .is_some_and(|prev| prev == cell);
                if unchanged {
                    continue;
                }
                let cs = to_content_style(&cell.style);
                queue!(
                    self.out,
                    cursor::MoveTo(x as u16, y as u16 + BOARD_OFFSET),
                    style::PrintStyledContent(style::StyledContent::new(cs, cell.ch)),
                )?;
            }
        }
        Ok(())
    }

    fn render_status(&mut self, scene: &Scene<'_>, board_rows: u16) -> io::Result<()> {
        let status = if scene.goal_reached {
            format!(" {} | treasure found! ", scene.caption)
        } else {
            format!(" {} | find the treasure ", scene.caption)
        };
        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);
        queue!(
            self.out,
            cursor::MoveTo(0, board_rows + BOARD_OFFSET),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        if self.caption != scene.caption {
            self.caption = scene.caption.to_string();
            self.prev_grid = None;
            execute!(
                self.out,
                terminal::SetTitle(&self.caption),
                terminal::Clear(terminal::ClearType::All),
            )?;
        }

        let width = scene.grid.width() as u16 * TILE_COLS;
        let height = scene.grid.height() as u16 * TILE_ROWS;

        self.refresh_tiles(scene.catalog);
        let mut ops = Vec::new();
        if let Some((_, tiles)) = &self.tiles {
            for (position, tile) in scene.grid.cells() {
                let at = PixelPos::of_cell(position, scene.tile_size);
                let (col, row) = to_cell(at, scene.tile_size);
                if let Some(sprite) = tiles.frame(tile.type_id, tile.rotation as usize) {
                    sprite.blit(&mut ops, col, row, Z_TILE, tiles.layout().transparent);
                }
            }
        }

        if !scene.goal_reached {
            if let Some(sprite) = self.goal.frame(0, 0) {
                let (col, row) = centered(scene.goal, scene.tile_size);
                sprite.blit(&mut ops, col, row, Z_GOAL, self.goal.layout().transparent);
            }
        }

        let player = scene.player;
        if let Some(sprite) = self
            .player
            .frame(player.activity.strip(), player.subframe as usize)
        {
            let (col, row) = centered(player.at, scene.tile_size);
            sprite.blit(&mut ops, col, row, Z_PLAYER, self.player.layout().transparent);
        }

        if let Some(overlay) = player.collision {
            if let Some(sprite) = self.collision.frame(0, overlay.frame as usize) {
                let (col, row) = centered(overlay.at, scene.tile_size);
                sprite.blit(&mut ops, col, row, Z_COLLISION, self.collision.layout().transparent);
            }
        }

        let grid = rasterize(&ops, width, height);
        menubar::render(&mut self.out, 0, menubar::hints(scene.goal_reached))?;
        self.render_diff(&grid)?;
        self.render_status(scene, height)?;
        self.out.flush()?;
        self.prev_grid = Some(grid);
        Ok(())
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Top-left cell of a tile-sized area at pixel position `at`.
fn to_cell(at: PixelPos, tile_size: u32) -> (i32, i32) {
    let size = i64::from(tile_size.max(1));
    let scale = |px: i32, cells: u16| {
        let cell = (i64::from(px) * i64::from(cells)).div_euclid(size);
        cell.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    };
    (scale(at.x, TILE_COLS), scale(at.y, TILE_ROWS))
}

/// Centre cell of a tile-sized area at pixel position `at`.
fn centered(at: PixelPos, tile_size: u32) -> (i32, i32) {
    let (col, row) = to_cell(at, tile_size);
    (
        col.saturating_add(TILE_COLS as i32 / 2),
        row.saturating_add(TILE_ROWS as i32 / 2),
    )
}

/// Paint draw ops onto a fixed-size cell grid, higher z-order on top.
fn rasterize(ops: &[DrawOp], width: u16, height: u16) -> Vec<Vec<Cell>> {
    let w = width as usize;
    let h = height as usize;
    let mut grid = vec![vec![Cell::default(); w]; h];

    let mut ops: Vec<_> = ops.iter().collect();
    ops.sort_by_key(|op| op.z_order);

    for op in ops {
        let x = op.x as usize;
        let y = op.y as usize;
        if x < w && y < h {
            grid[y][x] = Cell {
                ch: op.ch,
                style: op.style.clone(),
            };
        }
    }

    grid
}

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_map_to_cells_per_tile() {
        assert_eq!(to_cell(PixelPos::new(64, 128), 64), (7, 6));
        assert_eq!(to_cell(PixelPos::new(32, 0), 64), (3, 0));
        assert_eq!(to_cell(PixelPos::new(-8, 0), 64), (-1, 0));
        assert_eq!(centered(PixelPos::new(0, 0), 64), (3, 1));
        assert_eq!(
            centered(PixelPos::new(i32::MAX, 0), 64),
            (234_881_026, 1)
        );
        assert_eq!(centered(PixelPos::new(0, 0), 0), (3, 1));
    }

    #[test]
    fn rasterize_paints_higher_z_last() {
        let ops = vec![
            DrawOp {
                x: 1,
                y: 0,
                ch: '@',
                style: Style::default(),
                z_order: 2,
            },
            DrawOp {
                x: 1,
                y: 0,
                ch: '.',
                style: Style::default(),
                z_order: 0,
            },
            DrawOp {
                x: 9,
                y: 9,
                ch: 'x',
                style: Style::default(),
                z_order: 0,
            },
        ];
        let grid = rasterize(&ops, 3, 1);
        assert_eq!(grid[0][1].ch, '@');
        assert_eq!(grid[0][0].ch, ' ');
    }
}
