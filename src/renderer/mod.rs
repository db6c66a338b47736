//! Renderer — draws one tick of the session.
//!
//! The session hands a `Scene` to a `Renderer` once per tick. A renderer
//! owns its assets and its output device; it never touches player or grid
//! state.

pub mod sprites;
pub mod terminal;

use std::io;

use crate::engine::animation::AnimationFrame;
use crate::engine::grid::Grid;
use crate::engine::tiles::TileCatalog;
use crate::types::PixelPos;

pub use terminal::TerminalRenderer;

/// Everything visible on one tick.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Window caption, `"Planes: <level name>"`.
    pub caption: &'a str,
    pub catalog: &'a TileCatalog,
    pub grid: &'a Grid,
    pub goal: PixelPos,
    pub player: AnimationFrame,
    pub tile_size: u32,
    pub goal_reached: bool,
}

pub trait Renderer {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        (**self).draw(scene)
    }
}

/// Renderer for runs without a terminal. Counts frames and traces them.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            x = scene.player.at.x,
            y = scene.player.at.y,
            strip = scene.player.activity.strip(),
            subframe = scene.player.subframe,
            collision = scene.player.collision.is_some(),
            "{}",
            scene.caption
        );
        Ok(())
    }
}
