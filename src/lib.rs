//! Planes, a tile-based maze walker for the terminal.
//!
//! A level is a grid of rotated tile types, each open or closed on every
//! side for entering and for leaving. The player walks the grid one cell at
//! a time, turning in quarter steps, and every move is animated tick by
//! tick before the call that caused it returns.

pub mod config;
pub mod engine;
pub mod menubar;
pub mod renderer;
pub mod session;
pub mod types;
