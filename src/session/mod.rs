//! Session — the runtime controller.
//!
//! Owns the loaded level and the player, and is the only thing that mutates
//! them. Every command asks the engine whether it is legal, then runs the
//! matching animation on the tick loop before committing the result, so
//! `turn_left`, `turn_right` and `move_forward` return only once their
//! animation has finished.
//!
//! Everything runs on the caller's thread. The loop suspends only in the
//! `Pacer`, and input is polled before every frame so a quit request aborts
//! any animation or wait with `SessionError::Terminated`.

mod error;
pub mod input;
pub mod pacing;
pub mod script;

use std::time::Duration;

use crate::config::{MIN_SPEED, Settings, speed_in_range};
use crate::engine::animation::{Action, Animation, AnimationFrame};
use crate::engine::level::{self, Level, LevelDefinition};
use crate::engine::movement::{self, Movement};
use crate::renderer::{Renderer, Scene};
use crate::types::{Direction, PixelPos, Position};

pub use error::{SessionError, SessionResult};
pub use input::{InputEvent, InputSource, NoInput, ScriptedInput, TerminalInput};
pub use pacing::{NoopPacer, Pacer, RealPacer};
pub use script::{Instruction, ScriptReport, parse_script};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ticks per second for each step of speed.
const TICKS_PER_SPEED: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unloaded,
    Idle,
    Turning,
    Moving,
    Blocked,
    Terminated,
}

/// The level being played and where the player stands on it.
#[derive(Debug, Clone)]
struct Play {
    level: Level,
    caption: String,
    position: Position,
    orientation: Direction,
    goal_reached: bool,
}

pub struct Session<R, I, P> {
    settings: Settings,
    speed: i32,
    renderer: R,
    input: I,
    pacer: P,
    play: Option<Play>,
    phase: SessionPhase,
}

impl<R: Renderer, I: InputSource, P: Pacer> Session<R, I, P> {
    pub fn new(settings: Settings, renderer: R, input: I, pacer: P) -> Self {
        Self {
            speed: settings.speed,
            settings,
            renderer,
            input,
            pacer,
            play: None,
            phase: SessionPhase::Unloaded,
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load a built-in level by name.
    ///
    /// An unknown name still loads the default level and returns `false`.
    /// A session loads at most one level; later calls return `false` and
    /// change nothing.
    pub fn load_level(&mut self, name: &str) -> SessionResult<bool> {
        self.ensure_running()?;
        if self.play.is_some() {
            tracing::warn!(name, "a level is already loaded");
            return Ok(false);
        }
        let (definition, found) = match level::find_builtin(name) {
            Some(definition) => (definition, true),
            None => {
                tracing::warn!(name, "unknown level, loading {}", level::DEFAULT_LEVEL);
                (level::default_level(), false)
            }
        };
        self.start(&definition, name)?;
        Ok(found)
    }

    /// Load a user-authored level. Same one-shot rule as `load_level`.
    pub fn load_custom_level(&mut self, definition: &LevelDefinition) -> SessionResult<bool> {
        self.ensure_running()?;
        if self.play.is_some() {
            tracing::warn!(name = %definition.name, "a level is already loaded");
            return Ok(false);
        }
        self.start(definition, &definition.name)?;
        Ok(true)
    }

    fn start(&mut self, definition: &LevelDefinition, display_name: &str) -> SessionResult<()> {
        let level = Level::from_definition(definition);
        tracing::info!(
            level = %level.name,
            width = level.grid.width(),
            height = level.grid.height(),
            start = %level.start,
            goal = %level.goal,
            "level loaded"
        );
        self.play = Some(Play {
            caption: format!("Planes: {display_name}"),
            position: level.start,
            orientation: level.start_orientation,
            goal_reached: false,
            level,
        });
        self.phase = SessionPhase::Idle;
        self.animate(Action::Idle)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn turn_left(&mut self) -> SessionResult<()> {
        let to = movement::turn(self.play()?.orientation, false);
        self.phase = SessionPhase::Turning;
        self.animate(Action::TurnLeft { to })?;
        self.play_mut()?.orientation = to;
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    pub fn turn_right(&mut self) -> SessionResult<()> {
        let from = self.play()?.orientation;
        self.phase = SessionPhase::Turning;
        self.animate(Action::TurnRight { from })?;
        self.play_mut()?.orientation = movement::turn(from, true);
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    /// Step one cell ahead. Returns `false`, after playing the bounce, when
    /// the tiles or the edge of the grid block the way.
    pub fn move_forward(&mut self) -> SessionResult<bool> {
        let play = self.play()?;
        let movement = Movement::new(&play.level.catalog, &play.level.grid);
        let (from, facing) = (play.position, play.orientation);
        let target = movement
            .destination(from, facing)
            .filter(|_| movement.can_pass(from, facing));

        let Some(target) = target else {
            tracing::debug!(position = %from, %facing, "blocked");
            self.phase = SessionPhase::Blocked;
            self.animate(Action::Blocked)?;
            self.phase = SessionPhase::Idle;
            return Ok(false);
        };

        self.phase = SessionPhase::Moving;
        self.animate(Action::Forward { target })?;
        let play = self.play_mut()?;
        play.position = target;
        if !play.goal_reached && target == play.level.goal {
            play.goal_reached = true;
            tracing::info!(position = %target, "goal reached");
        }
        tracing::debug!(from = %from, to = %target, "moved");
        self.phase = SessionPhase::Idle;
        Ok(true)
    }

    /// Whether the player could move one cell in `direction` from where it
    /// stands. `Direction::default()` asks about up.
    pub fn can_pass(&self, direction: Direction) -> SessionResult<bool> {
        let play = self.play()?;
        Ok(Movement::new(&play.level.catalog, &play.level.grid).can_pass(play.position, direction))
    }

    /// Turn until facing `direction`, the short way round.
    pub fn face(&mut self, direction: Direction) -> SessionResult<()> {
        let (clockwise, count) = movement::turns_toward(self.play()?.orientation, direction);
        for _ in 0..count {
            if clockwise {
                self.turn_right()?;
            } else {
                self.turn_left()?;
            }
        }
        Ok(())
    }

    pub fn run_script(&mut self, instructions: &[Instruction]) -> SessionResult<ScriptReport> {
        let (mut moves, mut blocked) = (0, 0);
        for instruction in instructions {
            let moved = match instruction {
                Instruction::TurnLeft => {
                    self.turn_left()?;
                    continue;
                }
                Instruction::TurnRight => {
                    self.turn_right()?;
                    continue;
                }
                Instruction::Forward => self.move_forward()?,
                Instruction::Face(direction) => {
                    self.face(*direction)?;
                    self.move_forward()?
                }
            };
            if moved {
                moves += 1;
            } else {
                blocked += 1;
            }
        }
        let play = self.play()?;
        Ok(ScriptReport {
            moves,
            blocked,
            position: play.position,
            orientation: play.orientation,
            goal_reached: play.goal_reached,
        })
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Idle until the user quits.
    pub fn wait(&mut self) -> SessionResult<()> {
        self.wait_with(|_, _| Ok(()))
    }

    /// Poll input until the user quits, handing every batch of events to
    /// `handler` first. Returns `Ok(())` on quit; the session is then
    /// terminated.
    pub fn wait_with<F>(&mut self, mut handler: F) -> SessionResult<()>
    where
        F: FnMut(&mut Self, &[InputEvent]) -> SessionResult<()>,
    {
        self.ensure_running()?;
        match self.event_loop(&mut handler) {
            SessionError::Terminated => {
                self.terminate();
                Ok(())
            }
            error => Err(error),
        }
    }

    /// Walk with the arrow keys: face the pressed direction, then step.
    pub fn operate(&mut self) -> SessionResult<()> {
        self.play()?;
        self.wait_with(|session, events| {
            for event in events {
                match event {
                    InputEvent::Move(direction) => {
                        session.face(*direction)?;
                        session.move_forward()?;
                    }
                    InputEvent::Quit => break,
                    InputEvent::Other => {}
                }
            }
            Ok(())
        })
    }

    /// Runs until something ends the loop and returns what did.
    fn event_loop<F>(&mut self, handler: &mut F) -> SessionError
    where
        F: FnMut(&mut Self, &[InputEvent]) -> SessionResult<()>,
    {
        let policy = self.settings.idle.policy();
        let mut cycle = 0u32;
        loop {
            let events = match self.input.poll() {
                Ok(events) => events,
                Err(e) => return e.into(),
            };
            if let Err(e) = handler(self, &events) {
                return e;
            }
            if events.contains(&InputEvent::Quit) {
                return SessionError::Terminated;
            }
            if !events.is_empty() {
                cycle = 0;
            }
            cycle += 1;
            if cycle > policy.active_cycles {
                self.pacer.pause(policy.idle_poll);
                cycle = 0;
            } else {
                self.pacer.pause(policy.fast_poll);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Animation
    // -----------------------------------------------------------------------

    fn animate(&mut self, action: Action) -> SessionResult<()> {
        let rate = TICKS_PER_SPEED * self.effective_speed() as u32;
        let tile_size = self.settings.tile_size;
        let play = self.play()?;
        let mut animation = Animation::start(
            action,
            PixelPos::of_cell(play.position, tile_size),
            play.orientation,
            tile_size,
        );
        loop {
            let done = animation.is_complete();
            self.poll_for_quit()?;
            self.draw(animation.frame())?;
            if done {
                break;
            }
            self.pacer.tick(rate);
            animation.advance();
        }
        if animation.is_idle() {
            self.pacer
                .pause(Duration::from_millis(self.settings.idle.idle_animation_ms));
        }
        Ok(())
    }

    /// Anything other than a quit request is dropped while animating.
    fn poll_for_quit(&mut self) -> SessionResult<()> {
        let events = self.input.poll()?;
        if events.contains(&InputEvent::Quit) {
            self.terminate();
            return Err(SessionError::Terminated);
        }
        if !events.is_empty() {
            tracing::trace!(dropped = events.len(), "input ignored during animation");
        }
        Ok(())
    }

    fn draw(&mut self, player: AnimationFrame) -> SessionResult<()> {
        let play = self.play.as_ref().ok_or(SessionError::NoLevelLoaded)?;
        let tile_size = self.settings.tile_size;
        let scene = Scene {
            caption: &play.caption,
            catalog: &play.level.catalog,
            grid: &play.level.grid,
            goal: PixelPos::of_cell(play.level.goal, tile_size),
            player,
            tile_size,
            goal_reached: play.goal_reached,
        };
        self.renderer.draw(&scene)?;
        Ok(())
    }

    fn effective_speed(&mut self) -> i32 {
        if !speed_in_range(self.speed) {
            tracing::warn!(speed = self.speed, "speed out of range, reset to {MIN_SPEED}");
            self.speed = MIN_SPEED;
        }
        self.speed
    }

    fn terminate(&mut self) {
        if self.phase != SessionPhase::Terminated {
            tracing::info!("session terminated");
        }
        self.phase = SessionPhase::Terminated;
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    fn ensure_running(&self) -> SessionResult<()> {
        if self.phase == SessionPhase::Terminated {
            return Err(SessionError::Terminated);
        }
        Ok(())
    }

    fn play(&self) -> SessionResult<&Play> {
        self.ensure_running()?;
        self.play.as_ref().ok_or(SessionError::NoLevelLoaded)
    }

    fn play_mut(&mut self) -> SessionResult<&mut Play> {
        self.ensure_running()?;
        self.play.as_mut().ok_or(SessionError::NoLevelLoaded)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_loaded(&self) -> bool {
        self.play.is_some()
    }

    pub fn level_name(&self) -> Option<&str> {
        self.play.as_ref().map(|play| play.level.name.as_str())
    }

    pub fn caption(&self) -> Option<&str> {
        self.play.as_ref().map(|play| play.caption.as_str())
    }

    pub fn player_position(&self) -> Option<Position> {
        self.play.as_ref().map(|play| play.position)
    }

    pub fn player_orientation(&self) -> Option<Direction> {
        self.play.as_ref().map(|play| play.orientation)
    }

    /// Latches once the player first steps onto the goal.
    pub fn goal_reached(&self) -> bool {
        self.play.as_ref().is_some_and(|play| play.goal_reached)
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Takes effect from the next animation. Values outside 1..=10 are
    /// reset to 1 at that point.
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }
}
