//! Input sources: raw events translated into session commands.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};

use crate::config::{KeyBindings, matches_binding};
use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A directional key went down.
    Move(Direction),
    /// The user asked to close the program.
    Quit,
    Other,
}

/// A source of discrete input events.
///
/// `poll` must not block: it returns whatever arrived since the previous
/// call, possibly nothing.
pub trait InputSource {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>>;
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        (**self).poll()
    }
}

/// Keyboard input from the terminal, mapped through the configured
/// bindings. Ctrl-c always quits, since raw mode swallows the signal.
pub struct TerminalInput {
    bindings: KeyBindings,
}

impl TerminalInput {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    fn translate(&self, event: Event) -> InputEvent {
        let Event::Key(key) = event else {
            return InputEvent::Other;
        };
        if key.kind != KeyEventKind::Press {
            return InputEvent::Other;
        }
        let b = &self.bindings;
        if matches_binding(&b.quit, &key)
            || matches_binding(&b.quit_alt, &key)
            || matches_binding("Ctrl-c", &key)
        {
            InputEvent::Quit
        } else if matches_binding(&b.up, &key) {
            InputEvent::Move(Direction::Up)
        } else if matches_binding(&b.right, &key) {
            InputEvent::Move(Direction::Right)
        } else if matches_binding(&b.down, &key) {
            InputEvent::Move(Direction::Down)
        } else if matches_binding(&b.left, &key) {
            InputEvent::Move(Direction::Left)
        } else {
            InputEvent::Other
        }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            events.push(self.translate(event));
        }
        Ok(events)
    }
}

/// Replays a fixed list of events, one per poll, then asks to quit.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
    quit_when_drained: bool,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = InputEvent>>(events: I) -> Self {
        Self {
            events: events.into_iter().collect(),
            quit_when_drained: true,
        }
    }

    /// Keep returning nothing once the script runs out instead of quitting.
    pub fn without_quit(mut self) -> Self {
        self.quit_when_drained = false;
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        match self.events.pop_front() {
            Some(event) => Ok(vec![event]),
            None if self.quit_when_drained => Ok(vec![InputEvent::Quit]),
            None => Ok(Vec::new()),
        }
    }
}

/// An input source that never produces anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        Ok(Vec::new())
    }
}
