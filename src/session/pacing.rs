//! Tick pacing. The only places the session is allowed to sleep.

use std::thread;
use std::time::{Duration, Instant};

pub trait Pacer {
    /// Block until the next tick boundary at `ticks_per_second`.
    fn tick(&mut self, ticks_per_second: u32);

    /// Block for a fixed time.
    fn pause(&mut self, duration: Duration);
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn tick(&mut self, ticks_per_second: u32) {
        (**self).tick(ticks_per_second)
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// Wall-clock pacing. A tick sleeps only for what is left of the tick
/// budget since the previous one, so drawing time is absorbed.
#[derive(Debug, Default)]
pub struct RealPacer {
    last_tick: Option<Instant>,
}

impl RealPacer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pacer for RealPacer {
    fn tick(&mut self, ticks_per_second: u32) {
        let budget = Duration::from_secs(1) / ticks_per_second.max(1);
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            if let Some(remaining) = budget.checked_sub(now.duration_since(last)) {
                thread::sleep(remaining);
            }
        }
        self.last_tick = Some(Instant::now());
    }

    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Never sleeps. For headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn tick(&mut self, _ticks_per_second: u32) {}

    fn pause(&mut self, _duration: Duration) {}
}
