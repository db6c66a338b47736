//! Animation state machine.
//!
//! Turns one movement decision into a sequence of frames. The session
//! drives it with a fixed loop: check `is_complete`, draw `frame`, and if
//! not complete wait for the next tick and `advance`. A completed frame is
//! still drawn once, so a right turn shows sub-frames 0, 1, 2 and 3.

use crate::types::{Direction, PixelPos, Position};

/// Pixels travelled per tick when walking.
pub const STEP_PX: i32 = 8;
/// Sub-frames in every player sprite strip.
pub const SUBFRAMES: u8 = 4;
/// Frames in the collision overlay strip.
pub const COLLISION_FRAMES: u8 = 4;

const BLOCKED_STEPS: u8 = 4;

/// Which sprite strip the player is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Walk cycle facing the direction.
    Walk(Direction),
    /// Rotation from the direction to its clockwise neighbour.
    Turn(Direction),
}

impl Activity {
    /// Row of the activity in an eight-strip player sheet.
    pub fn strip(self) -> usize {
        match self {
            Activity::Walk(direction) => direction.index() as usize,
            Activity::Turn(direction) => 4 + direction.index() as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Idle,
    /// Counter-clockwise turn ending up facing `to`.
    TurnLeft { to: Direction },
    /// Clockwise turn starting from `from`.
    TurnRight { from: Direction },
    Forward { target: Position },
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedPhase {
    Advance,
    Recoil,
    Settle,
}

/// Everything the renderer needs to draw the player for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub at: PixelPos,
    pub activity: Activity,
    pub subframe: u8,
    pub collision: Option<CollisionOverlay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionOverlay {
    pub at: PixelPos,
    pub frame: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Idle,
    TurnLeft,
    TurnRight,
    Forward {
        target: PixelPos,
    },
    Blocked {
        phase: BlockedPhase,
        steps: u8,
        settled: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Animation {
    motion: Motion,
    orientation: Direction,
    at: PixelPos,
    activity: Activity,
    subframe: u8,
    collision: Option<CollisionOverlay>,
}

impl Animation {
    /// Start an action for a player standing at `at` and facing
    /// `orientation`.
    pub fn start(action: Action, at: PixelPos, orientation: Direction, tile_size: u32) -> Self {
        let (motion, activity, subframe) = match action {
            Action::Idle => (Motion::Idle, Activity::Walk(orientation), 0),
            Action::TurnLeft { to } => (Motion::TurnLeft, Activity::Turn(to), SUBFRAMES - 1),
            Action::TurnRight { from } => (Motion::TurnRight, Activity::Turn(from), 0),
            Action::Forward { target } => (
                Motion::Forward {
                    target: PixelPos::of_cell(target, tile_size),
                },
                Activity::Walk(orientation),
                0,
            ),
            Action::Blocked => (
                Motion::Blocked {
                    phase: BlockedPhase::Advance,
                    steps: 0,
                    settled: false,
                },
                Activity::Walk(orientation),
                0,
            ),
        };
        Self {
            motion,
            orientation,
            at,
            activity,
            subframe,
            collision: None,
        }
    }

    pub fn frame(&self) -> AnimationFrame {
        AnimationFrame {
            at: self.at,
            activity: self.activity,
            subframe: self.subframe,
            collision: self.collision,
        }
    }

    pub fn blocked_phase(&self) -> Option<BlockedPhase> {
        match self.motion {
            Motion::Blocked { phase, .. } => Some(phase),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.motion == Motion::Idle
    }

    pub fn is_complete(&self) -> bool {
        match self.motion {
            Motion::Idle => true,
            Motion::TurnLeft => self.subframe == 0,
            Motion::TurnRight => self.subframe == SUBFRAMES - 1,
            Motion::Forward { target } => self.at == target && self.subframe == 0,
            Motion::Blocked {
                phase, settled, ..
            } => phase == BlockedPhase::Settle && settled && self.subframe == 0,
        }
    }

    /// Move one tick forward. Does nothing once complete.
    pub fn advance(&mut self) {
        if self.is_complete() {
            return;
        }
        match &mut self.motion {
            Motion::Idle => {}
            Motion::TurnLeft => self.subframe -= 1,
            Motion::TurnRight => self.subframe += 1,
            Motion::Forward { target } => {
                self.subframe = (self.subframe + 1) % SUBFRAMES;
                // the last step stops on the target when the tile size is
                // not a multiple of the step
                let step = self.at.distance(*target).min(STEP_PX as i64) as i32;
                self.at = self.at.offset(self.orientation, step);
            }
            Motion::Blocked {
                phase,
                steps,
                settled,
            } => {
                self.subframe = (self.subframe + 1) % SUBFRAMES;
                match phase {
                    BlockedPhase::Advance => {
                        *steps += 1;
                        self.at = self.at.offset(self.orientation, STEP_PX);
                        if *steps == BLOCKED_STEPS {
                            *phase = BlockedPhase::Recoil;
                            *steps = 0;
                            self.collision = Some(CollisionOverlay {
                                at: self.at,
                                frame: 0,
                            });
                        }
                    }
                    BlockedPhase::Recoil => {
                        *steps += 1;
                        self.at = self.at.offset(self.orientation, -STEP_PX);
                        self.collision = self.collision.and_then(|overlay| {
                            let frame = overlay.frame + 1;
                            (frame < COLLISION_FRAMES)
                                .then_some(CollisionOverlay { frame, ..overlay })
                        });
                        if *steps == BLOCKED_STEPS {
                            *phase = BlockedPhase::Settle;
                            *steps = 0;
                        }
                    }
                    BlockedPhase::Settle => *settled = true,
                }
            }
        }
    }
}

/// Run an animation to completion and collect every frame that gets drawn.
pub fn frames(mut animation: Animation) -> Vec<AnimationFrame> {
    let mut frames = Vec::new();
    loop {
        let done = animation.is_complete();
        frames.push(animation.frame());
        if done {
            return frames;
        }
        animation.advance();
    }
}
