//! Drives `Session` end to end with a recording renderer, scripted input and
//! a pacer that only counts.

use std::collections::VecDeque;
use std::io;
use std::io::Write;
use std::iter;
use std::time::Duration;

use planes::config::Settings;
use planes::engine::animation::AnimationFrame;
use planes::engine::level::LevelDefinition;
use planes::renderer::{Renderer, Scene};
use planes::session::{
    InputEvent, InputSource, Instruction, NoInput, Pacer, ScriptedInput, Session, SessionError,
    SessionPhase, parse_script,
};
use planes::types::{Direction, Position};

#[derive(Debug, Default)]
struct Recorder {
    captions: Vec<String>,
    frames: Vec<AnimationFrame>,
}

impl Renderer for Recorder {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        self.captions.push(scene.caption.to_string());
        self.frames.push(scene.player);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CountingPacer {
    ticks: Vec<u32>,
    pauses: Vec<Duration>,
}

impl Pacer for CountingPacer {
    fn tick(&mut self, ticks_per_second: u32) {
        self.ticks.push(ticks_per_second);
    }

    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

/// Hands out one batch per poll, then quits.
struct Batches(VecDeque<Vec<InputEvent>>);

impl Batches {
    fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        Self(batches.into())
    }
}

impl InputSource for Batches {
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        Ok(self.0.pop_front().unwrap_or_else(|| vec![InputEvent::Quit]))
    }
}

fn session<I: InputSource>(input: I) -> Session<Recorder, I, CountingPacer> {
    Session::new(
        Settings::default(),
        Recorder::default(),
        input,
        CountingPacer::default(),
    )
}

fn drawn<I: InputSource>(session: &Session<Recorder, I, CountingPacer>) -> usize {
    session.renderer().frames.len()
}

/// Rock everywhere except one open cell in the corner.
const ROCK_LEVEL: &str = r#"{
    "name": "rock",
    "tileTypes": [{}, {"openIn": [0, 1, 2, 3], "openOut": [0, 1, 2, 3]}],
    "tileImages": "tiles.png",
    "tiles": [[0, 0], [0, 1]],
    "player": {"img": "sprite.png", "position": [1, 1], "orientation": 0},
    "goal": {"img": "goal.png", "position": [0, 0]},
    "collision": {"img": "collision.png"}
}"#;

/// From the start of "level 1" to the goal.
const LEVEL_ONE_ROUTE: &str = "
# along the top corridor
ddd
# zig-zag down
s aaa
s ddd
s aaa
s ddd
";

#[test]
fn unknown_level_loads_the_default_anyway() {
    let mut session = session(NoInput);

    assert!(!session.load_level("nonexistent").unwrap());
    assert!(session.is_loaded());
    assert_eq!(session.level_name(), Some("level 1"));
    assert_eq!(session.caption(), Some("Planes: nonexistent"));

    session.turn_left().unwrap();
    assert!(session.move_forward().unwrap());
    assert_eq!(session.player_position(), Some(Position::new(2, 1)));
    assert!(session
        .renderer()
        .captions
        .iter()
        .all(|caption| caption == "Planes: nonexistent"));
}

#[test]
fn second_load_is_rejected_without_change() {
    let mut session = session(NoInput);
    assert!(session.load_level("level 1").unwrap());
    session.turn_left().unwrap();
    let frames = drawn(&session);

    assert!(!session.load_level("level 1").unwrap());
    let rock = LevelDefinition::from_json(ROCK_LEVEL).unwrap();
    assert!(!session.load_custom_level(&rock).unwrap());

    assert_eq!(session.level_name(), Some("level 1"));
    assert_eq!(session.player_orientation(), Some(Direction::Right));
    assert_eq!(drawn(&session), frames);
}

#[test]
fn commands_need_a_level() {
    let mut session = session(NoInput);
    assert_eq!(session.phase(), SessionPhase::Unloaded);

    assert!(matches!(session.turn_left(), Err(SessionError::NoLevelLoaded)));
    assert!(matches!(session.move_forward(), Err(SessionError::NoLevelLoaded)));
    assert!(matches!(
        session.can_pass(Direction::Up),
        Err(SessionError::NoLevelLoaded)
    ));
    assert!(matches!(session.operate(), Err(SessionError::NoLevelLoaded)));
    assert_eq!(drawn(&session), 0);
}

#[test]
fn each_action_draws_its_frame_count() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();
    assert_eq!(drawn(&session), 1);

    session.turn_right().unwrap();
    assert_eq!(drawn(&session), 1 + 4);

    session.turn_left().unwrap();
    assert_eq!(drawn(&session), 1 + 4 + 4);

    // facing down from the start tile: closed
    assert!(!session.move_forward().unwrap());
    assert_eq!(drawn(&session), 1 + 4 + 4 + 13);

    session.turn_left().unwrap();
    assert!(session.move_forward().unwrap());
    assert_eq!(drawn(&session), 1 + 4 + 4 + 13 + 4 + 9);

    // one tick between every pair of frames within an action
    assert_eq!(session.pacer().ticks.len(), 3 + 3 + 12 + 3 + 8);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[test]
fn blocked_bounce_returns_to_where_it_started() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();
    let before = drawn(&session);

    assert!(!session.move_forward().unwrap());
    let frames = &session.renderer().frames[before..];

    assert_eq!(frames.first().map(|f| f.at), frames.last().map(|f| f.at));
    assert_eq!(frames.last().map(|f| f.subframe), Some(0));
    assert_eq!(frames.iter().filter(|f| f.collision.is_some()).count(), 4);
    assert!(frames.last().is_some_and(|f| f.collision.is_none()));
    assert_eq!(session.player_position(), Some(Position::new(1, 1)));
}

#[test]
fn rock_blocks_every_way_out() {
    let mut session = session(NoInput);
    let rock = LevelDefinition::from_json(ROCK_LEVEL).unwrap();
    assert!(session.load_custom_level(&rock).unwrap());
    assert_eq!(session.caption(), Some("Planes: rock"));

    assert!(!session.can_pass(Direction::default()).unwrap());
    assert!(!session.can_pass(Direction::Left).unwrap());
    assert!(!session.can_pass(Direction::Right).unwrap());
    assert!(!session.can_pass(Direction::Down).unwrap());

    assert!(!session.move_forward().unwrap());
    assert_eq!(session.player_position(), Some(Position::new(1, 1)));
    assert_eq!(drawn(&session), 1 + 13);
}

#[test]
fn move_forward_agrees_with_can_pass() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();

    for instruction in parse_script("lffffrfflf") {
        match instruction {
            Instruction::TurnLeft => session.turn_left().unwrap(),
            Instruction::TurnRight => session.turn_right().unwrap(),
            _ => {
                let before = session.player_position().unwrap();
                let facing = session.player_orientation().unwrap();
                let expected = session.can_pass(facing).unwrap();
                assert_eq!(session.move_forward().unwrap(), expected);
                let after = session.player_position().unwrap();
                if expected {
                    assert_eq!(Some(after), before.step(facing));
                } else {
                    assert_eq!(after, before);
                }
            }
        }
    }
}

#[test]
fn route_reaches_the_goal_once() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();

    let report = session.run_script(&parse_script(LEVEL_ONE_ROUTE)).unwrap();
    assert_eq!(report.moves, 19);
    assert_eq!(report.blocked, 0);
    assert_eq!(report.position, Position::new(4, 5));
    assert_eq!(report.orientation, Direction::Right);
    assert!(report.goal_reached);

    // stepping off keeps the latch
    session.face(Direction::Left).unwrap();
    assert!(session.move_forward().unwrap());
    assert!(session.goal_reached());
}

#[test]
fn script_counts_blocked_moves() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();

    let report = session.run_script(&parse_script("s w d")).unwrap();
    assert_eq!(report.moves, 1);
    assert_eq!(report.blocked, 2);
    assert_eq!(report.position, Position::new(2, 1));
    assert!(!report.goal_reached);
}

#[test]
fn quit_aborts_an_animation_and_ends_the_session() {
    // one poll while loading, two frames into the turn, then quit
    let input = ScriptedInput::new(iter::repeat_n(InputEvent::Other, 3));
    let mut session = session(input);
    session.load_level("level 1").unwrap();

    assert!(matches!(session.turn_left(), Err(SessionError::Terminated)));
    assert_eq!(session.phase(), SessionPhase::Terminated);
    assert_eq!(session.player_orientation(), Some(Direction::Down));
    assert_eq!(drawn(&session), 1 + 2);

    assert!(matches!(session.move_forward(), Err(SessionError::Terminated)));
    assert!(matches!(session.wait(), Err(SessionError::Terminated)));
    assert_eq!(drawn(&session), 3);
}

#[test]
fn operate_walks_toward_the_pressed_arrow() {
    let events = iter::once(InputEvent::Other)
        .chain(iter::once(InputEvent::Move(Direction::Right)))
        // swallowed by the turn and the step
        .chain(iter::repeat_n(InputEvent::Other, 4 + 9));
    let mut session = session(ScriptedInput::new(events));
    session.load_level("level 1").unwrap();

    session.operate().unwrap();

    assert_eq!(session.phase(), SessionPhase::Terminated);
    assert_eq!(session.player_position(), Some(Position::new(2, 1)));
    assert_eq!(session.player_orientation(), Some(Direction::Right));
    assert_eq!(session.input().remaining(), 0);
}

#[test]
fn moves_pressed_during_an_animation_are_dropped() {
    let events = [
        InputEvent::Other,
        InputEvent::Move(Direction::Right),
        InputEvent::Move(Direction::Right),
        InputEvent::Move(Direction::Right),
    ];
    let mut session = session(ScriptedInput::new(events));
    session.load_level("level 1").unwrap();

    // the turn swallows the last two presses and then sees the quit
    session.operate().unwrap();
    assert_eq!(session.player_position(), Some(Position::new(1, 1)));
    assert_eq!(session.phase(), SessionPhase::Terminated);
}

#[test]
fn wait_backs_off_after_quiet_cycles() {
    let mut settings = Settings::default();
    settings.idle.active_cycles = 3;
    settings.idle.idle_animation_ms = 7;
    let quiet = vec![Vec::new(); 11];
    let mut session = Session::new(
        settings,
        Recorder::default(),
        Batches::new(quiet),
        CountingPacer::default(),
    );
    session.load_level("level 1").unwrap();

    session.wait().unwrap();

    let pauses = &session.pacer().pauses;
    let count = |ms| pauses.iter().filter(|d| **d == Duration::from_millis(ms)).count();
    assert_eq!(count(7), 1);
    assert_eq!(count(10), 8);
    assert_eq!(count(300), 2);
    assert_eq!(session.phase(), SessionPhase::Terminated);
}

#[test]
fn any_event_restarts_fast_polling() {
    let mut settings = Settings::default();
    settings.idle.active_cycles = 3;
    let mut batches = vec![Vec::new(); 4];
    batches.push(vec![InputEvent::Other]);
    batches.extend(vec![Vec::new(); 2]);
    let mut session = Session::new(
        settings,
        Recorder::default(),
        Batches::new(batches),
        CountingPacer::default(),
    );
    session.load_level("level 1").unwrap();

    let mut seen = Vec::new();
    session
        .wait_with(|_, events| {
            seen.extend_from_slice(events);
            Ok(())
        })
        .unwrap();

    let coarse = session
        .pacer()
        .pauses
        .iter()
        .filter(|d| **d == Duration::from_millis(300))
        .count();
    // the idle frame's pause, and no backoff since the event came early
    assert_eq!(coarse, 1);
    assert_eq!(seen, vec![InputEvent::Other, InputEvent::Quit]);
}

#[test]
fn out_of_range_speed_resets_at_the_next_animation() {
    let mut session = session(NoInput);
    session.load_level("level 1").unwrap();

    session.set_speed(10);
    session.turn_right().unwrap();
    assert!(session.pacer().ticks.iter().all(|rate| *rate == 50));

    session.set_speed(42);
    assert_eq!(session.speed(), 42);
    session.turn_right().unwrap();
    assert_eq!(session.speed(), 1);
    assert_eq!(session.pacer().ticks[3..], [5, 5, 5]);
}

#[test]
fn odd_tile_size_still_finishes_each_step() {
    let mut settings = Settings::default();
    settings.tile_size = 60;
    let mut session = Session::new(
        settings,
        Recorder::default(),
        NoInput,
        CountingPacer::default(),
    );
    session.load_level("level 1").unwrap();
    session.turn_left().unwrap();
    let before = drawn(&session);

    assert!(session.move_forward().unwrap());
    assert_eq!(drawn(&session) - before, 9);
    assert_eq!(session.player_position(), Some(Position::new(2, 1)));
    assert_eq!(
        session.renderer().frames.last().map(|f| f.at),
        Some(planes::types::PixelPos::new(120, 60))
    );
}

#[test]
fn start_far_off_the_grid_is_walled_in() {
    let json = ROCK_LEVEL.replace("[1, 1], \"orientation\"", "[100000000, 0], \"orientation\"");
    let definition = LevelDefinition::from_json(&json).unwrap();
    let mut session = session(NoInput);

    assert!(session.load_custom_level(&definition).unwrap());
    for direction in Direction::ALL {
        assert!(!session.can_pass(direction).unwrap());
    }
    assert!(!session.move_forward().unwrap());
    assert_eq!(session.player_position(), Some(Position::new(100_000_000, 0)));
}

#[test]
fn level_file_round_trip_through_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ROCK_LEVEL.as_bytes()).unwrap();

    let json = std::fs::read_to_string(file.path()).unwrap();
    let definition = LevelDefinition::from_json(&json).unwrap();
    let mut session = session(NoInput);

    assert!(session.load_custom_level(&definition).unwrap());
    assert_eq!(session.level_name(), Some("rock"));
    assert_eq!(session.player_orientation(), Some(Direction::Up));
}
