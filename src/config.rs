//! Session settings, read from `~/.config/planes/config.json` with
//! environment overrides.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::engine::animation::STEP_PX;

pub const DEFAULT_TILE_SIZE: u32 = 64;
pub const MIN_SPEED: i32 = 1;
pub const MAX_SPEED: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Animation speed, 1 (slow) to 10 (fast). Out-of-range values are
    /// reset to 1 when an animation starts.
    #[serde(default = "default_speed")]
    pub speed: i32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default)]
    pub idle: IdleSettings,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

fn default_speed() -> i32 { MIN_SPEED }
fn default_tile_size() -> u32 { DEFAULT_TILE_SIZE }

impl Default for Settings {
    fn default() -> Self {
        Settings {
            speed: default_speed(),
            tile_size: default_tile_size(),
            idle: IdleSettings::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}

/// Polling cadence of the input loop, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleSettings {
    /// Sleep between polls while events keep arriving.
    pub fast_poll_ms: u64,
    /// Sleep taken once `active_cycles` polls in a row saw nothing.
    pub idle_poll_ms: u64,
    pub active_cycles: u32,
    /// Pause after drawing an idle frame.
    pub idle_animation_ms: u64,
}

impl Default for IdleSettings {
    fn default() -> Self {
        IdleSettings {
            fast_poll_ms: 10,
            idle_poll_ms: 300,
            active_cycles: 100,
            idle_animation_ms: 300,
        }
    }
}

impl IdleSettings {
    pub fn policy(&self) -> IdlePolicy {
        IdlePolicy {
            fast_poll: Duration::from_millis(self.fast_poll_ms),
            idle_poll: Duration::from_millis(self.idle_poll_ms),
            active_cycles: self.active_cycles,
        }
    }
}

/// Fast-poll for `active_cycles` quiet cycles, then take one coarse sleep.
/// Any event restarts the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdlePolicy {
    pub fast_poll: Duration,
    pub idle_poll: Duration,
    pub active_cycles: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    pub up: String,
    pub right: String,
    pub down: String,
    pub left: String,
    pub quit: String,
    #[serde(default = "default_quit_alt")]
    pub quit_alt: String,
}

fn default_quit_alt() -> String { "Esc".into() }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            up: "Up".into(),
            right: "Right".into(),
            down: "Down".into(),
            left: "Left".into(),
            quit: "q".into(),
            quit_alt: default_quit_alt(),
        }
    }
}

impl Settings {
    /// Load the user's settings. Never fails: a missing file yields the
    /// defaults and an invalid one is reported and ignored.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&Self::config_path());
        settings.apply_env();
        settings
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(mut settings) => {
                    settings.tile_size = tile_size_or_nearest(settings.tile_size);
                    settings
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "invalid settings ({e}), using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Environment variables:
    /// - `PLANES_SPEED` - animation speed (1-10)
    /// - `PLANES_TILE_SIZE` - tile size in pixels
    pub fn apply_env(&mut self) {
        if let Some(speed) = read_env::<i32>("PLANES_SPEED") {
            self.speed = speed;
        }
        if let Some(tile_size) = read_env::<u32>("PLANES_TILE_SIZE") {
            self.tile_size = tile_size_or_nearest(tile_size);
        }
    }

    fn config_path() -> PathBuf {
        let home = env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("planes");
        path.push("config.json");
        path
    }
}

pub fn speed_in_range(speed: i32) -> bool {
    (MIN_SPEED..=MAX_SPEED).contains(&speed)
}

/// Tile sizes are whole walking steps. Anything else is rounded to the
/// nearest positive multiple of `STEP_PX`.
pub fn tile_size_or_nearest(tile_size: u32) -> u32 {
    let step = STEP_PX as u32;
    let rounded = (tile_size.saturating_add(step / 2) / step).max(1) * step;
    if rounded != tile_size {
        tracing::warn!(tile_size, rounded, "tile size must be a multiple of {step}");
    }
    rounded
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Check whether a crossterm `KeyEvent` matches a binding string from the
/// settings ("Up", "Esc", "Ctrl-c", "F1", "q", ...).
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(ch) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return match ch.chars().next() {
            Some(c) => event.code == KeyCode::Char(c),
            None => false,
        };
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        s => {
            if let Some(rest) = s.strip_prefix('F') {
                if let Ok(n) = rest.parse::<u8>() {
                    return event.code == KeyCode::F(n);
                }
            }
            match s.chars().next() {
                Some(c) => event.code == KeyCode::Char(c),
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_and_ctrl_bindings() {
        assert!(matches_binding("Up", &key(KeyCode::Up, KeyModifiers::NONE)));
        assert!(matches_binding("q", &key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!matches_binding("q", &key(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!matches_binding("Ctrl-c", &key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(matches_binding("F2", &key(KeyCode::F(2), KeyModifiers::NONE)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json"));
        assert_eq!(settings.speed, 1);
        assert_eq!(settings.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(settings.idle.active_cycles, 100);
    }

    #[test]
    fn tile_size_rounds_to_whole_steps() {
        assert_eq!(tile_size_or_nearest(64), 64);
        assert_eq!(tile_size_or_nearest(60), 64);
        assert_eq!(tile_size_or_nearest(59), 56);
        assert_eq!(tile_size_or_nearest(1), 8);
        assert_eq!(tile_size_or_nearest(0), 8);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tile_size": 0}"#).unwrap();
        assert_eq!(Settings::load_from(&path).tile_size, 8);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "speed": 7,
            "idle": {
                "fast_poll_ms": 1,
                "idle_poll_ms": 50,
                "active_cycles": 3,
                "idle_animation_ms": 0
            }
        }"#;
        std::fs::write(&path, json).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.speed, 7);
        assert_eq!(settings.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(settings.idle.policy().active_cycles, 3);
        assert_eq!(settings.key_bindings.quit, "q");
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ speed: fast").unwrap();
        assert_eq!(Settings::load_from(&path).speed, 1);
    }

    #[test]
    fn speed_range() {
        assert!(speed_in_range(1));
        assert!(speed_in_range(10));
        assert!(!speed_in_range(0));
        assert!(!speed_in_range(11));
    }
}
