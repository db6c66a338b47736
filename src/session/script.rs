//! Scripted instruction sequences.
//!
//! A script is plain text, one instruction per character:
//!
//! | char          | instruction                        |
//! |---------------|------------------------------------|
//! | `l`           | turn left                          |
//! | `r`           | turn right                         |
//! | `f`           | move forward                       |
//! | `w` / `^`     | face up, then move forward         |
//! | `d` / `>`     | face right, then move forward      |
//! | `s` / `v`     | face down, then move forward       |
//! | `a` / `<`     | face left, then move forward       |
//!
//! Whitespace is ignored, lines starting with `#` are comments.

use serde::Serialize;

use crate::types::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    TurnLeft,
    TurnRight,
    Forward,
    /// Turn to face the direction, then move forward.
    Face(Direction),
}

impl Instruction {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'l' => Some(Instruction::TurnLeft),
            'r' => Some(Instruction::TurnRight),
            'f' => Some(Instruction::Forward),
            'w' | '^' => Some(Instruction::Face(Direction::Up)),
            'd' | '>' => Some(Instruction::Face(Direction::Right)),
            's' | 'v' => Some(Instruction::Face(Direction::Down)),
            'a' | '<' => Some(Instruction::Face(Direction::Left)),
            _ => None,
        }
    }
}

pub fn parse_script(text: &str) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            match Instruction::from_char(c) {
                Some(instruction) => instructions.push(instruction),
                None => tracing::warn!("unknown instruction in script: {c:?}"),
            }
        }
    }
    instructions
}

/// Outcome of running a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub moves: u32,
    pub blocked: u32,
    pub position: Position,
    pub orientation: Direction,
    pub goal_reached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_characters_and_skips_comments() {
        let script = "# walk out of the start tile\nl f\nF>\n\n# done\nx";
        assert_eq!(
            parse_script(script),
            vec![
                Instruction::TurnLeft,
                Instruction::Forward,
                Instruction::Forward,
                Instruction::Face(Direction::Right),
            ]
        );
    }

    #[test]
    fn report_serializes_positions_as_pairs() {
        let report = ScriptReport {
            moves: 3,
            blocked: 1,
            position: Position::new(4, 1),
            orientation: Direction::Right,
            goal_reached: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["position"], serde_json::json!([4, 1]));
        assert_eq!(json["orientation"], serde_json::json!(1));
    }
}
