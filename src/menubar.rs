//! The one-line key hint bar above the board.
//!
//! Hints are written as plain strings with the keys in brackets, e.g.
//! `"[q][Esc] quit"`. Keys print bold, the rest dim.

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

/// A run of hint text, either a bracketed key or the words around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Text(&'a str),
}

/// Split a hint into key and text runs. An unclosed `[` is kept as text.
pub fn segments(item: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = item;
    while let Some(open) = rest.find('[') {
        let Some(len) = rest[open..].find(']') else {
            break;
        };
        if open > 0 {
            out.push(Segment::Text(&rest[..open]));
        }
        out.push(Segment::Key(&rest[open..=open + len]));
        rest = &rest[open + len + 1..];
    }
    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

pub fn hints(goal_reached: bool) -> &'static [&'static str] {
    if goal_reached {
        &["[←↑→↓] walk on", "[q][Esc] quit"]
    } else {
        &["[←↑→↓] walk", "[q][Esc] quit"]
    }
}

/// Redraw the bar on terminal row `row`.
pub fn render<W: Write>(out: &mut W, row: u16, items: &[&str]) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, row),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        for segment in segments(item) {
            let (attribute, text) = match segment {
                Segment::Key(text) => (style::Attribute::Bold, text),
                Segment::Text(text) => (style::Attribute::Dim, text),
            };
            queue!(
                out,
                style::SetAttribute(attribute),
                style::Print(text),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
    }
    Ok(())
}
