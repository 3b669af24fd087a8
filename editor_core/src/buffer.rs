//! Text buffer implementation using ropey.

use crate::surface::Position;
use ropey::Rope;

/// A text buffer backed by a rope data structure.
///
/// Owned by exactly one buffer record; the record bumps its version on every
/// mutation that goes through it.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Creates a text buffer from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Returns the total number of lines in the buffer.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Replaces the whole content of the buffer.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Returns the nearest position inside the buffer.
    pub fn clamp_position(&self, pos: Position) -> Position {
        let last_line = self.len_lines().saturating_sub(1);
        let line = pos.line.min(last_line);
        Position::new(line, pos.col.min(self.line_len_chars(line)))
    }

    /// Returns the length of a line in characters (excluding newline).
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let line_slice = self.rope.line(line);
        let len = line_slice.len_chars();
        if len > 0 && line_slice.char(len - 1) == '\n' {
            return len - 1;
        }
        len
    }

    /// Returns the entire buffer as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Returns true if the buffer holds exactly `text`.
    pub fn eq_str(&self, text: &str) -> bool {
        self.rope == text
    }
}
