//! Analysis payload types: syntax decorations and lint diagnostics.

use serde::{Deserialize, Serialize};

/// Syntax classes a tokenizer assigns to ranges of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// Keywords (fn, let, class, import, ...)
    Keyword,
    /// Control flow keywords (if, else, for, while, return, ...)
    ControlFlow,
    String,
    Char,
    Number,
    Boolean,
    /// Constants and null-like values
    Constant,
    Comment,
    Function,
    Type,
    /// Variables, properties and object keys
    Variable,
    /// Attributes, decorators and preprocessor directives
    Attribute,
    Macro,
    Lifetime,
}

/// An inline visual marker over a single-line range of text.
///
/// Lines and columns are 0-indexed; columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub class: TokenClass,
}

impl Decoration {
    pub fn new(line: usize, start_col: usize, end_col: usize, class: TokenClass) -> Self {
        Self {
            line,
            start_col,
            end_col,
            class,
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// A lint marker.
///
/// Lines are 1-indexed the way lint markers are reported; line 0 never
/// denotes a real line. Columns are 1-indexed as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub severity: Severity,
    pub message: String,
    /// Rule that produced the marker, e.g. `syntax`.
    #[serde(default)]
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn new(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            severity,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns true if the marker starts on a line that exists in a buffer
    /// of `line_count` lines. Markers failing this are suppressed.
    pub fn is_within(&self, line_count: usize) -> bool {
        self.start_line >= 1 && self.start_line <= line_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within() {
        let d = |line| Diagnostic::new(line, 1, line, 2, Severity::Error, "x");
        assert!(!d(0).is_within(3));
        assert!(d(1).is_within(3));
        assert!(d(3).is_within(3));
        assert!(!d(4).is_within(3));
    }

    #[test]
    fn test_payload_serializes_with_lowercase_tags() {
        let d = Diagnostic::new(1, 1, 1, 5, Severity::Warning, "trailing").with_source("style");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        let deco = Decoration::new(0, 0, 2, TokenClass::ControlFlow);
        let json = serde_json::to_string(&deco).unwrap();
        assert!(json.contains("\"class\":\"control_flow\""));
    }
}
