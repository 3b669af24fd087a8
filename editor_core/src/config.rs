//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiescence window applied to content-change dispatch.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Options forwarded to the lint worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintOptions {
    /// Warn about whitespace at the end of a line.
    pub trailing_whitespace: bool,
    /// Warn about lines longer than this many characters.
    pub max_line_length: Option<usize>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            trailing_whitespace: true,
            max_line_length: None,
        }
    }
}

/// Configuration of one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub debounce_ms: u64,
    /// When false, no analysis request is ever sent.
    pub analysis_enabled: bool,
    pub lint: LintOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            analysis_enabled: true,
            lint: LintOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
