//! Interfaces of the collaborators around the core: the visible editing
//! surface, the formatting service and the save sink.

use crate::decoration::Decoration;
use crate::language::ContentKind;
use crate::version::BufferHandle;
use crate::workspace::DocumentId;

/// A cursor position on the surface as (line, column).
/// Both are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// The visible editing widget.
///
/// The surface shows at most one buffer at a time. The controller is the
/// only caller; it guarantees `unbind` is called before the bound buffer is
/// released.
pub trait EditSurface {
    /// Shows the buffer identified by `handle`, holding `text`.
    fn bind(&mut self, handle: BufferHandle, text: &str);

    /// Detaches the surface from its buffer.
    fn unbind(&mut self);

    /// Returns the handle of the bound buffer, if any.
    fn bound(&self) -> Option<BufferHandle>;

    fn current_position(&self) -> Position;

    fn set_position(&mut self, pos: Position);

    /// Rewrites the whole content of the bound buffer programmatically.
    fn replace_full_content(&mut self, text: &str);

    /// Replaces the inline decorations painted over the bound buffer.
    fn set_decorations(&mut self, handle: BufferHandle, decorations: &[Decoration]);
}

/// Options passed through to the formatting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub tab_width: usize,
    pub use_tabs: bool,
    pub print_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            use_tabs: false,
            print_width: 80,
        }
    }
}

/// Code formatting service, invoked on explicit user action only.
pub trait Formatter {
    fn format(
        &self,
        content: &str,
        kind: ContentKind,
        options: &FormatOptions,
    ) -> Result<String, String>;
}

/// Receives the final text of a buffer when the user saves.
pub trait SaveSink {
    fn save(&mut self, document: &DocumentId, path: &str, text: &str) -> Result<(), String>;
}
