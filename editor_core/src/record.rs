//! A single buffer cache entry.

use crate::buffer::TextBuffer;
use crate::decoration::{Decoration, Diagnostic};
use crate::language::ContentKind;
use crate::version::{BufferHandle, VersionStamp};
use crate::workspace::DocumentId;

/// One live buffer: its text, the path it was created for, its version and
/// the last analysis results applied to it.
///
/// The path is fixed for the lifetime of the record. A rename produces a new
/// record with a new [`BufferHandle`].
#[derive(Debug)]
pub struct BufferRecord {
    document: DocumentId,
    path: String,
    kind: ContentKind,
    handle: BufferHandle,
    buffer: TextBuffer,
    version: VersionStamp,
    decorations: Vec<Decoration>,
    /// Version the decorations were computed against.
    decorated_at: Option<VersionStamp>,
    diagnostics: Vec<Diagnostic>,
}

impl BufferRecord {
    pub(crate) fn new(document: DocumentId, path: String, content: &str, handle: BufferHandle) -> Self {
        Self {
            document,
            kind: ContentKind::from_path(&path),
            path,
            handle,
            buffer: TextBuffer::from_str(content),
            version: VersionStamp::initial(handle),
            decorations: Vec::new(),
            decorated_at: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn version(&self) -> VersionStamp {
        self.version
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Decorations that still describe the current text, if any.
    pub fn current_decorations(&self) -> Option<&[Decoration]> {
        (self.decorated_at == Some(self.version)).then_some(self.decorations.as_slice())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Replaces the text and advances the version.
    pub fn set_content(&mut self, content: &str) -> VersionStamp {
        self.buffer.replace_all(content);
        self.version = self.version.next();
        self.version
    }

    /// Replaces the decoration set wholesale.
    pub(crate) fn replace_decorations(&mut self, decorations: Vec<Decoration>, at: VersionStamp) {
        self.decorations = decorations;
        self.decorated_at = Some(at);
    }

    /// Replaces the diagnostic set, dropping markers outside the buffer.
    /// Returns the number of markers kept.
    pub(crate) fn replace_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) -> usize {
        let line_count = self.buffer.len_lines();
        let before = diagnostics.len();
        self.diagnostics = diagnostics
            .into_iter()
            .filter(|d| d.is_within(line_count))
            .collect();
        if self.diagnostics.len() < before {
            log::debug!(
                "{}: suppressed {} markers outside 1..={}",
                self.document,
                before - self.diagnostics.len(),
                line_count
            );
        }
        self.diagnostics.len()
    }
}
