//! Headless stand-ins for the UI collaborators.

use sandpit_core::{
    BufferHandle, ContentKind, Decoration, DocumentId, EditSurface, FormatOptions, Formatter,
    Position, SaveSink,
};
use std::fs;
use std::path::PathBuf;

/// A surface with no pixels: it keeps the bound text and logs every call.
#[derive(Debug, Default)]
pub struct LoggingSurface {
    bound: Option<BufferHandle>,
    text: String,
    position: Position,
    decorations: Vec<Decoration>,
}

impl LoggingSurface {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }
}

impl EditSurface for LoggingSurface {
    fn bind(&mut self, handle: BufferHandle, text: &str) {
        log::debug!("surface: bind {} ({} chars)", handle, text.chars().count());
        self.bound = Some(handle);
        self.text = text.to_string();
        self.position = Position::default();
        self.decorations.clear();
    }

    fn unbind(&mut self) {
        if let Some(handle) = self.bound.take() {
            log::debug!("surface: unbind {}", handle);
        }
        self.text.clear();
        self.decorations.clear();
    }

    fn bound(&self) -> Option<BufferHandle> {
        self.bound
    }

    fn current_position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    fn replace_full_content(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_decorations(&mut self, handle: BufferHandle, decorations: &[Decoration]) {
        if self.bound != Some(handle) {
            log::warn!("surface: decorations for unbound {} ignored", handle);
            return;
        }
        self.decorations = decorations.to_vec();
    }
}

/// Strips trailing whitespace and normalizes indentation and the final
/// newline.
pub struct WhitespaceFormatter;

impl Formatter for WhitespaceFormatter {
    fn format(&self, content: &str, _kind: ContentKind, options: &FormatOptions) -> Result<String, String> {
        let indent = if options.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(options.tab_width)
        };

        let mut out = String::with_capacity(content.len());
        for line in content.lines() {
            let line = line.trim_end();
            let body = line.trim_start_matches('\t');
            let tabs = line.len() - body.len();
            for _ in 0..tabs {
                out.push_str(&indent);
            }
            out.push_str(body);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Writes saved documents under a directory, mirroring their logical path.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SaveSink for DirectorySink {
    fn save(&mut self, document: &DocumentId, path: &str, text: &str) -> Result<(), String> {
        let target = self.root.join(path.trim_start_matches('/'));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(&target, text).map_err(|e| e.to_string())?;
        log::info!("Saved {} to {}", document, target.display());
        Ok(())
    }
}
