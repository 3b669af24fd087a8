//! Content kind detection.
//!
//! Decides from a logical path what kind of document a buffer holds and
//! whether background analysis applies to it.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kinds of content a buffer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    Json,
    Css,
    Html,
    Markdown,
    #[default]
    PlainText,
}

impl ContentKind {
    /// Detects the content kind from a logical path based on its extension.
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::PlainText)
    }

    /// Detects the content kind from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyw" | "pyi" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx" | "h++" => Self::Cpp,
            "json" | "jsonc" | "json5" => Self::Json,
            "css" | "scss" | "sass" | "less" => Self::Css,
            "html" | "htm" | "vue" => Self::Html,
            "md" | "markdown" => Self::Markdown,
            _ => Self::PlainText,
        }
    }

    /// Returns the display name of the content kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Json => "JSON",
            Self::Css => "CSS",
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
            Self::PlainText => "Plain Text",
        }
    }

    /// Returns whether tokenization and linting run for this kind.
    ///
    /// Only program source is analyzed. Data, style sheets, markup and
    /// prose are exempt.
    pub fn is_analyzable(&self) -> bool {
        matches!(
            self,
            Self::Rust | Self::Python | Self::JavaScript | Self::TypeScript | Self::C | Self::Cpp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(ContentKind::from_extension("rs"), ContentKind::Rust);
        assert_eq!(ContentKind::from_extension("RS"), ContentKind::Rust);
        assert_eq!(ContentKind::from_extension("tsx"), ContentKind::TypeScript);
        assert_eq!(ContentKind::from_extension("scss"), ContentKind::Css);
        assert_eq!(ContentKind::from_extension("txt"), ContentKind::PlainText);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(ContentKind::from_path("/src/index.js"), ContentKind::JavaScript);
        assert_eq!(ContentKind::from_path("/styles.css"), ContentKind::Css);
        assert_eq!(ContentKind::from_path("/README.md"), ContentKind::Markdown);
        assert_eq!(ContentKind::from_path("/Makefile"), ContentKind::PlainText);
    }

    #[test]
    fn test_only_source_is_analyzable() {
        assert!(ContentKind::JavaScript.is_analyzable());
        assert!(ContentKind::Rust.is_analyzable());
        assert!(!ContentKind::Css.is_analyzable());
        assert!(!ContentKind::Html.is_analyzable());
        assert!(!ContentKind::Markdown.is_analyzable());
        assert!(!ContentKind::Json.is_analyzable());
        assert!(!ContentKind::PlainText.is_analyzable());
    }
}
