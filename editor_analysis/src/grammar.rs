//! Tree-sitter grammars for the content kinds the workers understand.
//!
//! The JSON grammar is only reached by calling [`crate::tokenizer::tokenize`]
//! or [`crate::linter::lint`] directly: the dispatcher never sends JSON
//! documents to the workers.

use sandpit_core::ContentKind;
use tree_sitter::{Parser, Tree};

/// Returns the tree-sitter grammar for `kind`, if one is bundled.
pub fn grammar(kind: ContentKind) -> Option<tree_sitter::Language> {
    match kind {
        ContentKind::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        ContentKind::Python => Some(tree_sitter_python::LANGUAGE.into()),
        ContentKind::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        ContentKind::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        ContentKind::C => Some(tree_sitter_c::LANGUAGE.into()),
        ContentKind::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
        ContentKind::Json => Some(tree_sitter_json::LANGUAGE.into()),
        ContentKind::Css | ContentKind::Html | ContentKind::Markdown | ContentKind::PlainText => {
            None
        }
    }
}

/// Parses `source` from scratch. Returns `None` when no grammar is bundled
/// for `kind` or the parser gives up.
pub fn parse(source: &str, kind: ContentKind) -> Option<Tree> {
    let language = grammar(kind)?;
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        log::warn!("Grammar for {} rejected: {}", kind.name(), e);
        return None;
    }
    parser.parse(source, None)
}

/// Converts a tree-sitter byte column on `line` to a character column.
pub(crate) fn char_col(line: &str, byte_col: usize) -> usize {
    match line.get(..byte_col) {
        Some(prefix) => prefix.chars().count(),
        None => line.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_analyzable_kind_has_grammar() {
        for kind in [
            ContentKind::Rust,
            ContentKind::Python,
            ContentKind::JavaScript,
            ContentKind::TypeScript,
            ContentKind::C,
            ContentKind::Cpp,
        ] {
            assert!(kind.is_analyzable());
            assert!(grammar(kind).is_some(), "{} has no grammar", kind.name());
        }
    }

    #[test]
    fn test_parse_without_grammar() {
        assert!(parse("body {}", ContentKind::Css).is_none());
        assert!(parse("fn main() {}", ContentKind::Rust).is_some());
    }

    #[test]
    fn test_char_col() {
        assert_eq!(char_col("héllo", 0), 0);
        assert_eq!(char_col("héllo", 3), 2);
        assert_eq!(char_col("abc", 10), 3);
    }
}
