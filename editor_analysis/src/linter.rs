//! Linter: syntax errors from the parse tree plus a few line rules.
//!
//! Markers use 1-based lines and columns.

use crate::grammar::{self, char_col};
use sandpit_core::{ContentKind, Diagnostic, LintOptions, Severity};
use tree_sitter::{Node, TreeCursor};

const SYNTAX: &str = "syntax";
const TRAILING_WHITESPACE: &str = "trailing-whitespace";
const MAX_LINE_LENGTH: &str = "max-line-length";

/// Lints `source` as `kind`. Kinds without a grammar only get line rules.
pub fn lint(source: &str, kind: ContentKind, options: &LintOptions) -> Vec<Diagnostic> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut diagnostics = Vec::new();

    if let Some(tree) = grammar::parse(source, kind) {
        let root = tree.root_node();
        if root.has_error() {
            let mut cursor = root.walk();
            syntax_errors(&mut cursor, source, &lines, &mut diagnostics);
        }
    }
    line_rules(&lines, options, &mut diagnostics);

    diagnostics.sort_by_key(|d| (d.start_line, d.start_col));
    diagnostics
}

fn syntax_errors(cursor: &mut TreeCursor, source: &str, lines: &[&str], out: &mut Vec<Diagnostic>) {
    loop {
        let node = cursor.node();
        if node.is_missing() {
            out.push(marker(&node, lines, format!("Missing {}", node.kind())));
        } else if node.is_error() {
            out.push(marker(&node, lines, unexpected(&node, source)));
        } else if node.has_error() && cursor.goto_first_child() {
            syntax_errors(cursor, source, lines, out);
            cursor.goto_parent();
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn unexpected(node: &Node, source: &str) -> String {
    let text = source.get(node.byte_range()).unwrap_or_default();
    let first = text.lines().next().unwrap_or_default().trim();
    if first.is_empty() {
        return "Syntax error".to_string();
    }
    let snippet: String = first.chars().take(20).collect();
    format!("Unexpected `{}`", snippet)
}

fn marker(node: &Node, lines: &[&str], message: String) -> Diagnostic {
    let start = node.start_position();
    let end = node.end_position();
    let col = |row: usize, byte: usize| lines.get(row).map_or(byte, |line| char_col(line, byte));

    let start_col = col(start.row, start.column) + 1;
    let mut end_col = col(end.row, end.column) + 1;
    if end.row == start.row && end_col <= start_col {
        end_col = start_col + 1;
    }
    Diagnostic::new(start.row + 1, start_col, end.row + 1, end_col, Severity::Error, message)
        .with_source(SYNTAX)
}

fn line_rules(lines: &[&str], options: &LintOptions, out: &mut Vec<Diagnostic>) {
    for (row, raw) in lines.iter().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let number = row + 1;
        let width = line.chars().count();

        if options.trailing_whitespace {
            let kept = line.trim_end().chars().count();
            if kept < width {
                out.push(
                    Diagnostic::new(number, kept + 1, number, width + 1, Severity::Warning, "Trailing whitespace")
                        .with_source(TRAILING_WHITESPACE),
                );
            }
        }

        if let Some(max) = options.max_line_length {
            if width > max {
                out.push(
                    Diagnostic::new(
                        number,
                        max + 1,
                        number,
                        width + 1,
                        Severity::Warning,
                        format!("Line is {} characters long (max {})", width, max),
                    )
                    .with_source(MAX_LINE_LENGTH),
                );
            }
        }
    }
}
