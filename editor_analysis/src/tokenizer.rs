//! Syntax tokenizer: turns a tree-sitter parse into decoration ranges.
//!
//! Every classified node yields one decoration per line it covers; its
//! children are not visited, so decorations never overlap.
//!
//! JSON is tokenized for library callers only; it is not analyzable content
//! as far as the dispatcher is concerned.

use crate::grammar::{self, char_col};
use sandpit_core::{ContentKind, Decoration, TokenClass};
use tree_sitter::{Node, TreeCursor};

/// Node kinds that map straight to a token class for one grammar.
struct Vocabulary {
    keywords: &'static [&'static str],
    control: &'static [&'static str],
    strings: &'static [&'static str],
    numbers: &'static [&'static str],
    comments: &'static [&'static str],
    types: &'static [&'static str],
    constants: &'static [&'static str],
    attributes: &'static [&'static str],
    /// Parents whose `name` field names a function or class.
    definitions: &'static [&'static str],
    /// Parents whose `function` field is the callee.
    calls: &'static [&'static str],
}

const RUST: Vocabulary = Vocabulary {
    keywords: &[
        "fn", "let", "mut", "const", "static", "pub", "mod", "use", "crate", "self", "super",
        "impl", "trait", "struct", "enum", "type", "where", "async", "await", "dyn", "extern",
        "ref", "unsafe", "as", "in", "move",
    ],
    control: &[
        "if", "else", "match", "for", "while", "loop", "break", "continue", "return", "yield",
    ],
    strings: &["string_literal", "raw_string_literal"],
    numbers: &["integer_literal", "float_literal"],
    comments: &["line_comment", "block_comment"],
    types: &["type_identifier", "primitive_type"],
    constants: &[],
    attributes: &["attribute_item", "inner_attribute_item"],
    definitions: &["function_item", "function_signature_item"],
    calls: &["call_expression"],
};

const PYTHON: Vocabulary = Vocabulary {
    keywords: &[
        "def", "class", "import", "from", "as", "global", "nonlocal", "lambda", "with", "assert",
        "del", "pass", "raise", "except", "finally", "try", "async", "await",
    ],
    control: &[
        "if", "elif", "else", "for", "while", "break", "continue", "return", "yield", "in", "not",
        "and", "or", "is",
    ],
    strings: &["string"],
    numbers: &["integer", "float"],
    comments: &["comment"],
    types: &["type"],
    constants: &["none"],
    attributes: &["decorator"],
    definitions: &["function_definition", "class_definition"],
    calls: &["call"],
};

const ECMASCRIPT: Vocabulary = Vocabulary {
    keywords: &[
        "function", "const", "let", "var", "class", "extends", "import", "export", "default",
        "from", "as", "new", "this", "super", "static", "get", "set", "async", "await", "typeof",
        "instanceof", "void", "delete", "in", "of", "type", "interface", "enum", "namespace",
        "module", "declare", "readonly", "abstract", "implements", "private", "protected",
        "public",
    ],
    control: &[
        "if", "else", "for", "while", "do", "switch", "case", "break", "continue", "return",
        "throw", "try", "catch", "finally", "yield",
    ],
    strings: &["string", "template_string", "regex"],
    numbers: &["number"],
    comments: &["comment"],
    types: &["type_identifier", "predefined_type"],
    constants: &["null", "undefined"],
    attributes: &["decorator"],
    definitions: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
        "class_declaration",
    ],
    calls: &["call_expression"],
};

const C_FAMILY: Vocabulary = Vocabulary {
    keywords: &[
        "auto", "const", "default", "enum", "extern", "inline", "register", "restrict",
        "signed", "sizeof", "static", "struct", "typedef", "union", "unsigned", "void",
        "volatile", "class", "namespace", "template", "typename", "virtual", "override", "final",
        "public", "private", "protected", "friend", "new", "delete", "this", "using",
        "constexpr", "noexcept", "decltype", "explicit", "mutable", "operator",
    ],
    control: &[
        "if", "else", "for", "while", "do", "switch", "case", "break", "continue", "return",
        "goto", "throw", "try", "catch",
    ],
    strings: &["string_literal", "char_literal", "raw_string_literal", "system_lib_string"],
    numbers: &["number_literal"],
    comments: &["comment"],
    types: &["type_identifier", "primitive_type", "sized_type_specifier"],
    constants: &["null", "nullptr"],
    attributes: &[
        "#include", "#define", "#ifdef", "#ifndef", "#if", "#else", "#elif", "#endif",
        "preproc_directive",
    ],
    definitions: &[],
    calls: &["call_expression"],
};

const JSON: Vocabulary = Vocabulary {
    keywords: &[],
    control: &[],
    strings: &["string"],
    numbers: &["number"],
    comments: &["comment"],
    types: &[],
    constants: &["null"],
    attributes: &[],
    definitions: &[],
    calls: &[],
};

fn vocabulary(kind: ContentKind) -> Option<&'static Vocabulary> {
    match kind {
        ContentKind::Rust => Some(&RUST),
        ContentKind::Python => Some(&PYTHON),
        ContentKind::JavaScript | ContentKind::TypeScript => Some(&ECMASCRIPT),
        ContentKind::C | ContentKind::Cpp => Some(&C_FAMILY),
        ContentKind::Json => Some(&JSON),
        ContentKind::Css | ContentKind::Html | ContentKind::Markdown | ContentKind::PlainText => {
            None
        }
    }
}

/// Tokenizes `source` as `kind`. Kinds without a grammar yield nothing.
pub fn tokenize(source: &str, kind: ContentKind) -> Vec<Decoration> {
    let Some(vocab) = vocabulary(kind) else {
        return Vec::new();
    };
    let Some(tree) = grammar::parse(source, kind) else {
        return Vec::new();
    };

    let lines: Vec<&str> = source.split('\n').collect();
    let mut decorations = Vec::new();
    let mut cursor = tree.walk();
    walk(&mut cursor, vocab, kind, &lines, &mut decorations);
    decorations
}

fn walk(
    cursor: &mut TreeCursor,
    vocab: &Vocabulary,
    kind: ContentKind,
    lines: &[&str],
    out: &mut Vec<Decoration>,
) {
    loop {
        let node = cursor.node();
        match classify(&node, vocab, kind) {
            Some(class) => push_spans(&node, class, lines, out),
            None => {
                if cursor.goto_first_child() {
                    walk(cursor, vocab, kind, lines, out);
                    cursor.goto_parent();
                }
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn classify(node: &Node, vocab: &Vocabulary, kind: ContentKind) -> Option<TokenClass> {
    let name = node.kind();

    if !node.is_named() {
        if vocab.control.contains(&name) {
            return Some(TokenClass::ControlFlow);
        }
        if vocab.keywords.contains(&name) {
            return Some(TokenClass::Keyword);
        }
    }

    if matches!(name, "true" | "false" | "boolean_literal") {
        return Some(TokenClass::Boolean);
    }
    if vocab.strings.contains(&name) {
        return Some(string_class(node, kind));
    }
    if vocab.numbers.contains(&name) {
        return Some(TokenClass::Number);
    }
    if vocab.comments.contains(&name) {
        return Some(TokenClass::Comment);
    }
    if vocab.types.contains(&name) {
        return Some(TokenClass::Type);
    }
    if vocab.constants.contains(&name) {
        return Some(TokenClass::Constant);
    }
    if vocab.attributes.contains(&name) {
        return Some(TokenClass::Attribute);
    }

    match name {
        "char_literal" if kind == ContentKind::Rust => Some(TokenClass::Char),
        "lifetime" => Some(TokenClass::Lifetime),
        "identifier" | "property_identifier" | "field_identifier" => identifier_role(node, vocab),
        _ => None,
    }
}

/// JSON object keys read as names rather than strings.
fn string_class(node: &Node, kind: ContentKind) -> TokenClass {
    if kind == ContentKind::Json {
        if let Some(parent) = node.parent() {
            if parent.kind() == "pair" && parent.child_by_field_name("key") == Some(*node) {
                return TokenClass::Variable;
            }
        }
    }
    TokenClass::String
}

fn identifier_role(node: &Node, vocab: &Vocabulary) -> Option<TokenClass> {
    let parent = node.parent()?;
    let parent_kind = parent.kind();

    if parent_kind == "macro_invocation" {
        return Some(TokenClass::Macro);
    }
    if vocab.definitions.contains(&parent_kind)
        && parent.child_by_field_name("name") == Some(*node)
    {
        return Some(TokenClass::Function);
    }
    // C declares functions through a declarator instead of a name field.
    if parent_kind == "function_declarator"
        && parent.child_by_field_name("declarator") == Some(*node)
    {
        return Some(TokenClass::Function);
    }
    if vocab.calls.contains(&parent_kind)
        && parent.child_by_field_name("function") == Some(*node)
    {
        return Some(TokenClass::Function);
    }
    None
}

/// Splits a node into one decoration per covered line.
fn push_spans(node: &Node, class: TokenClass, lines: &[&str], out: &mut Vec<Decoration>) {
    let start = node.start_position();
    let end = node.end_position();

    for row in start.row..=end.row {
        let Some(line) = lines.get(row) else {
            break;
        };
        let from = if row == start.row { start.column } else { 0 };
        let to = if row == end.row { end.column } else { line.len() };

        let (start_col, end_col) = (char_col(line, from), char_col(line, to));
        if start_col < end_col {
            out.push(Decoration::new(row, start_col, end_col, class));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(decorations: &[Decoration], line: usize, start: usize, end: usize, class: TokenClass) -> bool {
        decorations.contains(&Decoration::new(line, start, end, class))
    }

    #[test]
    fn test_rust_tokens() {
        let d = tokenize("fn main() {\n    let x = 42; // hi\n}", ContentKind::Rust);
        assert!(has(&d, 0, 0, 2, TokenClass::Keyword));
        assert!(has(&d, 0, 3, 7, TokenClass::Function));
        assert!(has(&d, 1, 4, 7, TokenClass::Keyword));
        assert!(has(&d, 1, 12, 14, TokenClass::Number));
        assert!(d
            .iter()
            .any(|t| t.line == 1 && t.start_col == 16 && t.class == TokenClass::Comment));
    }

    #[test]
    fn test_columns_count_characters() {
        let d = tokenize("fn f() { let s = \"é\"; }", ContentKind::Rust);
        assert!(has(&d, 0, 17, 20, TokenClass::String));
    }

    #[test]
    fn test_multiline_comment_split_per_line() {
        let d = tokenize("/* a\nb */\nlet x;", ContentKind::JavaScript);
        assert!(has(&d, 0, 0, 4, TokenClass::Comment));
        assert!(has(&d, 1, 0, 4, TokenClass::Comment));
        assert!(has(&d, 2, 0, 3, TokenClass::Keyword));
    }

    #[test]
    fn test_python_tokens() {
        let d = tokenize("def f():\n    return None", ContentKind::Python);
        assert!(has(&d, 0, 0, 3, TokenClass::Keyword));
        assert!(has(&d, 0, 4, 5, TokenClass::Function));
        assert!(has(&d, 1, 4, 10, TokenClass::ControlFlow));
        assert!(has(&d, 1, 11, 15, TokenClass::Constant));
    }

    #[test]
    fn test_json_keys_are_variables() {
        let d = tokenize("{\"a\": 1}", ContentKind::Json);
        assert!(has(&d, 0, 1, 4, TokenClass::Variable));
        assert!(has(&d, 0, 6, 7, TokenClass::Number));
    }

    #[test]
    fn test_decorations_do_not_overlap() {
        let d = tokenize("const s = `a ${b} c`; call(\"x\");", ContentKind::JavaScript);
        for (i, a) in d.iter().enumerate() {
            for b in &d[i + 1..] {
                if a.line == b.line {
                    assert!(a.end_col <= b.start_col || b.end_col <= a.start_col, "{:?} {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        assert!(tokenize("fn main() {}", ContentKind::PlainText).is_empty());
        assert!(tokenize("body { color: red }", ContentKind::Css).is_empty());
    }
}
