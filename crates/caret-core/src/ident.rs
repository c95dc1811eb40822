//! Identifier recognition and validation.
//!
//! Actions that mint or rename bindings validate names here; navigation and
//! context building use the word helpers to pull identifiers out of source
//! text without a parser.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CursorError, CursorResult};

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("static regex"))
}

fn declared_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:function|class|interface|enum|type|const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        )
        .expect("static regex")
    })
}

/// Check that a string is a usable identifier for generated bindings.
pub fn validate_identifier(name: &str) -> CursorResult<()> {
    if name.is_empty() {
        return Err(CursorError::invalid_identifier(name, "empty name"));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or(' ');
    if first.is_ascii_digit() {
        return Err(CursorError::invalid_identifier(
            name,
            "cannot start with digit",
        ));
    }
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(CursorError::invalid_identifier(
            name,
            "must start with a letter, underscore, or $",
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
    {
        return Err(CursorError::invalid_identifier(
            name,
            format!("contains invalid character '{}'", bad),
        ));
    }
    Ok(())
}

/// The declared name in a declaration-like snippet
/// (`function foo(...)`, `const x = ...`, `class Bar ...`).
pub fn declared_name(text: &str) -> Option<String> {
    declared_name_re()
        .captures(text)
        .map(|c| c[1].to_string())
}

/// First identifier-shaped token in a snippet.
pub fn first_identifier(text: &str) -> Option<String> {
    identifier_re().find(text).map(|m| m.as_str().to_string())
}

/// The identifier covering a 1-indexed column of a line, if any.
pub fn word_at_column(line: &str, column: u32) -> Option<String> {
    let col = column.max(1) as usize;
    // Column -> byte offset (columns count chars).
    let mut byte = line.len();
    for (n, (i, _)) in line.char_indices().enumerate() {
        if n + 1 == col {
            byte = i;
            break;
        }
    }
    for m in identifier_re().find_iter(line) {
        if m.start() <= byte && byte < m.end() {
            return Some(m.as_str().to_string());
        }
        // Also accept a cursor sitting immediately after the word.
        if byte == m.end() {
            return Some(m.as_str().to_string());
        }
    }
    None
}

/// Count whole-word occurrences of `word` in `text`.
pub fn count_word(text: &str, word: &str) -> usize {
    identifier_re()
        .find_iter(text)
        .filter(|m| m.as_str() == word)
        .count()
}

/// Replace whole-word occurrences of `word` in one line.
pub fn replace_word(line: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for m in identifier_re().find_iter(line) {
        out.push_str(&line[last..m.start()]);
        if m.as_str() == word {
            out.push_str(replacement);
        } else {
            out.push_str(m.as_str());
        }
        last = m.end();
    }
    out.push_str(&line[last..]);
    out
}

// ============================================================================
// Tests
// ============================================================================
