//! Transform patterns: generalizing one concrete edit into a reusable
//! template.
//!
//! The extractor diffs the before/after text of an edit at token level.
//! Tokens that differ only in spelling at structurally identical positions
//! (identifiers, literals) become placeholders; identical tokens stay
//! literal. Each placeholder records the minimum structural kind it may bind
//! to, and the whole pattern carries the structural kinds it is valid to
//! match against elsewhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CursorError, CursorResult};

// ============================================================================
// Transform Model
// ============================================================================

/// Minimum structural kind a placeholder may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingKind {
    /// A bare identifier.
    #[serde(rename = "identifier")]
    Identifier,
    /// A literal (string or number).
    #[serde(rename = "literal")]
    Literal,
    /// Any expression.
    #[serde(rename = "expression")]
    Expression,
    /// A type reference.
    #[serde(rename = "type-reference")]
    TypeReference,
}

/// Binding constraint for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderConstraint {
    /// Placeholder name (`$1`, `$2`, ...).
    pub placeholder: String,
    /// Minimum structural kind the placeholder binds to.
    pub kind: BindingKind,
}

/// A generalized, reusable code transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTransform {
    /// Template matched against candidate code.
    pub pattern: String,
    /// Template produced when the pattern applies.
    pub replacement: String,
    /// Binding constraints, one per placeholder.
    pub constraints: Vec<PlaceholderConstraint>,
    /// Structural kinds the pattern is valid to match against.
    pub applies_to: Vec<String>,
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Str,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            while i < bytes.len() {
                let c = bytes[i] as char;
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                start,
                end: i,
            });
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                start,
                end: i,
            });
        } else if c == '"' || c == '\'' || c == '`' {
            let quote = bytes[i];
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token {
                kind: TokenKind::Str,
                start,
                end: i,
            });
        } else {
            // Multi-byte characters land here too; consume the full char.
            let len = text[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            i += len;
            tokens.push(Token {
                kind: TokenKind::Punct,
                start,
                end: i,
            });
        }
    }
    tokens
}

fn token_text<'a>(text: &'a str, token: &Token) -> &'a str {
    &text[token.start..token.end]
}

// ============================================================================
// Generalization
// ============================================================================

fn binding_kind_for(kind: TokenKind) -> BindingKind {
    match kind {
        TokenKind::Ident => BindingKind::Identifier,
        TokenKind::Number | TokenKind::Str => BindingKind::Literal,
        TokenKind::Punct => BindingKind::Expression,
    }
}

/// Generalize a before/after edit pair into a transform.
///
/// When the token streams align structurally (same kinds in the same order),
/// spelling differences in identifiers and literals become shared
/// placeholders. When they do not align, the edit changed structure and the
/// texts are kept literally with no placeholders.
pub fn generalize(
    before: &str,
    after: &str,
    applies_to: Vec<String>,
) -> CursorResult<CodeTransform> {
    if before.trim().is_empty() {
        return Err(CursorError::PatternGenerationFailure {
            reason: "source span is empty".to_string(),
        });
    }

    let before_tokens = tokenize(before);
    let after_tokens = tokenize(after);

    let aligned = before_tokens.len() == after_tokens.len()
        && before_tokens.iter().zip(&after_tokens).all(|(b, a)| {
            b.kind == a.kind
                && (b.kind != TokenKind::Punct || token_text(before, b) == token_text(after, a))
        });

    if !aligned {
        return Ok(CodeTransform {
            pattern: before.to_string(),
            replacement: after.to_string(),
            constraints: Vec::new(),
            applies_to,
        });
    }

    // Assign one placeholder per distinct (before, after) spelling pair.
    let mut numbering: HashMap<(String, String), usize> = HashMap::new();
    let mut constraints: Vec<PlaceholderConstraint> = Vec::new();
    let mut pattern = String::new();
    let mut replacement = String::new();
    let mut before_pos = 0;
    let mut after_pos = 0;

    for (b, a) in before_tokens.iter().zip(&after_tokens) {
        pattern.push_str(&before[before_pos..b.start]);
        replacement.push_str(&after[after_pos..a.start]);
        let b_text = token_text(before, b);
        let a_text = token_text(after, a);
        if b_text == a_text {
            pattern.push_str(b_text);
            replacement.push_str(a_text);
        } else {
            let next = numbering.len() + 1;
            let n = *numbering
                .entry((b_text.to_string(), a_text.to_string()))
                .or_insert(next);
            let placeholder = format!("${}", n);
            if n == next {
                constraints.push(PlaceholderConstraint {
                    placeholder: placeholder.clone(),
                    kind: binding_kind_for(b.kind),
                });
            }
            pattern.push_str(&placeholder);
            replacement.push_str(&placeholder);
        }
        before_pos = b.end;
        after_pos = a.end;
    }
    pattern.push_str(&before[before_pos..]);
    replacement.push_str(&after[after_pos..]);

    Ok(CodeTransform {
        pattern,
        replacement,
        constraints,
        applies_to,
    })
}

/// A transform whose pattern and replacement are the same block: applying it
/// is a no-op, but it still matches structurally similar code.
pub fn no_op_template(block: &str, applies_to: Vec<String>) -> CodeTransform {
    CodeTransform {
        pattern: block.to_string(),
        replacement: block.to_string(),
        constraints: Vec::new(),
        applies_to,
    }
}

// ============================================================================
// Matching
// ============================================================================

impl CodeTransform {
    /// Match the pattern against concrete text.
    ///
    /// Returns placeholder bindings on success. Repeated occurrences of a
    /// placeholder must bind to identical text.
    pub fn match_against(&self, text: &str) -> Option<Vec<(String, String)>> {
        let (regex_src, groups) = self.pattern_regex()?;
        let re = regex::Regex::new(&regex_src).ok()?;
        let caps = re.captures(text)?;

        let mut bindings: Vec<(String, String)> = Vec::new();
        for (group_index, placeholder) in groups.iter().enumerate() {
            let bound = caps.get(group_index + 1)?.as_str();
            match bindings.iter().find(|(p, _)| p == placeholder) {
                Some((_, existing)) if existing != bound => return None,
                Some(_) => {}
                None => bindings.push((placeholder.clone(), bound.to_string())),
            }
        }
        Some(bindings)
    }

    /// Compile the pattern into regex source plus the placeholder for each
    /// capture group, in group order.
    fn pattern_regex(&self) -> Option<(String, Vec<String>)> {
        let mut src = String::new();
        let mut groups = Vec::new();
        // Edge whitespace is layout, not structure: do not require it.
        let mut rest = self.pattern.trim();

        while let Some(dollar) = rest.find('$') {
            let (literal, tail) = rest.split_at(dollar);
            push_literal(&mut src, literal);
            let digits: String = tail[1..].chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                // A lone `$` is literal text (identifiers may contain it).
                push_literal(&mut src, "$");
                rest = &tail[1..];
                continue;
            }
            let placeholder = format!("${}", digits);
            let kind = self
                .constraints
                .iter()
                .find(|c| c.placeholder == placeholder)
                .map(|c| c.kind)
                .unwrap_or(BindingKind::Expression);
            src.push_str(match kind {
                BindingKind::Identifier => r"([A-Za-z_$][A-Za-z0-9_$]*)",
                BindingKind::Literal => r#"("[^"]*"|'[^']*'|\d+(?:\.\d+)?)"#,
                BindingKind::Expression => r"(.+?)",
                BindingKind::TypeReference => r"([A-Za-z_$][A-Za-z0-9_$.<>\[\]]*)",
            });
            groups.push(placeholder);
            rest = &tail[1 + digits.len()..];
        }
        push_literal(&mut src, rest);
        Some((src, groups))
    }
}

/// Escape literal pattern text, treating whitespace runs as flexible.
fn push_literal(src: &mut String, literal: &str) {
    let mut in_ws = false;
    for ch in literal.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                src.push_str(r"\s+");
                in_ws = true;
            }
            continue;
        }
        in_ws = false;
        src.push_str(&regex::escape(&ch.to_string()));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod generalization {
        use super::*;

        #[test]
        fn identifier_rename_produces_one_placeholder() {
            let transform = generalize(
                "const foo = compute();",
                "const bar = compute();",
                vec!["lexical_declaration".to_string()],
            )
            .unwrap();
            assert_eq!(transform.pattern, "const $1 = compute();");
            assert_eq!(transform.replacement, "const $1 = compute();");
            assert_eq!(transform.constraints.len(), 1);
            assert_eq!(transform.constraints[0].placeholder, "$1");
            assert_eq!(transform.constraints[0].kind, BindingKind::Identifier);
        }

        #[test]
        fn repeated_rename_shares_a_placeholder() {
            let transform =
                generalize("foo + foo", "bar + bar", vec!["binary_expression".to_string()])
                    .unwrap();
            assert_eq!(transform.pattern, "$1 + $1");
            assert_eq!(transform.constraints.len(), 1);
        }

        #[test]
        fn literal_change_constrained_to_literal() {
            let transform = generalize("wait(100);", "wait(250);", vec![]).unwrap();
            assert_eq!(transform.pattern, "wait($1);");
            assert_eq!(transform.constraints[0].kind, BindingKind::Literal);
        }

        #[test]
        fn identical_tokens_stay_literal() {
            let transform = generalize("f(a, b)", "f(a, c)", vec![]).unwrap();
            assert_eq!(transform.pattern, "f(a, $1)");
            assert_eq!(transform.replacement, "f(a, $1)");
        }

        #[test]
        fn structural_change_keeps_texts_literal() {
            let transform = generalize("return x;", "return wrap(x);", vec![]).unwrap();
            assert_eq!(transform.pattern, "return x;");
            assert_eq!(transform.replacement, "return wrap(x);");
            assert!(transform.constraints.is_empty());
        }

        #[test]
        fn empty_source_fails() {
            let err = generalize("", "x", vec![]).unwrap_err();
            assert!(matches!(err, CursorError::PatternGenerationFailure { .. }));
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn rematch_binds_original_spelling() {
            let transform = generalize(
                "const foo = compute();",
                "const bar = compute();",
                vec![],
            )
            .unwrap();
            let bindings = transform
                .match_against("const foo = compute();")
                .expect("pattern must re-match its own source");
            assert_eq!(bindings, vec![("$1".to_string(), "foo".to_string())]);
        }

        #[test]
        fn match_accepts_other_identifiers() {
            let transform =
                generalize("const foo = compute();", "const bar = compute();", vec![]).unwrap();
            let bindings = transform.match_against("const total = compute();").unwrap();
            assert_eq!(bindings[0].1, "total");
        }

        #[test]
        fn repeated_placeholder_requires_same_binding() {
            let transform = generalize("foo + foo", "bar + bar", vec![]).unwrap();
            assert!(transform.match_against("x + x").is_some());
            assert!(transform.match_against("x + y").is_none());
        }

        #[test]
        fn literal_constraint_rejects_identifiers() {
            let transform = generalize("wait(100);", "wait(250);", vec![]).unwrap();
            assert!(transform.match_against("wait(500);").is_some());
            assert!(transform.match_against("wait(delay);").is_none());
        }

        #[test]
        fn no_op_template_matches_itself() {
            let transform = no_op_template("function add(a, b) {", vec![]);
            assert!(transform.match_against("function add(a, b) {").is_some());
        }
    }
}
