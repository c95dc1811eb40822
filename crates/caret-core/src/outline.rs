//! Outline scanner: a heuristic, line-oriented [`AstProvider`].
//!
//! This is not a language parser. It recognizes the coarse structure of
//! JavaScript/TypeScript-shaped files (functions, classes, declarations,
//! imports, single-line JSX, calls) with regular expressions and brace
//! matching, the same way lightweight structural detectors work in code
//! scanners. It exists so the CLI and the test suite have a working provider
//! without binding the engine to a real grammar; a production embedder plugs
//! in its own [`AstProvider`].
//!
//! Files with unrecognized extensions are refused with
//! `UnsupportedLanguage`, which exercises the cursor's line-only degrade
//! path.

use std::sync::OnceLock;

use regex::Regex;

use crate::context::language_for_extension;
use crate::error::{CursorError, CursorResult};
use crate::provider::AstProvider;
use crate::text;
use crate::tree::{Span, SyntaxTree, TreeBuilder};

fn function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s+[A-Za-z_$]").expect("static regex")
    })
}

fn arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?const\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=\s*(?:async\s+)?\([^)]*\)\s*=>")
            .expect("static regex")
    })
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?class\s+[A-Za-z_$]").expect("static regex")
    })
}

fn decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:const|let|var)\s+[A-Za-z_$]").expect("static regex")
    })
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_$][A-Za-z0-9_$]*)\s*\(").expect("static regex")
    })
}

const CALL_KEYWORDS: [&str; 8] = [
    "if", "for", "while", "switch", "catch", "function", "return", "typeof",
];

/// Heuristic structural provider for JS/TS-shaped files.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineAstProvider;

#[derive(Debug)]
struct Pending {
    kind: &'static str,
    span: Span,
}

impl AstProvider for OutlineAstProvider {
    fn parse(&self, path: &str, content: &str) -> CursorResult<SyntaxTree> {
        let supported = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .as_deref()
            .and_then(language_for_extension)
            .is_some_and(|lang| matches!(lang, "typescript" | "javascript"));
        if !supported {
            return Err(CursorError::UnsupportedLanguage {
                path: path.to_string(),
            });
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let mut pending = scan(content, &lines);

        // Outer structures first so the builder can nest by containment.
        pending.sort_by(|a, b| {
            (a.span.start, std::cmp::Reverse(a.span.end))
                .cmp(&(b.span.start, std::cmp::Reverse(b.span.end)))
        });

        let mut builder = TreeBuilder::new();
        let root = builder.root("program", Span::new(0, content.len()));
        let mut stack: Vec<(crate::tree::NodeId, Span)> = vec![(root, Span::new(0, content.len()))];
        for p in pending {
            while stack.len() > 1 && !stack.last().map(|(_, s)| s.contains(p.span)).unwrap_or(false)
            {
                stack.pop();
            }
            let parent = stack.last().map(|(id, _)| *id).unwrap_or(root);
            let id = builder.child(parent, p.kind, p.span);
            stack.push((id, p.span));
        }
        Ok(builder.build())
    }
}

fn scan(content: &str, lines: &[&str]) -> Vec<Pending> {
    let mut pending = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let Some(line_start) = text::line_start_offset(lines, line_no) else {
            continue;
        };
        let line_end = line_start + line.len();
        let indent_len = text::leading_indent(line).len();

        if crate::context::parse_import_line(line).is_some() {
            pending.push(Pending {
                kind: "import_statement",
                span: Span::new(line_start + indent_len, line_end),
            });
            continue;
        }

        let block_kind = if function_re().is_match(line) {
            Some("function_declaration")
        } else if arrow_re().is_match(line) {
            Some("arrow_function")
        } else if class_re().is_match(line) {
            Some("class_declaration")
        } else {
            None
        };
        if let Some(kind) = block_kind {
            let span = match line.find('{') {
                Some(open) => match matching_brace(content, line_start + open) {
                    Some(close) => Span::new(line_start + indent_len, close + 1),
                    None => Span::new(line_start + indent_len, content.len()),
                },
                None => Span::new(line_start + indent_len, line_end),
            };
            pending.push(Pending { kind, span });
            scan_calls(line, line_start, &mut pending);
            continue;
        }

        if decl_re().is_match(line) && !line.contains('{') {
            pending.push(Pending {
                kind: "lexical_declaration",
                span: Span::new(line_start + indent_len, line_end),
            });
        }

        scan_jsx(line, line_start, &mut pending);
        scan_calls(line, line_start, &mut pending);
    }
    pending
}

/// Single-line JSX elements only; multi-line markup is out of scope for the
/// outline.
fn scan_jsx(line: &str, line_start: usize, pending: &mut Vec<Pending>) {
    let Some(open) = line.find('<') else {
        return;
    };
    let after = &line[open + 1..];
    let starts_tag = after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_tag {
        return;
    }
    let Some(close) = line.rfind('>') else {
        return;
    };
    if close <= open {
        return;
    }
    let kind = if line[..close].ends_with('/') {
        "jsx_self_closing_element"
    } else {
        "jsx_element"
    };
    pending.push(Pending {
        kind,
        span: Span::new(line_start + open, line_start + close + 1),
    });
}

fn scan_calls(line: &str, line_start: usize, pending: &mut Vec<Pending>) {
    for caps in call_re().captures_iter(line) {
        let name = caps.get(1).expect("call name group");
        if CALL_KEYWORDS.contains(&name.as_str()) {
            continue;
        }
        // A declaration's parameter list is not a call.
        if line[..name.start()].trim_end().ends_with("function") {
            continue;
        }
        let open = line[name.end()..]
            .find('(')
            .map(|p| name.end() + p)
            .expect("regex guarantees paren");
        let Some(close) = matching_paren(line, open) else {
            continue;
        };
        pending.push(Pending {
            kind: "call_expression",
            span: Span::new(line_start + name.start(), line_start + close + 1),
        });
    }
}

fn matching_brace(content: &str, open: usize) -> Option<usize> {
    matching_delimiter(content.as_bytes(), open, b'{', b'}')
}

fn matching_paren(line: &str, open: usize) -> Option<usize> {
    matching_delimiter(line.as_bytes(), open, b'(', b')')
}

fn matching_delimiter(bytes: &[u8], open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SyntaxTree {
        OutlineAstProvider.parse("app.tsx", src).unwrap()
    }

    #[test]
    fn function_span_covers_braces() {
        let src = "function add(a, b) {\n  return a + b;\n}";
        let tree = parse(src);
        let func = tree.node_at(25).unwrap();
        let func = tree
            .ancestor_or_self(func, |n| n.kind == "function_declaration")
            .unwrap();
        assert_eq!(tree.span(func), Span::new(0, src.len()));
    }

    #[test]
    fn nested_call_is_child_of_function() {
        let src = "function run() {\n  work(1);\n}";
        let tree = parse(src);
        let call = tree.node_at(20).unwrap();
        assert_eq!(tree.kind(call), "call_expression");
        let parents: Vec<&str> = tree.ancestors(call).map(|a| tree.kind(a)).collect();
        assert_eq!(parents, vec!["function_declaration", "program"]);
    }

    #[test]
    fn imports_and_declarations_detected() {
        let src = "import { x } from 'mod';\nconst y = x + 1;";
        let tree = parse(src);
        let kinds: Vec<&str> = tree.preorder().map(|n| tree.kind(n)).collect();
        assert!(kinds.contains(&"import_statement"));
        assert!(kinds.contains(&"lexical_declaration"));
    }

    #[test]
    fn jsx_detected_inside_component() {
        let src = "const App = () => {\n  return <Panel title=\"hi\" />;\n}";
        let tree = parse(src);
        let kinds: Vec<&str> = tree.preorder().map(|n| tree.kind(n)).collect();
        assert!(kinds.contains(&"arrow_function"));
        assert!(kinds.contains(&"jsx_self_closing_element"));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = OutlineAstProvider.parse("notes.txt", "hello").unwrap_err();
        assert!(matches!(err, CursorError::UnsupportedLanguage { .. }));
    }
}
