//! Heuristic code analysis over the current subtree.
//!
//! A fixed battery of structural checks producing a [`CodeAnalysis`] report.
//! The engine never mutates the buffer here and never fails: an empty report
//! is a valid result. Findings are appended per category and are not
//! deduplicated across categories.

use serde::{Deserialize, Serialize};

use crate::ident;
use crate::navigate;
use crate::text;
use crate::tree::{NodeId, SyntaxTree};

// ============================================================================
// Report
// ============================================================================

/// Structured analysis report, one ordered list per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    /// General improvement suggestions.
    pub suggestions: Vec<String>,
    /// Likely bugs or dead code.
    pub potential_issues: Vec<String>,
    /// Performance notes.
    pub performance: Vec<String>,
    /// Accessibility notes for markup.
    pub accessibility: Vec<String>,
    /// Style and best-practice notes.
    pub best_practices: Vec<String>,
}

impl CodeAnalysis {
    /// Check if every category is empty.
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
            && self.potential_issues.is_empty()
            && self.performance.is_empty()
            && self.accessibility.is_empty()
            && self.best_practices.is_empty()
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Analyze the subtree around a position.
///
/// With a resolved node the scope is that node's line range; in line-only
/// mode it is the context window around `line`.
pub fn analyze<S: AsRef<str>>(
    lines: &[S],
    tree: Option<&SyntaxTree>,
    node: Option<NodeId>,
    line: u32,
) -> CodeAnalysis {
    let (start, end) = match (tree, node) {
        (Some(tree), Some(node)) => text::span_to_line_range(lines, tree.span(node)),
        _ => {
            let radius = crate::context::CONTEXT_WINDOW as u32;
            (
                line.saturating_sub(radius).max(1),
                (line + radius).min(lines.len() as u32),
            )
        }
    };

    let mut report = CodeAnalysis::default();
    let scope: Vec<(u32, &str)> = ((start.max(1))..=end.min(lines.len() as u32))
        .filter_map(|n| lines.get(n as usize - 1).map(|l| (n, l.as_ref())))
        .collect();

    check_unused_bindings(&scope, &mut report);
    check_var_usage(&scope, &mut report);
    check_loose_equality(&scope, &mut report);
    check_debug_logging(&scope, &mut report);
    check_nested_loops(&scope, &mut report);
    check_markup(&scope, &mut report);
    check_function_length(lines, tree, node, &mut report);
    report
}

// ============================================================================
// Checks
// ============================================================================

fn check_unused_bindings(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    let all_text: String = scope
        .iter()
        .map(|(_, l)| *l)
        .collect::<Vec<_>>()
        .join("\n");
    for (n, line) in scope {
        let trimmed = line.trim_start();
        if !(trimmed.starts_with("const ")
            || trimmed.starts_with("let ")
            || trimmed.starts_with("var "))
        {
            continue;
        }
        if let Some(name) = ident::declared_name(line) {
            if ident::count_word(&all_text, &name) == 1 {
                report
                    .potential_issues
                    .push(format!("binding '{}' on line {} is never used", name, n));
            }
        }
    }
}

fn check_var_usage(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    for (n, line) in scope {
        if line.trim_start().starts_with("var ") {
            report
                .best_practices
                .push(format!("line {}: prefer const or let over var", n));
        }
    }
}

fn check_loose_equality(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    for (n, line) in scope {
        if has_loose_equality(line) {
            report
                .potential_issues
                .push(format!("line {}: loose equality, prefer === or !==", n));
        }
    }
}

fn has_loose_equality(line: &str) -> bool {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        let after = if i + 2 < bytes.len() { bytes[i + 2] } else { b' ' };
        if bytes[i] == b'=' && bytes[i + 1] == b'=' {
            let before = if i == 0 { b' ' } else { bytes[i - 1] };
            if !matches!(before, b'=' | b'!' | b'<' | b'>') && after != b'=' {
                return true;
            }
            i += 2;
            continue;
        }
        if bytes[i] == b'!' && bytes[i + 1] == b'=' && after != b'=' {
            return true;
        }
        i += 1;
    }
    false
}

fn check_debug_logging(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    for (n, line) in scope {
        if line.contains("console.log(") {
            report
                .suggestions
                .push(format!("line {}: remove leftover console.log", n));
        }
    }
}

fn check_nested_loops(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    let mut stack: Vec<(u32, usize)> = Vec::new();
    for (n, line) in scope {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let is_loop = trimmed.starts_with("for ")
            || trimmed.starts_with("for(")
            || trimmed.starts_with("while ")
            || trimmed.starts_with("while(");
        while let Some(&(_, outer_indent)) = stack.last() {
            if indent <= outer_indent && !is_loop_continuation(trimmed) {
                stack.pop();
            } else {
                break;
            }
        }
        if is_loop {
            if let Some(&(outer_line, _)) = stack.last() {
                report.performance.push(format!(
                    "nested loops on lines {} and {} may be quadratic",
                    outer_line, n
                ));
            }
            stack.push((*n, indent));
        }
    }
}

fn is_loop_continuation(trimmed: &str) -> bool {
    trimmed.starts_with('}')
}

fn check_markup(scope: &[(u32, &str)], report: &mut CodeAnalysis) {
    for (n, line) in scope {
        if line.contains("<img") && !line.contains("alt=") {
            report
                .accessibility
                .push(format!("line {}: <img> without alt attribute", n));
        }
        if (line.contains("<div") || line.contains("<span")) && line.contains("onClick") {
            report.accessibility.push(format!(
                "line {}: click handler on non-interactive element",
                n
            ));
        }
    }
}

const LONG_FUNCTION_LINES: u32 = 40;

fn check_function_length<S: AsRef<str>>(
    lines: &[S],
    tree: Option<&SyntaxTree>,
    node: Option<NodeId>,
    report: &mut CodeAnalysis,
) {
    let (Some(tree), Some(node)) = (tree, node) else {
        return;
    };
    let Some(func) = tree.ancestor_or_self(node, |n| navigate::is_function_kind(&n.kind)) else {
        return;
    };
    let (start, end) = text::span_to_line_range(lines, tree.span(func));
    let len = end.saturating_sub(start) + 1;
    if len > LONG_FUNCTION_LINES {
        report.suggestions.push(format!(
            "function spanning lines {}-{} is {} lines long, consider extracting helpers",
            start, end, len
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unused_binding_reported() {
        let src = lines(&["const used = 1;", "const unused = 2;", "return used;"]);
        let report = analyze(&src, None, None, 2);
        assert_eq!(
            report.potential_issues,
            vec!["binding 'unused' on line 2 is never used"]
        );
    }

    #[test]
    fn var_usage_flagged_as_best_practice() {
        let src = lines(&["var count = 0;", "count += 1;"]);
        let report = analyze(&src, None, None, 1);
        assert_eq!(
            report.best_practices,
            vec!["line 1: prefer const or let over var"]
        );
    }

    #[test]
    fn loose_equality_detection() {
        assert!(has_loose_equality("if (a == b) {"));
        assert!(has_loose_equality("if (a != b) {"));
        assert!(!has_loose_equality("if (a === b) {"));
        assert!(!has_loose_equality("if (a !== b) {"));
        assert!(!has_loose_equality("if (a <= b) {"));
        assert!(!has_loose_equality("const f = (x) => x;"));
    }

    #[test]
    fn nested_loops_reported_once() {
        let src = lines(&[
            "for (const a of xs) {",
            "  for (const b of ys) {",
            "    use(a, b);",
            "  }",
            "}",
        ]);
        let report = analyze(&src, None, None, 2);
        assert_eq!(
            report.performance,
            vec!["nested loops on lines 1 and 2 may be quadratic"]
        );
    }

    #[test]
    fn sequential_loops_not_reported() {
        let src = lines(&[
            "for (const a of xs) {",
            "}",
            "for (const b of ys) {",
            "}",
        ]);
        let report = analyze(&src, None, None, 2);
        assert!(report.performance.is_empty());
    }

    #[test]
    fn missing_alt_attribute() {
        let src = lines(&["return <img src={url} />;"]);
        let report = analyze(&src, None, None, 1);
        assert_eq!(
            report.accessibility,
            vec!["line 1: <img> without alt attribute"]
        );
    }

    #[test]
    fn clean_code_yields_empty_report() {
        let src = lines(&["const x = compute();", "return x;"]);
        let report = analyze(&src, None, None, 1);
        assert!(report.is_empty());
    }
}
