//! Context snapshots: the text window, imports, and scope chain around a
//! position.
//!
//! A [`Context`] is read-mostly and recomputed whenever the position or the
//! buffer generation changes; it is a pure function of those two inputs, so
//! identical inputs always produce an identical snapshot (pattern extraction
//! depends on this determinism).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ident;
use crate::navigate;
use crate::position::Position;
use crate::text;
use crate::tree::{NodeId, Span, SyntaxTree};

/// Lines captured before and after the current line.
pub const CONTEXT_WINDOW: usize = 3;

// ============================================================================
// Imports
// ============================================================================

/// One import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReference {
    /// Module specifier as written.
    pub source: String,
    /// Whether the specifier is relative (starts with `.` or `/`).
    pub is_relative: bool,
    /// Imported bindings, in written order. Empty only for side-effect
    /// imports; named imports always carry at least one symbol.
    pub symbols: Vec<String>,
    /// Byte range of the statement in the joined content.
    pub range: Span,
    /// 1-indexed line the statement starts on.
    pub line: u32,
}

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*import\s+(?:(.+?)\s+from\s+)?["']([^"']+)["']"#).expect("static regex")
    })
}

/// Parse one line as an import statement.
pub fn parse_import_line(line: &str) -> Option<(String, Vec<String>)> {
    let caps = import_re().captures(line)?;
    let source = caps.get(2)?.as_str().to_string();
    let symbols = match caps.get(1) {
        None => Vec::new(),
        Some(clause) => split_import_clause(clause.as_str()),
    };
    Some((source, symbols))
}

/// Split an import clause into local binding names.
///
/// Handles default imports, named groups, namespace imports, and `as`
/// aliases; the local name (after `as`) is what lands in the symbol list.
fn split_import_clause(clause: &str) -> Vec<String> {
    let mut symbols = Vec::new();
    for part in clause.split(',') {
        let part = part.trim().trim_matches(|c| c == '{' || c == '}').trim();
        if part.is_empty() {
            continue;
        }
        let local = match part.rsplit_once(" as ") {
            Some((_, alias)) => alias.trim(),
            None => part.trim_start_matches('*').trim(),
        };
        if let Some(name) = ident::first_identifier(local) {
            symbols.push(name);
        }
    }
    symbols
}

/// Scan a whole buffer for import statements.
pub fn scan_imports<S: AsRef<str>>(lines: &[S]) -> Vec<ImportReference> {
    let mut imports = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line_no = i as u32 + 1;
        if let Some((source, symbols)) = parse_import_line(line.as_ref()) {
            let range = text::line_span(lines, line_no).unwrap_or_else(|| Span::new(0, 0));
            imports.push(ImportReference {
                is_relative: source.starts_with('.') || source.starts_with('/'),
                source,
                symbols,
                range,
                line: line_no,
            });
        }
    }
    imports
}

// ============================================================================
// Scope Chain
// ============================================================================

/// Declarations visible at one scope level.
///
/// The chain terminates at module scope (`parent` is `None` there).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeContext {
    /// Variable bindings declared in this scope.
    pub variables: Vec<String>,
    /// Functions declared in this scope.
    pub functions: Vec<String>,
    /// Types declared in this scope.
    pub types: Vec<String>,
    /// Enclosing scope, absent at module/file level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<ScopeContext>>,
}

fn is_variable_decl(kind: &str) -> bool {
    matches!(
        kind,
        "lexical_declaration" | "variable_declaration" | "variable_declarator"
    )
}

fn is_type_decl(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration" | "interface_declaration" | "enum_declaration" | "type_alias"
    )
}

/// Collect declarations made directly inside one scope node.
///
/// Descends through non-scope children but does not cross nested scope
/// boundaries, so inner function locals stay out of outer scopes.
fn collect_declarations<S: AsRef<str>>(
    tree: &SyntaxTree,
    lines: &[S],
    scope: NodeId,
    out: &mut ScopeContext,
) {
    let Some(node) = tree.node(scope) else {
        return;
    };
    for &child in &node.children {
        let kind = tree.kind(child);
        let name = || {
            text::extract_span(lines, tree.span(child))
                .as_deref()
                .and_then(ident::declared_name)
        };
        if navigate::is_function_kind(kind) {
            if let Some(n) = name() {
                out.functions.push(n);
            }
            continue;
        }
        if is_type_decl(kind) {
            if let Some(n) = name() {
                out.types.push(n);
            }
            continue;
        }
        if is_variable_decl(kind) {
            if let Some(n) = name() {
                out.variables.push(n);
            }
        }
        if !navigate::is_scope_boundary(kind) {
            collect_declarations(tree, lines, child, out);
        }
    }
}

/// Build the scope chain for a node, innermost scope first.
pub fn scope_chain<S: AsRef<str>>(
    tree: &SyntaxTree,
    lines: &[S],
    from: NodeId,
) -> Option<ScopeContext> {
    let mut scopes: Vec<NodeId> = Vec::new();
    if let Some(scope) = navigate::scope_of(tree, from) {
        scopes.push(scope);
        let mut current = scope;
        while let Some(outer) = navigate::enclosing_scope(tree, current) {
            scopes.push(outer);
            current = outer;
        }
    }
    // Module scope is always the outermost link.
    scopes.push(tree.root());

    let mut chain: Option<Box<ScopeContext>> = None;
    for &scope in scopes.iter().rev() {
        let mut ctx = ScopeContext {
            parent: chain.take(),
            ..ScopeContext::default()
        };
        collect_declarations(tree, lines, scope, &mut ctx);
        chain = Some(Box::new(ctx));
    }
    chain.map(|b| *b)
}

// ============================================================================
// Context
// ============================================================================

/// Snapshot of the surroundings of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Up to [`CONTEXT_WINDOW`] lines above the current line.
    pub lines_before: Vec<String>,
    /// The current line, verbatim.
    pub current_line: String,
    /// Up to [`CONTEXT_WINDOW`] lines below the current line.
    pub lines_after: Vec<String>,
    /// File extension, lowercase, without the dot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    /// Language inferred from the extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Project root, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    /// Imports in the file, in source order.
    pub imports: Vec<ImportReference>,
    /// Scope chain at the position, innermost first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeContext>,
}

/// Language inferred from a file extension.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "ts" | "tsx" | "mts" | "cts" => Some("typescript"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "rs" => Some("rust"),
        "py" => Some("python"),
        "go" => Some("go"),
        "java" => Some("java"),
        _ => None,
    }
}

impl Context {
    /// Compute the context for a position.
    ///
    /// Pure in `(lines, position, tree)`: identical inputs yield an
    /// identical snapshot.
    pub fn compute<S: AsRef<str>>(
        lines: &[S],
        position: &Position,
        tree: Option<&SyntaxTree>,
        project_root: Option<&str>,
    ) -> Context {
        let idx = position.line.max(1) as usize - 1;
        let before_start = idx.saturating_sub(CONTEXT_WINDOW);
        let lines_before = lines[before_start..idx.min(lines.len())]
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        let current_line = lines
            .get(idx)
            .map(|l| l.as_ref().to_string())
            .unwrap_or_default();
        let after_end = (idx + 1 + CONTEXT_WINDOW).min(lines.len());
        let lines_after = lines[(idx + 1).min(lines.len())..after_end]
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect();

        let file_extension = position
            .file_path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let language = file_extension
            .as_deref()
            .and_then(language_for_extension)
            .map(str::to_string);

        let scope = tree.and_then(|t| {
            let node = position
                .node
                .map(|h| h.id)
                .or_else(|| t.node_at(text::position_to_offset(lines, position.line, 1)))?;
            scope_chain(t, lines, node)
        });

        Context {
            lines_before,
            current_line,
            lines_after,
            file_extension,
            language,
            project_root: project_root.map(str::to_string),
            imports: scan_imports(lines),
            scope,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod import_parsing {
        use super::*;

        #[test]
        fn named_imports() {
            let (source, symbols) =
                parse_import_line("import { useState, useEffect } from 'react';").unwrap();
            assert_eq!(source, "react");
            assert_eq!(symbols, vec!["useState", "useEffect"]);
        }

        #[test]
        fn default_and_namespace_imports() {
            let (_, symbols) = parse_import_line("import React from 'react';").unwrap();
            assert_eq!(symbols, vec!["React"]);
            let (_, symbols) = parse_import_line("import * as path from 'path';").unwrap();
            assert_eq!(symbols, vec!["path"]);
        }

        #[test]
        fn aliased_import_uses_local_name() {
            let (_, symbols) =
                parse_import_line("import { format as fmt } from 'date-fns';").unwrap();
            assert_eq!(symbols, vec!["fmt"]);
        }

        #[test]
        fn side_effect_import_has_no_symbols() {
            let (source, symbols) = parse_import_line("import './styles.css';").unwrap();
            assert_eq!(source, "./styles.css");
            assert!(symbols.is_empty());
        }

        #[test]
        fn non_import_lines_ignored() {
            assert!(parse_import_line("const x = 1;").is_none());
            assert!(parse_import_line("// import nothing").is_none());
        }

        #[test]
        fn scan_marks_relative_sources() {
            let lines = vec![
                "import React from 'react';".to_string(),
                "import { Button } from './button';".to_string(),
            ];
            let imports = scan_imports(&lines);
            assert_eq!(imports.len(), 2);
            assert!(!imports[0].is_relative);
            assert!(imports[1].is_relative);
            assert_eq!(imports[1].line, 2);
        }
    }

    mod context_window {
        use super::*;

        fn lines() -> Vec<String> {
            (1..=10).map(|i| format!("line {}", i)).collect()
        }

        #[test]
        fn window_in_the_middle() {
            let pos = Position::new("a.ts", 5);
            let ctx = Context::compute(&lines(), &pos, None, None);
            assert_eq!(ctx.lines_before, vec!["line 2", "line 3", "line 4"]);
            assert_eq!(ctx.current_line, "line 5");
            assert_eq!(ctx.lines_after, vec!["line 6", "line 7", "line 8"]);
        }

        #[test]
        fn window_clipped_at_edges() {
            let pos = Position::new("a.ts", 1);
            let ctx = Context::compute(&lines(), &pos, None, None);
            assert!(ctx.lines_before.is_empty());
            let pos = Position::new("a.ts", 10);
            let ctx = Context::compute(&lines(), &pos, None, None);
            assert!(ctx.lines_after.is_empty());
        }

        #[test]
        fn language_from_extension() {
            let pos = Position::new("src/App.tsx", 1);
            let ctx = Context::compute(&lines(), &pos, None, None);
            assert_eq!(ctx.file_extension.as_deref(), Some("tsx"));
            assert_eq!(ctx.language.as_deref(), Some("typescript"));
        }

        #[test]
        fn recomputation_is_deterministic() {
            let pos = Position::new("a.ts", 5);
            let a = Context::compute(&lines(), &pos, None, None);
            let b = Context::compute(&lines(), &pos, None, None);
            assert_eq!(a, b);
        }
    }

    mod scopes {
        use super::*;
        use crate::tree::TreeBuilder;

        #[test]
        fn chain_terminates_at_module() {
            let lines: Vec<String> = vec![
                "const top = 1;".to_string(),
                "function work() {".to_string(),
                "  const local = 2;".to_string(),
                "}".to_string(),
            ];
            let content_len = text::join_lines(&lines).len();
            let mut b = TreeBuilder::new();
            let root = b.root("program", Span::new(0, content_len));
            b.child(root, "lexical_declaration", Span::new(0, 14));
            let func = b.child(root, "function_declaration", Span::new(15, content_len));
            b.child(func, "lexical_declaration", Span::new(35, 51));
            let tree = b.build();

            let inner = tree.node_at(40).unwrap();
            let scope = scope_chain(&tree, &lines, inner).unwrap();
            assert_eq!(scope.variables, vec!["local"]);
            let module = scope.parent.as_deref().unwrap();
            assert_eq!(module.variables, vec!["top"]);
            assert_eq!(module.functions, vec!["work"]);
            assert!(module.parent.is_none());
        }
    }
}
