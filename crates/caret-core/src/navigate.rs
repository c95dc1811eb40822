//! Structural navigation over syntax-tree snapshots.
//!
//! All queries here are pure reads: they take a tree and an origin and
//! return node ids or names. "Not found" is an expected outcome and is
//! reported as `None`/`false`, never as an error. Moving the cursor in
//! response to a hit is the caller's job.
//!
//! Long scans accept a [`CancelToken`] checked between node visits; on
//! cancellation they return the miss result already accumulated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::ident;
use crate::text;
use crate::tree::{NodeId, SyntaxTree};

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation signal for long-running scans.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Request cancellation. Observers finish their current visit and stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Kind Classification
// ============================================================================

/// Scope boundaries: the structures `navigate_to_enclosing_scope` stops at.
pub fn is_scope_boundary(kind: &str) -> bool {
    matches!(
        kind,
        "function"
            | "function_declaration"
            | "function_expression"
            | "arrow_function"
            | "method_definition"
            | "class"
            | "class_declaration"
            | "block"
            | "statement_block"
    )
}

/// Module/file scope: the terminal case with no enclosing scope.
pub fn is_module_scope(kind: &str) -> bool {
    matches!(kind, "program" | "module" | "source_file")
}

/// Function-family kinds.
pub fn is_function_kind(kind: &str) -> bool {
    matches!(
        kind,
        "function"
            | "function_declaration"
            | "function_expression"
            | "arrow_function"
            | "method_definition"
    )
}

/// Match a node kind against a seek target.
///
/// Exact kinds always match; a bare family name (`"function"`, `"class"`,
/// `"jsx"`) matches its derived kinds (`"function_declaration"`,
/// `"jsx_element"`, ...).
pub fn kind_matches(node_kind: &str, target: &str) -> bool {
    if node_kind == target {
        return true;
    }
    if let Some(rest) = node_kind.strip_prefix(target) {
        if rest.starts_with('_') {
            return true;
        }
    }
    match target {
        "function" => is_function_kind(node_kind),
        "class" => node_kind == "class_declaration",
        _ => false,
    }
}

// ============================================================================
// Structural Seek
// ============================================================================

/// Find the nearest structure of a kind.
///
/// Walks outward from the origin along parent links (including the origin
/// itself), then scans forward in source order from the origin offset.
/// Returns the first match, or `None` when the file has none or the scan
/// was cancelled.
pub fn seek_structure(
    tree: &SyntaxTree,
    origin: Option<NodeId>,
    origin_offset: usize,
    target: &str,
    cancel: &CancelToken,
) -> Option<NodeId> {
    // Outward pass.
    if let Some(origin) = origin {
        let hit = tree.ancestor_or_self(origin, |n| kind_matches(&n.kind, target));
        if let Some(hit) = hit {
            trace!(target, %hit, "seek matched on ancestor chain");
            return Some(hit);
        }
    }

    // Forward pass: source order, at or after the origin offset.
    for node in tree.preorder() {
        if cancel.is_cancelled() {
            trace!(target, "seek cancelled");
            return None;
        }
        if tree.span(node).start >= origin_offset && kind_matches(tree.kind(node), target) {
            trace!(target, %node, "seek matched on forward scan");
            return Some(node);
        }
    }
    None
}

// ============================================================================
// Scope Navigation
// ============================================================================

/// Nearest ancestor classified as a scope boundary.
///
/// Returns `None` at module scope: there is no enclosing scope to move to.
pub fn enclosing_scope(tree: &SyntaxTree, from: NodeId) -> Option<NodeId> {
    tree.ancestors(from)
        .find(|&a| is_scope_boundary(tree.kind(a)))
}

/// The scope node a position belongs to, including the node itself.
pub fn scope_of(tree: &SyntaxTree, from: NodeId) -> Option<NodeId> {
    tree.ancestor_or_self(from, |n| is_scope_boundary(&n.kind))
}

// ============================================================================
// Markup Queries
// ============================================================================

/// Whether the node sits inside a JSX/markup subtree.
///
/// Soft query: `false` when the provider produced no markup nodes for this
/// file (the dialect is absent), never an error.
pub fn in_jsx(tree: &SyntaxTree, from: NodeId) -> bool {
    tree.ancestor_or_self(from, |n| n.kind.starts_with("jsx"))
        .is_some()
}

/// Nearest parent component name, if the position is inside markup.
///
/// Prefers the closest enclosing JSX element with a capitalized tag; falls
/// back to the enclosing function when that function's name is capitalized
/// (a function component).
pub fn parent_component<S: AsRef<str>>(
    tree: &SyntaxTree,
    lines: &[S],
    from: NodeId,
) -> Option<String> {
    for node in std::iter::once(from).chain(tree.ancestors(from)) {
        let kind = tree.kind(node);
        if kind.starts_with("jsx") {
            if let Some(tag) = tag_name(tree, lines, node) {
                if starts_uppercase(&tag) {
                    return Some(tag);
                }
            }
        }
        if is_function_kind(kind) {
            let snippet = text::extract_span(lines, tree.span(node))?;
            let name = ident::declared_name(&snippet)?;
            if starts_uppercase(&name) {
                return Some(name);
            }
            return None;
        }
    }
    None
}

fn tag_name<S: AsRef<str>>(tree: &SyntaxTree, lines: &[S], node: NodeId) -> Option<String> {
    let snippet = text::extract_span(lines, tree.span(node))?;
    let after = snippet.trim_start().strip_prefix('<')?;
    ident::first_identifier(after)
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Span, TreeBuilder};

    // const App = () => {          [0, 60)
    //   return <Panel><img /></Panel>;
    // }
    fn jsx_tree() -> (SyntaxTree, Vec<String>) {
        let lines: Vec<String> = vec![
            "const App = () => {".to_string(),
            "  return <Panel><img /></Panel>;".to_string(),
            "}".to_string(),
        ];
        let mut b = TreeBuilder::new();
        let content_len = text::join_lines(&lines).len();
        let root = b.root("program", Span::new(0, content_len));
        let func = b.child(root, "arrow_function", Span::new(0, content_len));
        let panel = b.child(func, "jsx_element", Span::new(29, 51));
        b.child(panel, "jsx_self_closing_element", Span::new(36, 43));
        (b.build(), lines)
    }

    fn plain_tree() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let root = b.root("program", Span::new(0, 100));
        let func = b.child(root, "function_declaration", Span::new(0, 50));
        let block = b.child(func, "statement_block", Span::new(20, 50));
        b.child(block, "call_expression", Span::new(25, 40));
        b.child(root, "class_declaration", Span::new(60, 100));
        b.build()
    }

    mod seeking {
        use super::*;

        #[test]
        fn seek_finds_enclosing_function() {
            let tree = plain_tree();
            let origin = tree.node_at(30);
            let hit = seek_structure(&tree, origin, 30, "function", &CancelToken::new());
            assert_eq!(tree.kind(hit.unwrap()), "function_declaration");
        }

        #[test]
        fn seek_scans_forward_for_missing_ancestor() {
            let tree = plain_tree();
            let origin = tree.node_at(30);
            let hit = seek_structure(&tree, origin, 30, "class", &CancelToken::new());
            assert_eq!(tree.kind(hit.unwrap()), "class_declaration");
        }

        #[test]
        fn seek_misses_absent_kind() {
            let tree = plain_tree();
            let origin = tree.node_at(30);
            let hit = seek_structure(&tree, origin, 30, "interface", &CancelToken::new());
            assert_eq!(hit, None);
        }

        #[test]
        fn cancelled_seek_returns_miss() {
            let tree = plain_tree();
            let cancel = CancelToken::new();
            cancel.cancel();
            // Use a forward-scan-only target so the token is consulted.
            let hit = seek_structure(&tree, None, 0, "class", &cancel);
            assert_eq!(hit, None);
        }
    }

    mod scopes {
        use super::*;

        #[test]
        fn enclosing_scope_walks_out() {
            let tree = plain_tree();
            let call = tree.node_at(30).unwrap();
            let scope = enclosing_scope(&tree, call).unwrap();
            assert_eq!(tree.kind(scope), "statement_block");
            let outer = enclosing_scope(&tree, scope).unwrap();
            assert_eq!(tree.kind(outer), "function_declaration");
        }

        #[test]
        fn module_scope_is_terminal() {
            let tree = plain_tree();
            let func = tree.node_at(10).unwrap();
            assert_eq!(enclosing_scope(&tree, func), None);
        }
    }

    mod markup {
        use super::*;

        #[test]
        fn in_jsx_inside_and_outside() {
            let (tree, _lines) = jsx_tree();
            let img = tree.node_at(38).unwrap();
            assert!(in_jsx(&tree, img));
            let func = tree.node_at(2).unwrap();
            assert!(!in_jsx(&tree, func));
        }

        #[test]
        fn parent_component_prefers_capitalized_tag() {
            let (tree, lines) = jsx_tree();
            let img = tree.node_at(38).unwrap();
            assert_eq!(parent_component(&tree, &lines, img).as_deref(), Some("Panel"));
        }

        #[test]
        fn no_markup_means_none() {
            let tree = plain_tree();
            let lines = vec!["function f() {}".to_string()];
            let call = tree.node_at(30).unwrap();
            assert!(!in_jsx(&tree, call));
            assert_eq!(parent_component(&tree, &lines, call), None);
        }
    }

    mod kind_matching {
        use super::*;

        #[test]
        fn family_names_match_derived_kinds() {
            assert!(kind_matches("function_declaration", "function"));
            assert!(kind_matches("arrow_function", "function"));
            assert!(kind_matches("jsx_element", "jsx"));
            assert!(kind_matches("class_declaration", "class"));
        }

        #[test]
        fn unrelated_kinds_do_not_match() {
            assert!(!kind_matches("functional_component", "function"));
            assert!(!kind_matches("call_expression", "function"));
        }
    }
}
