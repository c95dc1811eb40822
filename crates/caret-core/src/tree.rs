//! Syntax-tree arena: index-addressed nodes with non-owning parent links.
//!
//! Trees arrive from an external AST provider and are immutable once built.
//! Nodes live in a flat arena addressed by [`NodeId`]; `parent` is a plain
//! index (never keeps the parent alive), `children` are owned index lists.
//! The structure is acyclic by construction: a child id is always allocated
//! after its parent, and [`TreeBuilder::child`] only links downward.
//!
//! Spans are half-open byte ranges `[start, end)` into the buffer's
//! `\n`-joined content (see [`crate::text`]).

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into joined file content, half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span contains a byte offset.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Check if this span overlaps another. Adjacent spans do not overlap.
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Node Identity
// ============================================================================

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node id.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

// ============================================================================
// Nodes and Trees
// ============================================================================

/// A single syntax node.
///
/// `kind` is the provider's structural classification (for example
/// `"function_declaration"`, `"call_expression"`, `"jsx_element"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Structural kind tag from the provider.
    pub kind: String,
    /// Source byte range of the node.
    pub span: Span,
    /// Parent node index (non-owning); `None` for the root.
    pub parent: Option<NodeId>,
    /// Owned child index list, in source order.
    pub children: Vec<NodeId>,
}

/// An immutable syntax tree over one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes besides the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Structural kind of a node (empty string for an invalid id).
    pub fn kind(&self, id: NodeId) -> &str {
        self.node(id).map(|n| n.kind.as_str()).unwrap_or("")
    }

    /// Span of a node (empty span for an invalid id).
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id)
            .map(|n| n.span)
            .unwrap_or_else(|| Span::new(0, 0))
    }

    /// The smallest node whose span contains the byte offset.
    ///
    /// Descends from the root, preferring the deepest containing node.
    /// Returns `None` when the offset falls outside the root span (a gap).
    pub fn node_at(&self, offset: usize) -> Option<NodeId> {
        let root = self.node(self.root)?;
        if !root.span.contains_offset(offset) {
            return None;
        }
        let mut current = self.root;
        'descend: loop {
            let node = self.node(current)?;
            for &child in &node.children {
                if self.span(child).contains_offset(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Iterate the ancestor chain of a node, innermost first (excludes `id`).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).and_then(|n| n.parent),
        }
    }

    /// Pre-order traversal of the whole tree (source order).
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Nearest ancestor-or-self satisfying a predicate.
    pub fn ancestor_or_self<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&SyntaxNode) -> bool,
    {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.node(n).is_some_and(&mut pred))
    }

    /// Top-level structure (direct child of the root) containing a span.
    ///
    /// Returns all top-level children overlapping the span, in source order.
    pub fn top_level_covering(&self, span: Span) -> Vec<NodeId> {
        let Some(root) = self.node(self.root) else {
            return Vec::new();
        };
        root.children
            .iter()
            .copied()
            .filter(|&c| self.span(c).overlaps(span))
            .collect()
    }
}

/// Iterator over a node's ancestors, innermost first.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).and_then(|n| n.parent);
        Some(current)
    }
}

/// Pre-order (source order) iterator over the whole tree.
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        if let Some(node) = self.tree.node(current) {
            for &child in node.children.iter().rev() {
                self.stack.push(child);
            }
        }
        Some(current)
    }
}

// ============================================================================
// Tree Builder
// ============================================================================

/// Incremental builder used by AST providers and fixtures.
///
/// The first node added becomes the root. Children must be added after their
/// parent and linked via [`TreeBuilder::child`], which keeps the arena
/// acyclic by construction.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Add a root node. Must be the first node added.
    pub fn root(&mut self, kind: impl Into<String>, span: Span) -> NodeId {
        debug_assert!(self.nodes.is_empty(), "root must be the first node");
        self.push(kind.into(), span, None)
    }

    /// Add a child of an existing node. Children must be added in source order.
    pub fn child(&mut self, parent: NodeId, kind: impl Into<String>, span: Span) -> NodeId {
        debug_assert!(parent.index() < self.nodes.len(), "unknown parent node");
        let id = self.push(kind.into(), span, Some(parent));
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn push(&mut self, kind: String, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Finish the tree.
    ///
    /// Falls back to a single empty root when no nodes were added, so a
    /// provider can always return a well-formed tree.
    pub fn build(mut self) -> SyntaxTree {
        if self.nodes.is_empty() {
            self.push("program".to_string(), Span::new(0, 0), None);
        }
        SyntaxTree {
            nodes: self.nodes,
            root: NodeId::new(0),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SyntaxTree {
        // program [0, 40)
        //   function_declaration [0, 30)
        //     identifier [9, 12)
        //     call_expression [20, 28)
        //   lexical_declaration [31, 40)
        let mut b = TreeBuilder::new();
        let root = b.root("program", Span::new(0, 40));
        let func = b.child(root, "function_declaration", Span::new(0, 30));
        b.child(func, "identifier", Span::new(9, 12));
        b.child(func, "call_expression", Span::new(20, 28));
        b.child(root, "lexical_declaration", Span::new(31, 40));
        b.build()
    }

    mod span_tests {
        use super::*;

        #[test]
        fn overlap_rules() {
            let a = Span::new(0, 10);
            assert!(a.overlaps(Span::new(5, 15)));
            assert!(!a.overlaps(Span::new(10, 20)), "adjacent spans do not overlap");
            assert!(a.contains(Span::new(2, 8)));
            assert!(!a.contains(Span::new(2, 11)));
        }

        #[test]
        #[should_panic(expected = "must be <=")]
        fn inverted_span_panics() {
            let _ = Span::new(5, 1);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn node_at_prefers_deepest() {
            let tree = sample_tree();
            let id = tree.node_at(10).unwrap();
            assert_eq!(tree.kind(id), "identifier");
            let id = tree.node_at(22).unwrap();
            assert_eq!(tree.kind(id), "call_expression");
        }

        #[test]
        fn node_at_gap_falls_back_to_enclosing() {
            let tree = sample_tree();
            // Offset 15 lies in the function but no child.
            let id = tree.node_at(15).unwrap();
            assert_eq!(tree.kind(id), "function_declaration");
        }

        #[test]
        fn node_at_outside_root_is_none() {
            let tree = sample_tree();
            assert_eq!(tree.node_at(40), None);
        }
    }

    mod traversal {
        use super::*;

        #[test]
        fn ancestors_innermost_first() {
            let tree = sample_tree();
            let ident = tree.node_at(10).unwrap();
            let kinds: Vec<&str> = tree.ancestors(ident).map(|a| tree.kind(a)).collect();
            assert_eq!(kinds, vec!["function_declaration", "program"]);
        }

        #[test]
        fn preorder_is_source_order() {
            let tree = sample_tree();
            let kinds: Vec<&str> = tree.preorder().map(|n| tree.kind(n)).collect();
            assert_eq!(
                kinds,
                vec![
                    "program",
                    "function_declaration",
                    "identifier",
                    "call_expression",
                    "lexical_declaration",
                ]
            );
        }

        #[test]
        fn top_level_covering_spans() {
            let tree = sample_tree();
            let covering = tree.top_level_covering(Span::new(25, 35));
            assert_eq!(covering.len(), 2);
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn empty_builder_yields_empty_program() {
            let tree = TreeBuilder::new().build();
            assert_eq!(tree.kind(tree.root()), "program");
            assert!(tree.is_empty());
        }

        #[test]
        fn parent_links_are_consistent() {
            let tree = sample_tree();
            for id in tree.preorder() {
                if let Some(parent) = tree.node(id).and_then(|n| n.parent) {
                    assert!(tree.node(parent).unwrap().children.contains(&id));
                }
            }
        }
    }
}
