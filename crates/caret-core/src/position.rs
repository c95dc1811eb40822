//! Cursor positions and node handles.
//!
//! A [`Position`] is a structural location: file path, 1-indexed line,
//! optional column, and optionally the smallest enclosing syntax node. The
//! node reference carries the buffer generation it was resolved against;
//! a handle whose generation predates the buffer's current generation is
//! *stale* and must be re-resolved before structural queries run.

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

// ============================================================================
// Node Handle
// ============================================================================

/// Reference to a syntax node, pinned to the buffer generation it was
/// resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    /// Arena index of the node in the tree snapshot for `generation`.
    pub id: NodeId,
    /// Buffer generation the resolution is valid for.
    pub generation: u64,
}

impl NodeHandle {
    /// Create a handle for the given generation.
    pub fn new(id: NodeId, generation: u64) -> Self {
        NodeHandle { id, generation }
    }

    /// Check whether the handle predates the buffer's current generation.
    pub fn is_stale(&self, current_generation: u64) -> bool {
        self.generation < current_generation
    }
}

// ============================================================================
// Position
// ============================================================================

/// A live location in a source file.
///
/// `line` and `column` are 1-indexed. The node handle is an internal
/// resolution cache and is not serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// File path (project-relative or absolute, as the file store sees it).
    pub file_path: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, counting Unicode scalar values).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Smallest enclosing node, when resolved.
    #[serde(skip, default)]
    pub node: Option<NodeHandle>,
}

impl Position {
    /// Create a position without a column.
    pub fn new(file_path: impl Into<String>, line: u32) -> Self {
        Position {
            file_path: file_path.into(),
            line,
            column: None,
            node: None,
        }
    }

    /// Create a position with a column.
    pub fn with_column(file_path: impl Into<String>, line: u32, column: u32) -> Self {
        Position {
            file_path: file_path.into(),
            line,
            column: Some(column),
            node: None,
        }
    }

    /// Parse a position from `path:line` or `path:line:col` format.
    ///
    /// Robust against paths containing colons: the line and column are taken
    /// from the right.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        match parts.as_slice() {
            [col, line, file] => {
                let col: u32 = col.parse().ok()?;
                let line: u32 = line.parse().ok()?;
                Some(Position::with_column(*file, line, col))
            }
            [line, file] => {
                let line: u32 = line.parse().ok()?;
                Some(Position::new(*file, line))
            }
            _ => None,
        }
    }

    /// Comparison key for deterministic ordering: (file, line, column).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file_path, self.line, self.column.unwrap_or(0))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}:{}", self.file_path, self.line, col),
            None => write!(f, "{}:{}", self.file_path, self.line),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
