//! In-memory collaborators for tests and dry runs.
//!
//! These implement the [`crate::provider`] traits against plain maps: a file
//! store over a `HashMap`, a symbol index with canned answers. They back the
//! crate's own test suites and give embedders a working starting point.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{CursorError, CursorResult};
use crate::position::Position;
use crate::provider::{FileStore, SymbolIndex};

// ============================================================================
// Memory File Store
// ============================================================================

/// File store over an in-memory map.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryFileStore::default()
    }

    /// Insert a file from source text (split on `\n`).
    pub fn insert(&self, path: impl Into<String>, content: &str) {
        let lines = content.split('\n').map(str::to_string).collect();
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), lines);
    }

    /// Current content of a file, joined with `\n`.
    pub fn content(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .map(|lines| lines.join("\n"))
    }
}

impl FileStore for MemoryFileStore {
    fn read_lines(&self, path: &str) -> CursorResult<Vec<String>> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| CursorError::file_not_found(path))
    }

    fn write_lines(&self, path: &str, lines: &[String]) -> CursorResult<()> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), lines.to_vec());
        Ok(())
    }
}

// ============================================================================
// Static Symbol Index
// ============================================================================

/// Symbol index with canned definitions and references.
#[derive(Debug, Default)]
pub struct StaticSymbolIndex {
    definitions: HashMap<String, Position>,
    references: HashMap<String, Vec<Position>>,
}

impl StaticSymbolIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        StaticSymbolIndex::default()
    }

    /// Register the definition site of a symbol.
    pub fn define(&mut self, symbol: impl Into<String>, at: Position) {
        self.definitions.insert(symbol.into(), at);
    }

    /// Register the reference sites of a symbol. Stored sorted so answers
    /// are deterministic regardless of insertion order.
    pub fn refer(&mut self, symbol: impl Into<String>, mut positions: Vec<Position>) {
        positions.sort();
        self.references.insert(symbol.into(), positions);
    }
}

impl SymbolIndex for StaticSymbolIndex {
    fn definition_of(&self, symbol: &str, _at: &Position) -> Option<Position> {
        self.definitions.get(symbol).cloned()
    }

    fn references_of(&self, symbol: &str) -> Vec<Position> {
        self.references.get(symbol).cloned().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryFileStore::new();
        store.insert("a.ts", "one\ntwo");
        assert_eq!(store.read_lines("a.ts").unwrap(), vec!["one", "two"]);
        store
            .write_lines("a.ts", &["three".to_string()])
            .unwrap();
        assert_eq!(store.content("a.ts").unwrap(), "three");
    }

    #[test]
    fn missing_file_is_typed_error() {
        let store = MemoryFileStore::new();
        let err = store.read_lines("absent.ts").unwrap_err();
        assert!(matches!(err, CursorError::FileNotFound { .. }));
    }

    #[test]
    fn static_index_answers_deterministically() {
        let mut index = StaticSymbolIndex::new();
        index.refer(
            "total",
            vec![
                Position::with_column("b.ts", 4, 1),
                Position::with_column("a.ts", 9, 2),
            ],
        );
        let refs = index.references_of("total");
        assert_eq!(refs[0].file_path, "a.ts");
        assert_eq!(refs[1].file_path, "b.ts");
        assert!(index.references_of("unknown").is_empty());
    }
}
