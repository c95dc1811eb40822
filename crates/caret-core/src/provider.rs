//! Collaborator traits: the seams to the outside world.
//!
//! The engine does not parse source text, index symbols, or touch the file
//! system itself. Those concerns arrive through the traits in this module,
//! mirroring how a language adapter plugs into a transformation kernel:
//! collaborators produce data, the cursor owns positions and edits.
//!
//! - [`AstProvider`]: turns text into a [`SyntaxTree`] snapshot
//! - [`SymbolIndex`]: project-wide definitions and references
//! - [`FileStore`]: line-oriented file IO
//! - [`ImportResolver`]: project conventions for import placement
//!
//! Local, unwritten buffer edits are invisible to the [`SymbolIndex`]; the
//! index answers from the last committed (written) state.

use crate::buffer::EditNotice;
use crate::context::ImportReference;
use crate::error::CursorResult;
use crate::position::Position;
use crate::tree::SyntaxTree;

// ============================================================================
// AST Provider
// ============================================================================

/// Produces immutable syntax-tree snapshots for file content.
///
/// A provider that cannot handle a file returns
/// [`CursorError::UnsupportedLanguage`](crate::error::CursorError::UnsupportedLanguage);
/// the cursor then degrades to line-only operation for that file.
pub trait AstProvider: Send + Sync {
    /// Parse full file content (lines joined with `\n`) into a tree.
    fn parse(&self, path: &str, text: &str) -> CursorResult<SyntaxTree>;

    /// Re-parse after a single-line edit.
    ///
    /// The default implementation parses from scratch; providers with
    /// incremental parsers can use `previous` and `edit` to do better.
    fn reparse(
        &self,
        path: &str,
        previous: &SyntaxTree,
        edit: &EditNotice,
        text: &str,
    ) -> CursorResult<SyntaxTree> {
        let _ = (previous, edit);
        self.parse(path, text)
    }
}

// ============================================================================
// Symbol Index
// ============================================================================

/// Project-wide symbol resolution.
///
/// Both queries are soft: a miss is `None` or an empty list, never an error.
/// `references_of` must return a deterministic order for the same index
/// state; conventionally file path, then line, then column.
pub trait SymbolIndex: Send + Sync {
    /// Definition site of `symbol` as seen from `at`.
    fn definition_of(&self, symbol: &str, at: &Position) -> Option<Position>;

    /// Every reference to `symbol` across the project, in index order.
    fn references_of(&self, symbol: &str) -> Vec<Position>;
}

// ============================================================================
// File Store
// ============================================================================

/// Line-oriented file IO.
///
/// Lines carry no terminators. Writing is the commit point: once written,
/// content becomes visible to the symbol index and to newly opened cursors.
pub trait FileStore: Send + Sync {
    /// Read a file as lines.
    fn read_lines(&self, path: &str) -> CursorResult<Vec<String>>;

    /// Write a file from lines.
    fn write_lines(&self, path: &str, lines: &[String]) -> CursorResult<()>;
}

// ============================================================================
// Import Resolver
// ============================================================================

/// Project conventions for where a new import statement belongs.
pub trait ImportResolver: Send + Sync {
    /// 1-indexed line the new import should be inserted *above*.
    fn insertion_point_for(&self, new_import: &ImportReference, existing: &[ImportReference])
        -> u32;
}

/// Default convention: external imports first, relative imports after them,
/// each group in existing order; a new import lands at the end of its group.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionImportResolver;

impl ImportResolver for ConventionImportResolver {
    fn insertion_point_for(
        &self,
        new_import: &ImportReference,
        existing: &[ImportReference],
    ) -> u32 {
        if existing.is_empty() {
            return 1;
        }
        if new_import.is_relative {
            // After the last import of any kind.
            existing.iter().map(|i| i.line).max().unwrap_or(0) + 1
        } else {
            // After the last external import, before the first relative one.
            let last_external = existing
                .iter()
                .filter(|i| !i.is_relative)
                .map(|i| i.line)
                .max();
            match last_external {
                Some(line) => line + 1,
                None => existing.iter().map(|i| i.line).min().unwrap_or(1),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Span;

    fn import(source: &str, line: u32) -> ImportReference {
        ImportReference {
            source: source.to_string(),
            is_relative: source.starts_with('.'),
            symbols: vec!["x".to_string()],
            range: Span::new(0, 0),
            line,
        }
    }

    mod convention_resolver {
        use super::*;

        #[test]
        fn empty_file_inserts_at_top() {
            let resolver = ConventionImportResolver;
            assert_eq!(resolver.insertion_point_for(&import("react", 0), &[]), 1);
        }

        #[test]
        fn external_goes_after_last_external() {
            let resolver = ConventionImportResolver;
            let existing = vec![import("react", 1), import("./local", 2)];
            assert_eq!(
                resolver.insertion_point_for(&import("zod", 0), &existing),
                2
            );
        }

        #[test]
        fn relative_goes_after_everything() {
            let resolver = ConventionImportResolver;
            let existing = vec![import("react", 1), import("./a", 2)];
            assert_eq!(
                resolver.insertion_point_for(&import("./b", 0), &existing),
                3
            );
        }

        #[test]
        fn external_with_only_relative_imports_goes_first() {
            let resolver = ConventionImportResolver;
            let existing = vec![import("./a", 3)];
            assert_eq!(
                resolver.insertion_point_for(&import("react", 0), &existing),
                3
            );
        }
    }
}
