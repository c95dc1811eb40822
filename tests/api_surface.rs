//! Compile-time contract for the public API surface, plus a smoke test
//! driving the whole stack through the facade crate with a disk store.
//!
//! If this file fails to compile, the public API has regressed.

// Allow unused imports - part of this test is compile-time verification.
#![allow(unused_imports)]

use std::sync::Arc;

// Engine types re-exported at the crate root
use caret::{
    CancelToken, CodeAction, CodeAnalysis, CodeTransform, Context, Cursor, CursorError,
    CursorResult, DiskFileStore, ImportReference, Position, Providers,
};

// Module re-exports
use caret::actions::ActionContext;
use caret::buffer::{EditNotice, LineEdit, SharedBuffer};
use caret::context::{ScopeContext, CONTEXT_WINDOW};
use caret::error::OutputErrorCode;
use caret::fixture::{MemoryFileStore, StaticSymbolIndex};
use caret::outline::OutlineAstProvider;
use caret::pattern::{BindingKind, PlaceholderConstraint};
use caret::provider::{AstProvider, ConventionImportResolver, FileStore, ImportResolver, SymbolIndex};
use caret::tree::{NodeId, Span, SyntaxTree, TreeBuilder};

// CLI surface
use caret::cli::{build_action, parse_location};
use caret::output::{ok_envelope, unified_diff, SCHEMA_VERSION};

// ============================================================================
// Smoke Test Against a Real Workspace
// ============================================================================

#[test]
fn cursor_over_a_disk_workspace() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("app.ts"),
        "function greet(name) {\n  return 'hi ' + name;\n}\n",
    )
    .unwrap();

    let store = DiskFileStore::new(dir.path());
    let providers = Providers::new(Arc::new(store.clone()))
        .with_ast(Arc::new(OutlineAstProvider))
        .with_project_root(dir.path().to_string_lossy().into_owned());
    let mut cursor = Cursor::open(providers, Position::with_column("app.ts", 2, 3)).unwrap();

    // Structural navigation over the parsed outline.
    assert!(cursor.seek_structure("function").unwrap());
    assert_eq!(cursor.position().line, 1);
    let block = cursor.extract_block().unwrap();
    assert!(block.starts_with("function greet"));

    // A mutation plus commit reaches the disk.
    cursor.move_to(Position::new("app.ts", 2)).unwrap();
    cursor.write("  return `hi ${name}`;").unwrap();
    cursor.commit().unwrap();
    let raw = std::fs::read_to_string(dir.path().join("app.ts")).unwrap();
    assert!(raw.contains("`hi ${name}`"));

    // The store lists the workspace's source files.
    assert_eq!(store.list_source_files(), vec!["app.ts"]);
}

#[test]
fn cli_builders_round_trip_the_action_names() {
    let action = build_action("wrapWithTryCatch", None, None, None).unwrap();
    assert_eq!(action.name(), "wrapWithTryCatch");
    let pos = parse_location("src/x.ts:3:1").unwrap();
    assert_eq!(pos.line, 3);
    assert!(!SCHEMA_VERSION.is_empty());
}
