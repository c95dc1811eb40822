//! Core engine for caret.
//!
//! This crate provides the language-agnostic cursor engine:
//! - Line buffers with generations, copy-on-write forking, and atomic
//!   edit groups
//! - Syntax-tree arena and structural navigation
//! - Position tracking with lazy node re-resolution
//! - Transactional code actions
//! - Transform pattern extraction and matching
//! - Heuristic code analysis
//! - Collaborator traits for AST providers, symbol indexes, file stores,
//!   and import conventions

pub mod actions;
pub mod analysis;
pub mod buffer;
pub mod context;
pub mod cursor;
pub mod error;
pub mod fixture;
pub mod ident;
pub mod navigate;
pub mod outline;
pub mod pattern;
pub mod position;
pub mod provider;
pub mod text;
pub mod tree;

pub use actions::CodeAction;
pub use analysis::CodeAnalysis;
pub use context::{Context, ImportReference, ScopeContext};
pub use cursor::{Cursor, Providers};
pub use error::{CursorError, CursorResult, OutputErrorCode};
pub use navigate::CancelToken;
pub use pattern::CodeTransform;
pub use position::Position;
pub use tree::{NodeId, Span, SyntaxTree};
