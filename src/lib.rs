//! caret: structural cursor engine
//!
//! A position-aware reference point for code navigation and transformation:
//! cursors track a live location across edits, seek syntactic structure,
//! apply transactional code actions, generalize edits into reusable
//! transform patterns, and fork to explore edit paths independently.

// Core engine - re-exported from caret-core
pub use caret_core::actions;
pub use caret_core::analysis;
pub use caret_core::buffer;
pub use caret_core::context;
pub use caret_core::cursor;
pub use caret_core::error;
pub use caret_core::fixture;
pub use caret_core::navigate;
pub use caret_core::outline;
pub use caret_core::pattern;
pub use caret_core::position;
pub use caret_core::provider;
pub use caret_core::text;
pub use caret_core::tree;

// Front door for the CLI
pub mod cli;
pub mod output;
pub mod store;

// Convenience re-exports of the main types
pub use caret_core::{
    CancelToken, CodeAction, CodeAnalysis, CodeTransform, Context, Cursor, CursorError,
    CursorResult, ImportReference, Position, Providers,
};
pub use store::DiskFileStore;
