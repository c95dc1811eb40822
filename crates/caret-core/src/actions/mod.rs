//! Code actions: named, transactional edit routines.
//!
//! Every action is a variant of [`CodeAction`], carrying exactly the options
//! that action needs; tag and payload cannot disagree by construction. An
//! action *plans* first (a pure function of the buffer snapshot and the
//! current node) and the cursor applies the planned edits as one atomic
//! group, so a failure mid-plan or mid-apply never leaves a half-edited
//! buffer.
//!
//! Planning returns `Ok(None)` when the structural precondition is not met
//! (the soft "did not apply" outcome) and a typed error only for invalid
//! input such as a malformed identifier.
//!
//! Scoping rule: [`CodeAction::OrganizeImports`] and
//! [`CodeAction::FixAllLintProblems`] may touch lines anywhere in the file;
//! every other action stays within the current node's line range.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::buffer::LineEdit;
use crate::context::ImportReference;
use crate::error::CursorResult;
use crate::position::Position;
use crate::text;
use crate::tree::{NodeId, SyntaxTree};

mod convert;
mod extract;
mod imports;
mod inline;
mod lint;

pub use imports::plan_add_import;

// ============================================================================
// Action Union
// ============================================================================

/// The closed set of code actions, one variant per action with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CodeAction {
    /// Extract the expression under the cursor into a named binding.
    #[serde(rename_all = "camelCase")]
    ExtractVariable { name: String },
    /// Extract the statement(s) under the cursor into a named function.
    #[serde(rename_all = "camelCase")]
    ExtractFunction { name: String },
    /// Inline a single-use local binding into its use site.
    InlineVariable,
    /// Rename the symbol under the cursor within its scope.
    #[serde(rename_all = "camelCase")]
    RenameSymbol { new_name: String },
    /// Reorder and deduplicate the import block.
    OrganizeImports,
    /// Apply the fixed battery of mechanical lint fixes file-wide.
    FixAllLintProblems,
    /// Rewrite a `function` declaration as a `const` arrow function.
    ConvertToArrowFunction,
    /// Wrap the statement(s) under the cursor in try/catch.
    WrapWithTryCatch,
    /// Add a type annotation to the binding under the cursor.
    #[serde(rename_all = "camelCase")]
    AddTypeAnnotation { annotation: String },
    /// Remove the client directive from the module.
    ConvertToServerComponent,
    /// Add the client directive to the module.
    ConvertToClientComponent,
    /// Extract hook-calling statements into a custom hook.
    #[serde(rename_all = "camelCase")]
    ExtractToCustomHook { name: String },
    /// Annotate untyped function parameters.
    ConvertToTypeScript,
    /// Replace a `useState` binding with a reducer.
    RefactorToUseReducer,
    /// Replace a `useState` binding with context access.
    #[serde(rename = "refactorToContextAPI", rename_all = "camelCase")]
    RefactorToContextApi { context_name: String },
    /// Drop unused import symbols and statements.
    OptimizeImports,
    /// Extract the JSX element under the cursor into a shared component.
    #[serde(rename_all = "camelCase")]
    ExtractToSharedComponent { name: String },
}

impl CodeAction {
    /// Public action name (the serialization tag).
    pub fn name(&self) -> &'static str {
        match self {
            CodeAction::ExtractVariable { .. } => "extractVariable",
            CodeAction::ExtractFunction { .. } => "extractFunction",
            CodeAction::InlineVariable => "inlineVariable",
            CodeAction::RenameSymbol { .. } => "renameSymbol",
            CodeAction::OrganizeImports => "organizeImports",
            CodeAction::FixAllLintProblems => "fixAllLintProblems",
            CodeAction::ConvertToArrowFunction => "convertToArrowFunction",
            CodeAction::WrapWithTryCatch => "wrapWithTryCatch",
            CodeAction::AddTypeAnnotation { .. } => "addTypeAnnotation",
            CodeAction::ConvertToServerComponent => "convertToServerComponent",
            CodeAction::ConvertToClientComponent => "convertToClientComponent",
            CodeAction::ExtractToCustomHook { .. } => "extractToCustomHook",
            CodeAction::ConvertToTypeScript => "convertToTypeScript",
            CodeAction::RefactorToUseReducer => "refactorToUseReducer",
            CodeAction::RefactorToContextApi { .. } => "refactorToContextAPI",
            CodeAction::OptimizeImports => "optimizeImports",
            CodeAction::ExtractToSharedComponent { .. } => "extractToSharedComponent",
        }
    }

    /// Whether the action may edit lines outside the current node's range.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            CodeAction::OrganizeImports | CodeAction::FixAllLintProblems
        )
    }
}

// ============================================================================
// Planning
// ============================================================================

/// Read-only view of the cursor state an action plans against.
pub struct ActionContext<'a> {
    /// Buffer lines at the current generation.
    pub lines: &'a [Arc<str>],
    /// Tree snapshot, absent in line-only mode.
    pub tree: Option<&'a SyntaxTree>,
    /// Resolved node under the cursor, absent in line-only mode or gaps.
    pub node: Option<NodeId>,
    /// Current position.
    pub position: &'a Position,
    /// Imports in the file, in source order.
    pub imports: &'a [ImportReference],
}

impl ActionContext<'_> {
    /// Text of the current line.
    pub fn current_line(&self) -> &str {
        self.lines
            .get(self.position.line as usize - 1)
            .map(|l| l.as_ref())
            .unwrap_or("")
    }

    /// Total line count.
    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }
}

/// A planned, not-yet-applied action: the edit list plus a summary.
#[derive(Debug, Clone)]
pub struct ActionPlan {
    /// Edits to apply in order, as one atomic group.
    pub edits: Vec<LineEdit>,
    /// Human-readable description of what the action will do.
    pub summary: String,
}

/// Plan an action against the current cursor state.
///
/// `Ok(None)` means the structural precondition did not hold; the action
/// "fails to apply" without an error. Typed errors are reserved for invalid
/// options (malformed identifiers) and internal failures.
pub fn plan(action: &CodeAction, ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    match action {
        CodeAction::ExtractVariable { name } => extract::extract_variable(ctx, name),
        CodeAction::ExtractFunction { name } => extract::extract_function(ctx, name),
        CodeAction::InlineVariable => inline::inline_variable(ctx),
        CodeAction::RenameSymbol { new_name } => inline::rename_symbol(ctx, new_name),
        CodeAction::OrganizeImports => imports::organize_imports(ctx),
        CodeAction::FixAllLintProblems => lint::fix_all_lint_problems(ctx),
        CodeAction::ConvertToArrowFunction => convert::to_arrow_function(ctx),
        CodeAction::WrapWithTryCatch => convert::wrap_with_try_catch(ctx),
        CodeAction::AddTypeAnnotation { annotation } => convert::add_type_annotation(ctx, annotation),
        CodeAction::ConvertToServerComponent => convert::to_server_component(ctx),
        CodeAction::ConvertToClientComponent => convert::to_client_component(ctx),
        CodeAction::ExtractToCustomHook { name } => extract::extract_to_custom_hook(ctx, name),
        CodeAction::ConvertToTypeScript => convert::to_typescript(ctx),
        CodeAction::RefactorToUseReducer => convert::to_use_reducer(ctx),
        CodeAction::RefactorToContextApi { context_name } => {
            convert::to_context_api(ctx, context_name)
        }
        CodeAction::OptimizeImports => imports::optimize_imports(ctx),
        CodeAction::ExtractToSharedComponent { name } => {
            extract::extract_to_shared_component(ctx, name)
        }
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Statement-like kinds actions operate on when extracting or wrapping.
pub(crate) fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement")
        || matches!(
            kind,
            "statement_block" | "lexical_declaration" | "variable_declaration"
        )
}

/// The statement-like node the cursor sits in: the nearest statement
/// ancestor, falling back to the current line when there is no tree.
///
/// Returns the 1-indexed line range of the target.
pub(crate) fn target_statement_range(ctx: &ActionContext<'_>) -> (u32, u32) {
    if let (Some(tree), Some(node)) = (ctx.tree, ctx.node) {
        if let Some(stmt) = tree.ancestor_or_self(node, |n| is_statement_kind(&n.kind)) {
            return text::span_to_line_range(ctx.lines, tree.span(stmt));
        }
    }
    (ctx.position.line, ctx.position.line)
}

// ============================================================================
// Tests
// ============================================================================
