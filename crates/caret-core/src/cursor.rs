//! The cursor: a live, position-aware reference point over a source buffer.
//!
//! A cursor owns its [`Position`] and [`Context`], holds a handle to a
//! shared line buffer, and keeps an `Arc`-shared immutable tree snapshot
//! from the AST provider. Mutations go through the buffer as atomic edit
//! groups; every mutation bumps the buffer generation and the cursor
//! re-resolves its node reference and recomputes its context.
//!
//! ## Staleness and reconciliation
//!
//! Sibling cursors (created with [`Cursor::sibling`]) share the live buffer.
//! Each cursor tracks the last generation it synchronized with; at the start
//! of every operation it replays the buffer journal to reconcile its
//! physical line number and re-resolves its node against a fresh snapshot.
//! Node references overlapping an edit are thereby re-resolved lazily, on
//! the next structural query. Read-only accessors that cannot re-resolve
//! ([`Cursor::extract_block`]) fail with `BufferConflict` when they observe
//! a stale generation instead of acting on stale ranges.
//!
//! ## Forks
//!
//! [`Cursor::fork`] deep-copies position and context by value and shares the
//! immutable tree snapshot and line storage (copy-on-write): forking is
//! O(1), and the two cursors are fully independent afterwards.

use std::sync::Arc;

use tracing::debug;

use crate::actions::{self, ActionContext, ActionPlan, CodeAction};
use crate::analysis::{self, CodeAnalysis};
use crate::buffer::{reconcile_line, EditKind, EditNotice, LineEdit, SharedBuffer};
use crate::context::{Context, ImportReference};
use crate::error::{CursorError, CursorResult};
use crate::ident;
use crate::navigate::{self, CancelToken};
use crate::pattern::{self, CodeTransform};
use crate::position::{NodeHandle, Position};
use crate::provider::{
    AstProvider, ConventionImportResolver, FileStore, ImportResolver, SymbolIndex,
};
use crate::text;
use crate::tree::{Span, SyntaxTree};

// ============================================================================
// Providers
// ============================================================================

/// The external collaborators a cursor works with.
///
/// Only the file store is mandatory. Without an AST provider the cursor
/// degrades to line-only operation; without a symbol index the cross-file
/// queries answer with their soft miss values.
#[derive(Clone)]
pub struct Providers {
    ast: Option<Arc<dyn AstProvider>>,
    index: Option<Arc<dyn SymbolIndex>>,
    store: Arc<dyn FileStore>,
    import_resolver: Arc<dyn ImportResolver>,
    project_root: Option<String>,
}

impl Providers {
    /// Create providers over a file store, with no AST provider or index
    /// attached and the convention import resolver.
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Providers {
            ast: None,
            index: None,
            store,
            import_resolver: Arc::new(ConventionImportResolver),
            project_root: None,
        }
    }

    /// Attach an AST provider.
    pub fn with_ast(mut self, ast: Arc<dyn AstProvider>) -> Self {
        self.ast = Some(ast);
        self
    }

    /// Attach a symbol index.
    pub fn with_index(mut self, index: Arc<dyn SymbolIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Replace the import resolver.
    pub fn with_import_resolver(mut self, resolver: Arc<dyn ImportResolver>) -> Self {
        self.import_resolver = resolver;
        self
    }

    /// Set the project root carried into cursor contexts.
    pub fn with_project_root(mut self, root: impl Into<String>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

// ============================================================================
// Internal State
// ============================================================================

/// Immutable tree snapshot pinned to a buffer generation.
#[derive(Clone)]
struct TreeSnapshot {
    tree: Arc<SyntaxTree>,
    generation: u64,
}

/// Before/after record of the most recent applied action, the input to
/// pattern extraction.
#[derive(Debug, Clone)]
struct ActionRecord {
    before_text: String,
    after_text: String,
    applies_to: Vec<String>,
    structures_touched: usize,
}

// ============================================================================
// Cursor
// ============================================================================

/// A live location in a file with structural navigation and editing.
pub struct Cursor {
    providers: Providers,
    buffer: SharedBuffer,
    snapshot: Option<TreeSnapshot>,
    language_supported: bool,
    position: Position,
    context: Context,
    synced_generation: u64,
    last_action: Option<ActionRecord>,
}

impl Cursor {
    /// Open a cursor at a position, reading the file through the store.
    pub fn open(providers: Providers, position: Position) -> CursorResult<Cursor> {
        let lines = providers.store.read_lines(&position.file_path)?;
        let buffer = SharedBuffer::from_lines(&position.file_path, lines);
        let start = Position::new(position.file_path.clone(), 1);
        let mut cursor = Cursor {
            providers,
            buffer,
            snapshot: None,
            language_supported: true,
            context: Context::compute(&[] as &[&str], &start, None, None),
            position: start,
            synced_generation: 0,
            last_action: None,
        };
        cursor.refresh_tree(None)?;
        cursor.move_to(position)?;
        Ok(cursor)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current context snapshot.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Path of the underlying buffer.
    pub fn path(&self) -> String {
        self.buffer.path()
    }

    /// Current buffer generation.
    pub fn generation(&self) -> u64 {
        self.buffer.generation()
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> u32 {
        self.buffer.line_count()
    }

    /// Content-derived snapshot identifier for the buffer.
    pub fn snapshot_id(&self) -> String {
        self.buffer.snapshot_id()
    }

    /// Buffer lines as owned strings (the file-store write boundary).
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lines_vec()
    }

    /// Write the buffer back through the file store, committing local edits
    /// so they become visible to the symbol index and new cursors.
    pub fn commit(&self) -> CursorResult<()> {
        self.providers
            .store
            .write_lines(&self.buffer.path(), &self.buffer.lines_vec())
    }

    // ------------------------------------------------------------------
    // Position Tracking
    // ------------------------------------------------------------------

    /// Move to a position.
    ///
    /// Fails with `PositionOutOfRange` when the line is outside
    /// `[1, line_count]`. Moving to another file re-reads it through the
    /// store (cross-file navigation changes the buffer).
    pub fn move_to(&mut self, position: Position) -> CursorResult<()> {
        if position.file_path != self.buffer.path() {
            let lines = self.providers.store.read_lines(&position.file_path)?;
            self.buffer = SharedBuffer::from_lines(&position.file_path, lines);
            self.synced_generation = self.buffer.generation();
            self.snapshot = None;
            self.language_supported = true;
            self.last_action = None;
            self.refresh_tree(None)?;
        } else {
            self.sync()?;
        }
        let line_count = self.buffer.line_count();
        if position.line == 0 || position.line > line_count {
            return Err(CursorError::out_of_range(position.line, line_count));
        }
        self.position = Position {
            node: None,
            ..position
        };
        self.resolve_node();
        self.recompute_context();
        debug!(position = %self.position, "moved");
        Ok(())
    }

    /// Shift the position by `delta` lines, saturating at the buffer edges.
    ///
    /// Clamping is deliberate: repeated shifts never fail, they stick at
    /// line 1 or the last line.
    pub fn shift_lines(&mut self, delta: i64) -> CursorResult<()> {
        self.sync()?;
        let count = self.buffer.line_count() as i64;
        let target = (i64::from(self.position.line) + delta).clamp(1, count.max(1)) as u32;
        self.position.line = target;
        self.resolve_node();
        self.recompute_context();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Buffer Mutation
    // ------------------------------------------------------------------

    /// Read the current line, verbatim. Callers must not assume anything
    /// about line terminators.
    pub fn read(&mut self) -> CursorResult<String> {
        self.sync()?;
        self.buffer
            .line(self.position.line)
            .ok_or_else(|| CursorError::internal("position line outside buffer"))
    }

    /// Replace the current line.
    pub fn write(&mut self, new_line: impl Into<String>) -> CursorResult<()> {
        self.sync()?;
        let edit = LineEdit::Write {
            line: self.position.line,
            text: new_line.into(),
        };
        self.apply_edits(&[edit]).map(|_| ())
    }

    /// Insert a new line below the current line.
    pub fn insert_below(&mut self, new_line: impl Into<String>) -> CursorResult<()> {
        self.sync()?;
        let edit = LineEdit::InsertBelow {
            line: self.position.line,
            text: new_line.into(),
        };
        self.apply_edits(&[edit]).map(|_| ())
    }

    /// Remove the current line.
    ///
    /// Fails with `BufferConflict` on the last remaining line: a buffer
    /// never drops to zero lines.
    pub fn delete(&mut self) -> CursorResult<()> {
        self.sync()?;
        let edit = LineEdit::Delete {
            line: self.position.line,
        };
        self.apply_edits(&[edit]).map(|_| ())
    }

    // ------------------------------------------------------------------
    // Forking
    // ------------------------------------------------------------------

    /// Fork into an independent cursor.
    ///
    /// Position and context are copied by value; the tree snapshot and line
    /// storage are shared copy-on-write, so the fork is O(1) and subsequent
    /// mutations on either side never affect the other.
    pub fn fork(&self) -> Cursor {
        Cursor {
            providers: self.providers.clone(),
            buffer: self.buffer.fork(),
            snapshot: self.snapshot.clone(),
            language_supported: self.language_supported,
            position: self.position.clone(),
            context: self.context.clone(),
            synced_generation: self.synced_generation,
            last_action: self.last_action.clone(),
        }
    }

    /// A second cursor on the same live buffer.
    ///
    /// Unlike a fork, a sibling observes this cursor's edits (and vice
    /// versa): line numbers reconcile through the buffer journal and edits
    /// require exclusive access to the shared buffer.
    pub fn sibling(&self) -> Cursor {
        Cursor {
            providers: self.providers.clone(),
            buffer: self.buffer.clone(),
            snapshot: self.snapshot.clone(),
            language_supported: self.language_supported,
            position: self.position.clone(),
            context: self.context.clone(),
            synced_generation: self.synced_generation,
            last_action: self.last_action.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Structural Navigation
    // ------------------------------------------------------------------

    /// Seek the nearest structure of a kind; on a hit, move to its start.
    ///
    /// Misses are an expected outcome: the cursor returns `false` and the
    /// position is left untouched.
    pub fn seek_structure(&mut self, node_kind: &str) -> CursorResult<bool> {
        self.seek_structure_cancellable(node_kind, &CancelToken::new())
    }

    /// [`Cursor::seek_structure`] with a cancellation signal checked
    /// between node visits.
    pub fn seek_structure_cancellable(
        &mut self,
        node_kind: &str,
        cancel: &CancelToken,
    ) -> CursorResult<bool> {
        self.sync()?;
        let Some(snapshot) = self.snapshot.clone() else {
            return Ok(false);
        };
        let lines = self.buffer.lines_snapshot();
        let origin = self.position.node.map(|h| h.id);
        let origin_offset = text::position_to_offset(
            lines.as_slice(),
            self.position.line,
            self.position.column.unwrap_or(1),
        );
        let Some(hit) =
            navigate::seek_structure(&snapshot.tree, origin, origin_offset, node_kind, cancel)
        else {
            return Ok(false);
        };
        let (line, column) =
            text::offset_to_position(lines.as_slice(), snapshot.tree.span(hit).start);
        self.position.line = line;
        self.position.column = Some(column);
        self.position.node = Some(NodeHandle::new(hit, snapshot.generation));
        self.recompute_context();
        Ok(true)
    }

    /// Jump to the definition of a symbol (default: the one under the
    /// cursor) via the symbol index. Soft `false` on any miss; on success
    /// the position may move to another file.
    pub fn goto_definition(&mut self, symbol: Option<&str>) -> CursorResult<bool> {
        self.sync()?;
        let Some(index) = self.providers.index.clone() else {
            return Ok(false);
        };
        let Some(symbol) = self.symbol_or_under_cursor(symbol) else {
            return Ok(false);
        };
        let Some(target) = index.definition_of(&symbol, &self.position) else {
            return Ok(false);
        };
        self.move_to(target)?;
        debug!(symbol, "jumped to definition");
        Ok(true)
    }

    /// All references to a symbol (default: the one under the cursor)
    /// across the project index, in the index's deterministic order.
    pub fn find_references(&mut self, symbol: Option<&str>) -> CursorResult<Vec<Position>> {
        self.find_references_cancellable(symbol, &CancelToken::new())
    }

    /// [`Cursor::find_references`] with a cancellation signal; on
    /// cancellation the references accumulated so far are returned.
    pub fn find_references_cancellable(
        &mut self,
        symbol: Option<&str>,
        cancel: &CancelToken,
    ) -> CursorResult<Vec<Position>> {
        self.sync()?;
        let Some(index) = self.providers.index.clone() else {
            return Ok(Vec::new());
        };
        let Some(symbol) = self.symbol_or_under_cursor(symbol) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for position in index.references_of(&symbol) {
            if cancel.is_cancelled() {
                break;
            }
            out.push(position);
        }
        Ok(out)
    }

    /// Move to the nearest enclosing scope boundary (function, class,
    /// block). Returns `false` at module scope.
    pub fn navigate_to_enclosing_scope(&mut self) -> CursorResult<bool> {
        self.sync()?;
        let Some(snapshot) = self.snapshot.clone() else {
            return Ok(false);
        };
        let Some(handle) = self.position.node else {
            return Ok(false);
        };
        let Some(scope) = navigate::enclosing_scope(&snapshot.tree, handle.id) else {
            return Ok(false);
        };
        let lines = self.buffer.lines_snapshot();
        let (line, column) =
            text::offset_to_position(lines.as_slice(), snapshot.tree.span(scope).start);
        self.position.line = line;
        self.position.column = Some(column);
        self.position.node = Some(NodeHandle::new(scope, snapshot.generation));
        self.recompute_context();
        Ok(true)
    }

    /// Whether the current position sits inside a JSX subtree. Pure read;
    /// `false` when the dialect is absent.
    pub fn is_in_jsx(&self) -> bool {
        let (Some(snapshot), Some(handle)) = (&self.snapshot, self.position.node) else {
            return false;
        };
        navigate::in_jsx(&snapshot.tree, handle.id)
    }

    /// Nearest parent component name when inside JSX. Pure read; `None`
    /// when the dialect is absent.
    pub fn parent_component(&self) -> Option<String> {
        let (Some(snapshot), Some(handle)) = (&self.snapshot, self.position.node) else {
            return None;
        };
        let lines = self.buffer.lines_snapshot();
        navigate::parent_component(&snapshot.tree, lines.as_slice(), handle.id)
    }

    /// Extract the source text of the current node's range, byte-exact.
    ///
    /// Read-only: when the cached node predates the buffer generation this
    /// fails with `BufferConflict` instead of extracting stale ranges; the
    /// caller re-`move_to`s to resynchronize. Falls back to the current
    /// line in line-only mode.
    pub fn extract_block(&self) -> CursorResult<String> {
        let generation = self.buffer.generation();
        match (&self.snapshot, self.position.node) {
            (Some(snapshot), Some(handle)) => {
                if handle.is_stale(generation) || snapshot.generation != generation {
                    return Err(CursorError::stale_generation(handle.generation, generation));
                }
                let lines = self.buffer.lines_snapshot();
                text::extract_span(lines.as_slice(), snapshot.tree.span(handle.id))
                    .ok_or_else(|| CursorError::internal("node span outside buffer"))
            }
            _ => self
                .buffer
                .line(self.position.line)
                .ok_or_else(|| CursorError::internal("position line outside buffer")),
        }
    }

    // ------------------------------------------------------------------
    // Code Actions
    // ------------------------------------------------------------------

    /// Apply a named code action at the current position.
    ///
    /// Returns `Ok(false)` when the action's structural precondition does
    /// not hold. All edits of one action apply as a single atomic group;
    /// a mid-group failure rolls back every edit already applied.
    pub fn apply_action(&mut self, action: &CodeAction) -> CursorResult<bool> {
        self.sync()?;
        let lines = self.buffer.lines_snapshot();
        let plan = {
            let ctx = ActionContext {
                lines: lines.as_slice(),
                tree: self.snapshot.as_ref().map(|s| s.tree.as_ref()),
                node: self.position.node.map(|h| h.id),
                position: &self.position,
                imports: &self.context.imports,
            };
            actions::plan(action, &ctx)?
        };
        let Some(plan) = plan else {
            debug!(action = action.name(), "action precondition not met");
            return Ok(false);
        };
        if plan.edits.is_empty() {
            return Ok(false);
        }

        let (min_line, max_line) = edit_line_range(&plan, self.position.line);
        let before_text = slice_lines_text(lines.as_slice(), min_line, max_line);
        let (applies_to, structures_touched) =
            self.structures_for_range(lines.as_slice(), min_line, max_line);

        let notices = self.apply_edits(&plan.edits)?;

        let net: i64 = notices
            .iter()
            .map(|n| match n.kind {
                EditKind::Inserted => 1,
                EditKind::Deleted => -1,
                EditKind::Wrote => 0,
            })
            .sum();
        let after_lines = self.buffer.lines_snapshot();
        let after_max = (i64::from(max_line) + net).max(i64::from(min_line)) as u32;
        let after_text = slice_lines_text(after_lines.as_slice(), min_line, after_max);

        self.last_action = Some(ActionRecord {
            before_text,
            after_text,
            applies_to,
            structures_touched,
        });
        debug!(action = action.name(), summary = %plan.summary, "action applied");
        Ok(true)
    }

    /// Imports relevant to the current context, in source order.
    pub fn get_imports(&mut self) -> CursorResult<Vec<ImportReference>> {
        self.sync()?;
        Ok(self.context.imports.clone())
    }

    /// Add an import following project conventions.
    ///
    /// Merges into an existing import of the same source; returns
    /// `Ok(false)` when every symbol is already imported.
    pub fn add_import(&mut self, source: &str, symbols: &[String]) -> CursorResult<bool> {
        self.sync()?;
        let lines = self.buffer.lines_snapshot();
        let plan = {
            let ctx = ActionContext {
                lines: lines.as_slice(),
                tree: self.snapshot.as_ref().map(|s| s.tree.as_ref()),
                node: self.position.node.map(|h| h.id),
                position: &self.position,
                imports: &self.context.imports,
            };
            actions::plan_add_import(
                &ctx,
                self.providers.import_resolver.as_ref(),
                source,
                symbols,
            )?
        };
        let Some(plan) = plan else {
            return Ok(false);
        };
        self.apply_edits(&plan.edits)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Analysis and Patterns
    // ------------------------------------------------------------------

    /// Run the heuristic analysis battery over the current subtree.
    ///
    /// Never fails and never mutates; an empty report is a valid result.
    pub fn analyze_code(&mut self) -> CodeAnalysis {
        // A sync failure only narrows analysis to line-only scope.
        let _ = self.sync();
        let lines = self.buffer.lines_snapshot();
        analysis::analyze(
            lines.as_slice(),
            self.snapshot.as_ref().map(|s| s.tree.as_ref()),
            self.position.node.map(|h| h.id),
            self.position.line,
        )
    }

    /// Generalize the most recent applied action into a reusable transform.
    ///
    /// Without a prior action, the current extracted block becomes a no-op
    /// template. Fails with `PatternGenerationFailure` when the recorded
    /// edit spans multiple unrelated top-level structures.
    pub fn create_transform_pattern(&mut self) -> CursorResult<CodeTransform> {
        self.sync()?;
        match &self.last_action {
            Some(record) => {
                if record.structures_touched > 1 {
                    return Err(CursorError::PatternGenerationFailure {
                        reason: format!(
                            "edit spans {} unrelated top-level structures",
                            record.structures_touched
                        ),
                    });
                }
                pattern::generalize(
                    &record.before_text,
                    &record.after_text,
                    record.applies_to.clone(),
                )
            }
            None => {
                let block = self.extract_block()?;
                let applies_to = match (&self.snapshot, self.position.node) {
                    (Some(snapshot), Some(handle)) => {
                        vec![snapshot.tree.kind(handle.id).to_string()]
                    }
                    _ => Vec::new(),
                };
                Ok(pattern::no_op_template(&block, applies_to))
            }
        }
    }

    // ------------------------------------------------------------------
    // Internal Machinery
    // ------------------------------------------------------------------

    /// Reconcile against sibling edits, refresh the tree snapshot if the
    /// generation moved, and re-resolve the node reference.
    fn sync(&mut self) -> CursorResult<()> {
        let notices = self.buffer.journal_since(self.synced_generation);
        if !notices.is_empty() {
            self.position.line =
                reconcile_line(self.position.line, &notices, self.buffer.line_count());
        }
        self.synced_generation = self.buffer.generation();
        let fresh = self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.generation == self.buffer.generation());
        if !fresh {
            self.refresh_tree(None)?;
        }
        self.resolve_node();
        self.recompute_context();
        Ok(())
    }

    /// Apply an edit group and bring the cursor's view up to date.
    fn apply_edits(&mut self, edits: &[LineEdit]) -> CursorResult<Vec<EditNotice>> {
        let notices = self.buffer.apply(edits)?;
        self.position.line =
            reconcile_line(self.position.line, &notices, self.buffer.line_count());
        self.synced_generation = self.buffer.generation();
        self.refresh_tree(notices.last())?;
        self.resolve_node();
        self.recompute_context();
        Ok(notices)
    }

    /// Re-parse the buffer, incrementally when the provider supports it.
    fn refresh_tree(&mut self, edit: Option<&EditNotice>) -> CursorResult<()> {
        let Some(ast) = self.providers.ast.clone() else {
            self.snapshot = None;
            return Ok(());
        };
        if !self.language_supported {
            self.snapshot = None;
            return Ok(());
        }
        let content = self.buffer.content();
        let path = self.buffer.path();
        let generation = self.buffer.generation();
        let parsed = match (&self.snapshot, edit) {
            (Some(previous), Some(edit)) => ast.reparse(&path, &previous.tree, edit, &content),
            _ => ast.parse(&path, &content),
        };
        match parsed {
            Ok(tree) => {
                self.snapshot = Some(TreeSnapshot {
                    tree: Arc::new(tree),
                    generation,
                });
            }
            Err(CursorError::UnsupportedLanguage { .. }) => {
                debug!(path = %path, "provider refused file, degrading to line-only mode");
                self.language_supported = false;
                self.snapshot = None;
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    /// Resolve the smallest node containing the position, if any.
    fn resolve_node(&mut self) {
        self.position.node = None;
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let lines = self.buffer.lines_snapshot();
        let offset = text::position_to_offset(
            lines.as_slice(),
            self.position.line,
            self.position.column.unwrap_or(1),
        );
        if let Some(id) = snapshot.tree.node_at(offset) {
            self.position.node = Some(NodeHandle::new(id, snapshot.generation));
        }
    }

    fn recompute_context(&mut self) {
        let lines = self.buffer.lines_snapshot();
        let tree = self.snapshot.as_ref().map(|s| s.tree.as_ref());
        self.context = Context::compute(
            lines.as_slice(),
            &self.position,
            tree,
            self.providers.project_root.as_deref(),
        );
    }

    fn symbol_or_under_cursor(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(symbol) = explicit {
            return Some(symbol.to_string());
        }
        let line = &self.context.current_line;
        self.position
            .column
            .and_then(|col| ident::word_at_column(line, col))
            .or_else(|| ident::declared_name(line))
            .or_else(|| ident::first_identifier(line))
    }

    /// Top-level structures overlapping a line range and their kinds.
    fn structures_for_range(
        &self,
        lines: &[Arc<str>],
        start_line: u32,
        end_line: u32,
    ) -> (Vec<String>, usize) {
        let Some(snapshot) = &self.snapshot else {
            return (Vec::new(), 1);
        };
        let Some(start) = text::line_start_offset(lines, start_line) else {
            return (Vec::new(), 1);
        };
        let end = text::line_span(lines, end_line)
            .map(|s| s.end)
            .unwrap_or(start);
        let covering = snapshot.tree.top_level_covering(Span::new(start, end.max(start)));
        let kinds = covering
            .iter()
            .map(|&id| snapshot.tree.kind(id).to_string())
            .collect();
        (kinds, covering.len().max(1))
    }
}

/// Line range an edit plan touches (insert-below edits land one line down).
fn edit_line_range(plan: &ActionPlan, fallback: u32) -> (u32, u32) {
    let min = plan
        .edits
        .iter()
        .map(LineEdit::line)
        .min()
        .unwrap_or(fallback);
    let max = plan
        .edits
        .iter()
        .map(|e| match e {
            LineEdit::InsertBelow { line, .. } => *line + 1,
            other => other.line(),
        })
        .max()
        .unwrap_or(fallback);
    (min, max)
}

fn slice_lines_text(lines: &[Arc<str>], start: u32, end: u32) -> String {
    let s = (start.max(1) as usize - 1).min(lines.len());
    let e = (end as usize).min(lines.len()).max(s);
    lines[s..e]
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================
