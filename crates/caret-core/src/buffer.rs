//! Line buffers: copy-on-write storage, generations, atomic edit groups.
//!
//! A buffer is a list of lines (no terminators) behind a mutex; one writer at
//! a time per buffer. Every edit bumps a monotonically increasing generation
//! counter and appends a journal record so sibling cursors on the same buffer
//! can reconcile their physical line numbers lazily, at their next access.
//! Propagation is synchronous within the process: siblings share the core, so
//! an edit is observable the moment the lock is released.
//!
//! Line storage is `Arc<Vec<Arc<str>>>`: forking a buffer clones one `Arc`
//! (O(1)); the first mutation after a fork copies only the pointer vector and
//! the touched line.
//!
//! Edit groups are all-or-nothing. [`SharedBuffer::apply`] validates and
//! applies a batch under one lock acquisition and restores the pre-batch
//! state if any edit in the batch fails, so a multi-edit code action can
//! never leave a half-applied buffer behind.

use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CursorError, CursorResult};

// ============================================================================
// Edits
// ============================================================================

/// A single-line edit against a buffer.
///
/// Lines are 1-indexed. `InsertAbove` exists for planned edits (actions
/// insert declarations above the cursor line); the cursor surface itself
/// only exposes write/insert-below/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit {
    /// Replace the text of `line`.
    Write { line: u32, text: String },
    /// Insert a new line above `line`.
    InsertAbove { line: u32, text: String },
    /// Insert a new line below `line`.
    InsertBelow { line: u32, text: String },
    /// Remove `line`.
    Delete { line: u32 },
}

impl LineEdit {
    /// The 1-indexed line the edit targets.
    pub fn line(&self) -> u32 {
        match self {
            LineEdit::Write { line, .. }
            | LineEdit::InsertAbove { line, .. }
            | LineEdit::InsertBelow { line, .. }
            | LineEdit::Delete { line } => *line,
        }
    }
}

/// What an applied edit did to the line structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// A line's text was replaced; no line numbers shifted.
    Wrote,
    /// A line now exists at `line`; lines at or below it shifted down by one.
    Inserted,
    /// The line at `line` was removed; lines below it shifted up by one.
    Deleted,
}

/// Journal record of one applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditNotice {
    /// Generation the buffer reached when this edit applied.
    pub generation: u64,
    /// Line the edit landed on (post-edit index for inserts).
    pub line: u32,
    /// Structural effect of the edit.
    pub kind: EditKind,
}

/// Reconcile a cursor's physical line number against journal records.
///
/// Applies the shift rules from the buffer contract: an insert at line `L`
/// shifts positions at or below `L` down by one; a delete of line `L` shifts
/// positions strictly below `L` up by one and clamps a position sitting on
/// the deleted line itself. Writes shift nothing.
pub fn reconcile_line(mut line: u32, notices: &[EditNotice], line_count: u32) -> u32 {
    for notice in notices {
        match notice.kind {
            EditKind::Wrote => {}
            EditKind::Inserted => {
                if line >= notice.line {
                    line += 1;
                }
            }
            EditKind::Deleted => {
                if line > notice.line {
                    line -= 1;
                }
            }
        }
    }
    line.clamp(1, line_count.max(1))
}

// ============================================================================
// Buffer Core
// ============================================================================

#[derive(Debug)]
struct BufferCore {
    path: String,
    lines: Arc<Vec<Arc<str>>>,
    generation: u64,
    journal: Vec<EditNotice>,
}

impl BufferCore {
    fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    fn check_line(&self, line: u32) -> CursorResult<()> {
        if line == 0 || line > self.line_count() {
            return Err(CursorError::out_of_range(line, self.line_count()));
        }
        Ok(())
    }

    fn apply_one(&mut self, edit: &LineEdit) -> CursorResult<EditNotice> {
        self.check_line(edit.line())?;
        let (landed, kind) = match edit {
            LineEdit::Write { line, text } => {
                let lines = Arc::make_mut(&mut self.lines);
                lines[*line as usize - 1] = Arc::from(text.as_str());
                (*line, EditKind::Wrote)
            }
            LineEdit::InsertAbove { line, text } => {
                let lines = Arc::make_mut(&mut self.lines);
                lines.insert(*line as usize - 1, Arc::from(text.as_str()));
                (*line, EditKind::Inserted)
            }
            LineEdit::InsertBelow { line, text } => {
                let lines = Arc::make_mut(&mut self.lines);
                lines.insert(*line as usize, Arc::from(text.as_str()));
                (*line + 1, EditKind::Inserted)
            }
            LineEdit::Delete { line } => {
                if self.lines.len() == 1 {
                    return Err(CursorError::conflict(
                        "cannot delete the last remaining line",
                    ));
                }
                let lines = Arc::make_mut(&mut self.lines);
                lines.remove(*line as usize - 1);
                (*line, EditKind::Deleted)
            }
        };
        self.generation += 1;
        let notice = EditNotice {
            generation: self.generation,
            line: landed,
            kind,
        };
        self.journal.push(notice);
        Ok(notice)
    }
}

// ============================================================================
// Shared Buffer
// ============================================================================

/// Handle to a buffer shared by sibling cursors.
///
/// Cloning the handle shares the live buffer (multi-cursor); [`SharedBuffer::fork`]
/// produces an independent logical buffer over the same storage (copy-on-write).
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    inner: Arc<Mutex<BufferCore>>,
}

impl SharedBuffer {
    /// Create a buffer from file-store lines.
    ///
    /// A file with no lines is represented as a single empty line so the
    /// last-line invariant holds from the start.
    pub fn from_lines(path: impl Into<String>, lines: Vec<String>) -> Self {
        let lines: Vec<Arc<str>> = if lines.is_empty() {
            vec![Arc::from("")]
        } else {
            lines.into_iter().map(|l| Arc::from(l.as_str())).collect()
        };
        SharedBuffer {
            inner: Arc::new(Mutex::new(BufferCore {
                path: path.into(),
                lines: Arc::new(lines),
                generation: 0,
                journal: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferCore> {
        // A poisoned mutex means a panic mid-edit; the core is still
        // structurally valid (edits are single statements), so continue.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Buffer file path.
    pub fn path(&self) -> String {
        self.lock().path.clone()
    }

    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> u32 {
        self.lock().line_count()
    }

    /// Text of a 1-indexed line, verbatim: callers must not assume anything
    /// about line terminators, the buffer stores none.
    pub fn line(&self, line: u32) -> Option<String> {
        let core = self.lock();
        core.lines.get(line as usize - 1).map(|l| l.to_string())
    }

    /// Cheap snapshot of the line storage at the current generation.
    pub fn lines_snapshot(&self) -> Arc<Vec<Arc<str>>> {
        Arc::clone(&self.lock().lines)
    }

    /// Lines as owned strings (for the file store boundary).
    pub fn lines_vec(&self) -> Vec<String> {
        self.lock().lines.iter().map(|l| l.to_string()).collect()
    }

    /// Full content with lines joined by `\n`.
    pub fn content(&self) -> String {
        let core = self.lock();
        let mut out = String::new();
        for (i, l) in core.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(l);
        }
        out
    }

    /// SHA-256 content hash, hex-encoded.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Short snapshot identifier derived from the content hash.
    pub fn snapshot_id(&self) -> String {
        let hash = self.content_hash();
        format!("snap_{}", &hash[..16])
    }

    /// Apply a batch of edits as one logical unit, all-or-nothing.
    ///
    /// Edits apply in order; each bumps the generation by exactly 1. Line
    /// numbers in later edits must account for shifts caused by earlier ones.
    /// If any edit fails, every already-applied edit is rolled back, the
    /// generation and journal are restored, and the error is returned.
    pub fn apply(&self, edits: &[LineEdit]) -> CursorResult<Vec<EditNotice>> {
        let mut core = self.lock();
        let saved_lines = Arc::clone(&core.lines);
        let saved_generation = core.generation;
        let saved_journal = core.journal.len();

        let mut notices = Vec::with_capacity(edits.len());
        for edit in edits {
            match core.apply_one(edit) {
                Ok(notice) => notices.push(notice),
                Err(err) => {
                    core.lines = saved_lines;
                    core.generation = saved_generation;
                    core.journal.truncate(saved_journal);
                    debug!(path = %core.path, ?edit, %err, "edit group rolled back");
                    return Err(err);
                }
            }
        }
        debug!(
            path = %core.path,
            edits = edits.len(),
            generation = core.generation,
            "edit group applied"
        );
        Ok(notices)
    }

    /// Journal records strictly after the given generation.
    pub fn journal_since(&self, generation: u64) -> Vec<EditNotice> {
        self.lock()
            .journal
            .iter()
            .copied()
            .filter(|n| n.generation > generation)
            .collect()
    }

    /// Fork into an independent logical buffer sharing the line storage.
    ///
    /// O(1): the storage `Arc` is shared until either side mutates. The fork
    /// starts with the origin's generation and an empty journal; the two
    /// buffers never observe each other's edits afterwards.
    pub fn fork(&self) -> SharedBuffer {
        let core = self.lock();
        SharedBuffer {
            inner: Arc::new(Mutex::new(BufferCore {
                path: core.path.clone(),
                lines: Arc::clone(&core.lines),
                generation: core.generation,
                journal: Vec::new(),
            })),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> SharedBuffer {
        SharedBuffer::from_lines("test.ts", lines.iter().map(|s| s.to_string()).collect())
    }

    mod single_edits {
        use super::*;

        #[test]
        fn write_then_line_returns_exact_text() {
            let buf = buffer(&["a", "b"]);
            buf.apply(&[LineEdit::Write {
                line: 2,
                text: "replaced".to_string(),
            }])
            .unwrap();
            assert_eq!(buf.line(2).unwrap(), "replaced");
            assert_eq!(buf.generation(), 1);
        }

        #[test]
        fn insert_below_shifts_following_lines() {
            let buf = buffer(&["a", "c"]);
            buf.apply(&[LineEdit::InsertBelow {
                line: 1,
                text: "b".to_string(),
            }])
            .unwrap();
            assert_eq!(buf.lines_vec(), vec!["a", "b", "c"]);
        }

        #[test]
        fn insert_above_first_line() {
            let buf = buffer(&["b"]);
            buf.apply(&[LineEdit::InsertAbove {
                line: 1,
                text: "a".to_string(),
            }])
            .unwrap();
            assert_eq!(buf.lines_vec(), vec!["a", "b"]);
        }

        #[test]
        fn delete_removes_line() {
            let buf = buffer(&["a", "b", "c"]);
            buf.apply(&[LineEdit::Delete { line: 2 }]).unwrap();
            assert_eq!(buf.lines_vec(), vec!["a", "c"]);
        }

        #[test]
        fn delete_last_remaining_line_is_a_conflict() {
            let buf = buffer(&["only"]);
            let err = buf.apply(&[LineEdit::Delete { line: 1 }]).unwrap_err();
            assert!(matches!(err, CursorError::BufferConflict { .. }));
            assert_eq!(buf.lines_vec(), vec!["only"]);
            assert_eq!(buf.generation(), 0);
        }

        #[test]
        fn out_of_range_line_rejected() {
            let buf = buffer(&["a"]);
            let err = buf
                .apply(&[LineEdit::Write {
                    line: 5,
                    text: "x".to_string(),
                }])
                .unwrap_err();
            assert!(matches!(err, CursorError::PositionOutOfRange { .. }));
        }
    }

    mod edit_groups {
        use super::*;

        #[test]
        fn each_edit_bumps_generation_by_one() {
            let buf = buffer(&["a", "b"]);
            buf.apply(&[
                LineEdit::Write {
                    line: 1,
                    text: "x".to_string(),
                },
                LineEdit::InsertBelow {
                    line: 1,
                    text: "y".to_string(),
                },
            ])
            .unwrap();
            assert_eq!(buf.generation(), 2);
        }

        #[test]
        fn failing_batch_rolls_back_everything() {
            let buf = buffer(&["a", "b"]);
            let err = buf
                .apply(&[
                    LineEdit::Write {
                        line: 1,
                        text: "x".to_string(),
                    },
                    LineEdit::Delete { line: 99 },
                ])
                .unwrap_err();
            assert!(matches!(err, CursorError::PositionOutOfRange { .. }));
            assert_eq!(buf.lines_vec(), vec!["a", "b"], "first edit undone");
            assert_eq!(buf.generation(), 0, "generation restored");
            assert!(buf.journal_since(0).is_empty(), "journal restored");
        }
    }

    mod reconciliation {
        use super::*;

        #[test]
        fn insert_shifts_positions_at_or_below() {
            let buf = buffer(&["a", "b", "c"]);
            buf.apply(&[LineEdit::InsertBelow {
                line: 1,
                text: "new".to_string(),
            }])
            .unwrap();
            let journal = buf.journal_since(0);
            assert_eq!(reconcile_line(1, &journal, buf.line_count()), 1);
            assert_eq!(reconcile_line(2, &journal, buf.line_count()), 3);
            assert_eq!(reconcile_line(3, &journal, buf.line_count()), 4);
        }

        #[test]
        fn delete_shifts_positions_below_and_clamps_on_line() {
            let buf = buffer(&["a", "b", "c"]);
            buf.apply(&[LineEdit::Delete { line: 2 }]).unwrap();
            let journal = buf.journal_since(0);
            assert_eq!(reconcile_line(1, &journal, buf.line_count()), 1);
            assert_eq!(reconcile_line(2, &journal, buf.line_count()), 2);
            assert_eq!(reconcile_line(3, &journal, buf.line_count()), 2);
        }

        #[test]
        fn write_shifts_nothing() {
            let buf = buffer(&["a", "b"]);
            buf.apply(&[LineEdit::Write {
                line: 1,
                text: "x".to_string(),
            }])
            .unwrap();
            let journal = buf.journal_since(0);
            assert_eq!(reconcile_line(2, &journal, buf.line_count()), 2);
        }
    }

    mod forking {
        use super::*;

        #[test]
        fn fork_shares_until_mutation() {
            let buf = buffer(&["a", "b"]);
            let fork = buf.fork();
            fork.apply(&[LineEdit::Write {
                line: 1,
                text: "forked".to_string(),
            }])
            .unwrap();
            assert_eq!(buf.line(1).unwrap(), "a", "origin unchanged");
            assert_eq!(fork.line(1).unwrap(), "forked");
            assert_eq!(buf.generation(), 0);
            assert_eq!(fork.generation(), 1);
        }

        #[test]
        fn origin_mutation_does_not_reach_fork() {
            let buf = buffer(&["a"]);
            let fork = buf.fork();
            buf.apply(&[LineEdit::Write {
                line: 1,
                text: "origin".to_string(),
            }])
            .unwrap();
            assert_eq!(fork.line(1).unwrap(), "a");
        }

        #[test]
        fn siblings_share_the_live_buffer() {
            let buf = buffer(&["a"]);
            let sibling = buf.clone();
            sibling
                .apply(&[LineEdit::Write {
                    line: 1,
                    text: "shared".to_string(),
                }])
                .unwrap();
            assert_eq!(buf.line(1).unwrap(), "shared");
        }
    }

    mod snapshots {
        use super::*;

        #[test]
        fn snapshot_id_is_content_derived() {
            let a = buffer(&["same"]);
            let b = buffer(&["same"]);
            let c = buffer(&["different"]);
            assert_eq!(a.snapshot_id(), b.snapshot_id());
            assert_ne!(a.snapshot_id(), c.snapshot_id());
            assert!(a.snapshot_id().starts_with("snap_"));
        }

        #[test]
        fn empty_file_becomes_single_empty_line() {
            let buf = SharedBuffer::from_lines("empty.ts", Vec::new());
            assert_eq!(buf.line_count(), 1);
            assert_eq!(buf.line(1).unwrap(), "");
        }
    }
}
