//! # Undo/Redo Stack
//!
//! Linear history of document snapshots.
//!
//! ## Design
//!
//! - Every edit records the model as it was *before* the edit, labelled with
//!   the edit's name. Restoring that snapshot is the inverse operation.
//! - Undo restores a snapshot; the model it replaces is recorded on the redo
//!   stack by the same mechanism, so undoing an undo is a redo.
//! - New edits clear the redo stack
//! - Edits can be grouped so a whole gesture undoes in one step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.record(UndoEntry::new("Move Emoji", before));
//!
//! if let Some(entry) = stack.pop_undo() {
//!     // restore entry.snapshot, then record what it replaced
//!     stack.push_redo(UndoEntry::new(entry.name.clone(), current));
//! }
//! ```

use crate::model::EmojiArt;

/// Snapshot to restore, labelled with the operation it undoes
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub name: String,
    pub snapshot: EmojiArt,
}

impl UndoEntry {
    pub fn new(name: impl Into<String>, snapshot: EmojiArt) -> Self {
        Self {
            name: name.into(),
            snapshot,
        }
    }
}

#[derive(Debug)]
struct OpenGroup {
    name: String,
    depth: usize,
    /// Snapshot from before the first edit in the group
    entry: Option<UndoEntry>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<UndoEntry>,

    /// Most recent last
    redo_stack: Vec<UndoEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    group: Option<OpenGroup>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            group: None,
        }
    }

    /// Record the inverse of a fresh edit. Invalidates redo history.
    pub fn record(&mut self, entry: UndoEntry) {
        if let Some(group) = &mut self.group {
            if group.entry.is_none() {
                group.entry = Some(UndoEntry::new(group.name.clone(), entry.snapshot));
                self.redo_stack.clear();
            }
            return;
        }

        self.push_undo(entry);
        self.redo_stack.clear();
    }

    /// Record the inverse of a redo. Leaves redo history intact.
    pub fn push_undo(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
    }

    /// Record the inverse of an undo
    pub fn push_redo(&mut self, entry: UndoEntry) {
        self.redo_stack.push(entry);
    }

    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        self.undo_stack.pop()
    }

    pub fn pop_redo(&mut self) -> Option<UndoEntry> {
        self.redo_stack.pop()
    }

    /// Start grouping edits under `name`. Groups nest; only the outermost
    /// name is kept.
    pub fn begin_group(&mut self, name: impl Into<String>) {
        match &mut self.group {
            Some(group) => group.depth += 1,
            None => {
                self.group = Some(OpenGroup {
                    name: name.into(),
                    depth: 1,
                    entry: None,
                })
            }
        }
    }

    /// Close the innermost group. The outermost close records one entry if
    /// anything was edited.
    pub fn end_group(&mut self) {
        let Some(group) = &mut self.group else {
            return;
        };

        group.depth -= 1;
        if group.depth == 0 {
            self.close_group();
        }
    }

    /// Close every open group
    pub fn close_group(&mut self) {
        if let Some(group) = self.group.take() {
            if let Some(entry) = group.entry {
                self.record(entry);
            }
        }
    }

    pub fn is_grouping(&self) -> bool {
        self.group.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group = None;
    }

    /// Name of the operation the next undo reverts
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.name.as_str())
    }

    /// Name of the operation the next redo reapplies
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|entry| entry.name.as_str())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
