//! Undo/redo history over full snapshots.
//!
//! Two LIFO stacks: `undo` holds past states, `redo` holds states that were undone. Recording a
//! new state clears `redo`, so history never branches. The stack depth is bounded; the oldest
//! entries are dropped first.
//!
//! A clean point (the undo depth at the last export) is tracked so front ends can warn about
//! unexported changes.

use crate::snapshot::Snapshot;

#[derive(Debug)]
pub(crate) struct HistoryManager {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_undo: usize,
    /// Undo depth at the clean point. When `redo_stack` is non-empty it may exceed
    /// `undo_stack.len()`; `None` once the clean point became unreachable.
    clean_index: Option<usize>,
}

impl HistoryManager {
    pub(crate) fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            clean_index: Some(0),
        }
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub(crate) fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub(crate) fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    pub(crate) fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // A clean point inside the redo area is unreachable once redo is cleared.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    /// Record the state that existed before a mutation.
    pub(crate) fn record(&mut self, before: Snapshot) {
        self.clear_redo_and_adjust_clean();

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(clean_index) => Some(clean_index - 1),
            };
        }

        self.undo_stack.push(before);
    }

    /// Step back: returns the state to restore and remembers `current` for redo.
    pub(crate) fn undo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Step forward: returns the state to restore and remembers `current` for undo.
    pub(crate) fn redo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clean_index = Some(0);
    }
}
