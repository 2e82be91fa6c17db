//! Bounded undo/redo history.
//!
//! `UndoStack<T>` stores whole snapshots. Saving clears the redo history and
//! evicts the oldest entry once `max_depth` is reached. Recording can be
//! suspended (reference counted) so composite commands save exactly one
//! snapshot up front and undo as a single unit.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::error::SceneError;

#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undo: VecDeque<T>,
    redo: VecDeque<T>,
    max_depth: usize,
    suspended: usize,
}

impl<T> UndoStack<T> {
    pub fn new(max_depth: usize) -> Result<Self, SceneError> {
        if max_depth == 0 {
            return Err(SceneError::InvalidUndoDepth(max_depth));
        }
        Ok(Self { undo: VecDeque::new(), redo: VecDeque::new(), max_depth, suspended: 0 })
    }

    /// Push a snapshot of the current state. No-op while suspended.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn save_context(&mut self, current: T) -> bool {
        if self.is_suspended() {
            return false;
        }
        push_bounded(&mut self.undo, current, self.max_depth);
        self.redo.clear();
        true
    }

    /// Pop the most recent snapshot, keeping `current` for redo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current, self.max_depth);
        Some(previous)
    }

    /// Pop the most recently undone snapshot, keeping `current` for undo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current, self.max_depth);
        Some(next)
    }

    pub fn suspend_save(&mut self) {
        self.suspended += 1;
    }

    /// Undo one `suspend_save`. Extra resumes are ignored.
    pub fn resume_save(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drop both histories. The suspend count is kept.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded<T>(history: &mut VecDeque<T>, item: T, max_depth: usize) {
    while history.len() >= max_depth {
        history.pop_front();
    }
    history.push_back(item);
}
