//! Bounded snapshot history.
//!
//! [`History`] stores whole-state snapshots rather than inverse operations.
//! The caller records the state *before* each mutation; undo hands back the
//! most recent snapshot in exchange for the current state.
//!
//! # Examples
//!
//! ```
//! use ansicanvas::history::History;
//!
//! let mut history = History::new(50);
//! let mut value = 1;
//!
//! history.record(value);
//! value = 2;
//!
//! value = history.undo(value).unwrap();
//! assert_eq!(value, 1);
//! value = history.redo(value).unwrap();
//! assert_eq!(value, 2);
//! ```

use std::collections::VecDeque;

/// Default number of undo steps kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Undo and redo stacks of snapshots.
#[derive(Clone, Debug)]
pub struct History<S> {
    undo: VecDeque<S>,
    redo: Vec<S>,
    capacity: usize,
}

impl<S> History<S> {
    /// Create a history keeping at most `capacity` undo entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Push a pre-mutation snapshot. Evicts the oldest entry when full and
    /// always discards the redo stack.
    pub fn record(&mut self, snapshot: S) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
        self.redo.clear();
    }

    /// Step back: returns the snapshot to restore, keeping `current` for redo.
    pub fn undo(&mut self, current: S) -> Option<S> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: the mirror of [`undo`](Self::undo).
    pub fn redo(&mut self, current: S) -> Option<S> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
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
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
