//! Bounded linear undo/redo log.

use std::collections::VecDeque;
use thiserror::Error;

/// Maximum number of history states to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// History errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History position {position} out of range 1..={len}")]
    OutOfRange { position: usize, len: usize },
}

/// A linear log of states with a 1-based cursor.
///
/// `position` is 0 only while the log is empty. Recording after an undo
/// drops the abandoned redo branch. When the log is full the oldest entries
/// are evicted and the cursor shifts with them.
#[derive(Debug, Clone)]
pub struct History<T> {
    values: VecDeque<T>,
    position: usize,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    /// Create an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty history holding at most `capacity` states (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            position: 0,
            capacity,
        }
    }

    /// Record a new state and make it current. Returns the new position.
    pub fn record(&mut self, value: T) -> usize {
        let mut evicted = 0;
        while self.values.len() + 1 > self.capacity {
            self.values.pop_front();
            self.position = self.position.saturating_sub(1);
            evicted += 1;
        }
        if evicted > 0 {
            log::trace!("History evicted {} oldest state(s)", evicted);
        }

        if self.position != 0 && self.position < self.values.len() {
            // Drop the redo branch
            self.values.truncate(self.position);
        }
        self.position = self.values.len() + 1;
        self.values.push_back(value);
        self.position
    }

    /// Step back one state. `None` at the oldest state or when empty.
    pub fn undo(&mut self) -> Option<&T> {
        if self.position <= 1 {
            return None;
        }
        self.position -= 1;
        self.values.get(self.position - 1)
    }

    /// Step forward one state. `None` at the newest state.
    pub fn redo(&mut self) -> Option<&T> {
        if self.position >= self.values.len() {
            return None;
        }
        self.position += 1;
        self.values.get(self.position - 1)
    }

    /// Move the cursor directly to `position` (1-based).
    pub fn jump_to(&mut self, position: usize) -> Result<&T, HistoryError> {
        if position == 0 || position > self.values.len() {
            return Err(HistoryError::OutOfRange {
                position,
                len: self.values.len(),
            });
        }
        self.position = position;
        Ok(&self.values[position - 1])
    }

    /// The current state, if any.
    pub fn current(&self) -> Option<&T> {
        self.position.checked_sub(1).and_then(|i| self.values.get(i))
    }

    /// Current 1-based position (0 when empty).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.position > 1
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.values.len()
    }

    /// Iterate states from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Forget every state.
    pub fn clear(&mut self) {
        self.values.clear();
        self.position = 0;
    }
}
