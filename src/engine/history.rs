// SPDX-License-Identifier: MIT

//! Linear undo/redo history
//!
//! Entries before the cursor form the undo tail, entries after it the redo
//! tail. Committing always discards the redo tail.

use super::error::{EditError, HistoryMove};

/// Ordered log of snapshots with a cursor on the current one
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T> History<T> {
    /// Start a history holding only `initial`
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Record `entry` right after the cursor and make it current
    pub fn commit(&mut self, entry: T) {
        let discarded = self.entries.len() - self.cursor - 1;
        if discarded > 0 {
            log::debug!("Discarding {} redo entries", discarded);
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry
    pub fn undo(&mut self) -> Result<&T, EditError> {
        if !self.can_undo() {
            return Err(EditError::HistoryBoundary(HistoryMove::Undo));
        }
        self.cursor -= 1;
        Ok(self.current())
    }

    /// Step forward one entry
    pub fn redo(&mut self) -> Result<&T, EditError> {
        if !self.can_redo() {
            return Err(EditError::HistoryBoundary(HistoryMove::Redo));
        }
        self.cursor += 1;
        Ok(self.current())
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() - 1
    }

    /// Number of entries, always at least one
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Index of the current entry
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Read-only view of every entry, oldest first.
    ///
    /// Entries after [`position`](Self::position) form the redo tail.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}
