//! Snapshot-based undo/redo.
//!
//! Every mutating command hands the pre-mutation graph to [`History::save`].
//! Restoring is a whole-graph swap, so every mutation kind is covered
//! without a per-operation inverse.
//!
//! Layout: `entries[..=cursor]` are states before the mutations that can
//! still be undone; `entries[cursor + 1]`, when present, is the state
//! currently on screen and anything after it can be redone. When the live
//! state is ahead of the last entry, `undo` first records it as the tip so
//! `redo` can come back to it.

use wf_core::Graph;

/// An independent deep copy of the graph.
pub type Snapshot = Graph;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    /// Index of the next snapshot to restore on undo; -1 = nothing to undo.
    cursor: isize,
    max_len: usize,
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_len.min(64)),
            cursor: -1,
            // One undo step needs its snapshot plus the tip.
            max_len: max_len.max(2),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    /// Record `before`, the state about to be mutated. Discards any redo
    /// branch and evicts the oldest entry past the bound.
    pub fn save(&mut self, before: Snapshot) {
        self.entries.truncate(self.next_index());
        self.entries.push(before);
        self.cursor = self.entries.len() as isize - 1;
        self.evict();
    }

    /// Step back. `live` is the graph currently on screen; it is kept as the
    /// redo target when undoing from the newest state. Returns the state to
    /// display, or `None` at the floor.
    pub fn undo(&mut self, live: &Graph) -> Option<Snapshot> {
        if self.cursor < 0 {
            return None;
        }
        if self.next_index() == self.entries.len() {
            self.entries.push(live.clone());
            self.evict();
        }
        let restored = self.entries[self.cursor as usize].clone();
        self.cursor -= 1;
        Some(restored)
    }

    /// Step forward. Returns the state to display, or `None` at the ceiling.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let restored = self.entries[self.next_index() + 1].clone();
        self.cursor += 1;
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.next_index() + 1 < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }

    /// Slot just past the cursor: the displayed state's index, if stored.
    fn next_index(&self) -> usize {
        (self.cursor + 1) as usize
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_len {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}
