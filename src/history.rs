//! Bounded linear undo/redo history over recorded pre-mutation states.

use std::collections::VecDeque;

use tracing::debug;

/// Default number of undo steps kept per collection.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Recorded state from just before a labelled mutation.
#[derive(Debug, Clone)]
pub struct HistoryEntry<S> {
    /// Monotonic position of the mutation that produced this entry.
    pub seq: u64,
    pub label: String,
    pub state: S,
}

/// Two-deque history: `undo` holds states to go back to, `redo` holds states
/// that were undone. The cursor is the length of the undo deque.
#[derive(Debug)]
pub struct History<S> {
    undo: VecDeque<HistoryEntry<S>>,
    redo: VecDeque<HistoryEntry<S>>,
    limit: usize,
    next_seq: u64,
    applying: bool,
}

impl<S> History<S> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
            next_seq: 0,
            applying: false,
        }
    }

    /// Record the state observed before a mutation commits.
    ///
    /// Ignored while an undo/redo is being applied. Discards the redo tail and
    /// evicts the oldest entry once the depth limit is exceeded.
    pub fn record(&mut self, label: impl Into<String>, pre_state: S) -> bool {
        if self.applying {
            return false;
        }
        self.redo.clear();
        self.undo.push_back(HistoryEntry {
            seq: self.next_seq,
            label: label.into(),
            state: pre_state,
        });
        self.next_seq += 1;
        while self.undo.len() > self.limit {
            if let Some(evicted) = self.undo.pop_front() {
                debug!("History full; evicted '{}' (#{})", evicted.label, evicted.seq);
            }
        }
        true
    }

    /// Step back: returns the state to restore and stores `current` for redo.
    pub fn undo(&mut self, current: S) -> Option<HistoryEntry<S>> {
        if self.applying {
            return None;
        }
        let entry = self.undo.pop_back()?;
        self.redo.push_back(HistoryEntry {
            seq: entry.seq,
            label: entry.label.clone(),
            state: current,
        });
        Some(entry)
    }

    /// Step forward: returns the state to restore and stores `current` for undo.
    pub fn redo(&mut self, current: S) -> Option<HistoryEntry<S>> {
        if self.applying {
            return None;
        }
        let entry = self.redo.pop_back()?;
        self.undo.push_back(HistoryEntry {
            seq: entry.seq,
            label: entry.label.clone(),
            state: current,
        });
        Some(entry)
    }

    /// Mark that a restored state is being committed; `record` is a no-op meanwhile.
    pub fn set_applying(&mut self, applying: bool) {
        self.applying = applying;
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries that can currently be undone.
    pub fn cursor(&self) -> usize {
        self.undo.len()
    }

    pub fn len(&self) -> usize {
        self.undo.len() + self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo.back().map(|entry| entry.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.back().map(|entry| entry.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
