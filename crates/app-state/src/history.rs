//! Snapshot-based undo/redo history.
//!
//! Each entry holds the state *after* a user action. The top of the undo stack
//! is therefore always the live state; undoing moves the top to the redo stack
//! and the caller applies whatever is now on top (or its own initial state when
//! the undo stack is empty). The manager never touches live state itself.
//!
//! ```ignore
//! let mut history = HistoryManager::new(50);
//!
//! state.timeline.add_shot(shot);
//! history.push("Add shot", AppSnapshot::capture(&state));
//!
//! if history.undo().is_some() {
//!     match history.current() {
//!         Some(snap) => snap.restore(&mut state),
//!         None => initial.restore(&mut state),
//!     }
//! }
//!
//! // Collapse a drag into one entry.
//! history.start_batch("Drag shot");
//! // ... push() calls are suppressed ...
//! history.end_batch(AppSnapshot::capture(&state));
//!
//! // Once the depth limit evicts entries, the newest evicted state becomes
//! // the undo floor.
//! if let Some(floor) = history.push("Trim shot", AppSnapshot::capture(&state)) {
//!     initial = floor;
//! }
//! ```

use std::time::Instant;

use crate::snapshot::AppSnapshot;

/// A single entry in the undo/redo history.
#[derive(Clone, Debug)]
pub struct HistoryEntry<S> {
    /// Menu text for the action ("Move shot", "Delete track").
    pub label: String,
    pub snapshot: S,
    pub timestamp: Instant,
}

/// Linear undo/redo over two bounded stacks.
///
/// Pushing clears the redo stack. When the undo stack exceeds `max_entries`
/// the oldest entry is evicted.
pub struct HistoryManager<S = AppSnapshot> {
    undo_stack: Vec<HistoryEntry<S>>,
    redo_stack: Vec<HistoryEntry<S>>,
    max_entries: usize,
    /// Set while a batch is open; plain pushes are suppressed.
    batch_label: Option<String>,
}

impl<S> HistoryManager<S> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            batch_label: None,
        }
    }

    /// Record the state reached by a user action.
    ///
    /// Returns the newest snapshot evicted by the depth limit. That state is
    /// no longer reachable by undo, so callers holding an undo floor should
    /// move it there.
    pub fn push(&mut self, label: &str, snapshot: S) -> Option<S> {
        if self.batch_label.is_some() {
            tracing::debug!(label, "Push suppressed: batch in progress");
            return None;
        }
        self.push_entry(label.to_string(), snapshot)
    }

    fn push_entry(&mut self, label: String, snapshot: S) -> Option<S> {
        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            label,
            snapshot,
            timestamp: Instant::now(),
        });
        let evicted = self.evict_oldest();

        tracing::debug!(
            label = self.undo_label().unwrap_or_default(),
            undo_depth = self.undo_stack.len(),
            "History entry pushed"
        );
        evicted
    }

    fn evict_oldest(&mut self) -> Option<S> {
        let excess = self.undo_stack.len().saturating_sub(self.max_entries);
        if excess == 0 {
            return None;
        }
        tracing::debug!(evicted = excess, "History depth limit reached");
        self.undo_stack.drain(..excess).last().map(|e| e.snapshot)
    }

    /// Move the top entry to the redo stack and return it (the state being
    /// left). `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&S> {
        self.end_stuck_batch("undo");

        let entry = self.undo_stack.pop()?;
        tracing::debug!(
            label = %entry.label,
            undo_remaining = self.undo_stack.len(),
            "Undo"
        );
        self.redo_stack.push(entry);
        self.redo_stack.last().map(|e| &e.snapshot)
    }

    /// Move the top redo entry back onto the undo stack and return it (the
    /// state to apply). `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&S> {
        self.end_stuck_batch("redo");

        let entry = self.redo_stack.pop()?;
        tracing::debug!(
            label = %entry.label,
            redo_remaining = self.redo_stack.len(),
            "Redo"
        );
        self.undo_stack.push(entry);
        self.undo_stack.last().map(|e| &e.snapshot)
    }

    /// The snapshot on top of the undo stack, i.e. the live state as far as
    /// history knows.
    pub fn current(&self) -> Option<&S> {
        self.undo_stack.last().map(|e| &e.snapshot)
    }

    // A lost mouse-up can leave a batch open; undo/redo close it without pushing.
    fn end_stuck_batch(&mut self, during: &str) {
        if let Some(label) = self.batch_label.take() {
            tracing::warn!(batch = %label, during, "Ending stuck batch");
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Open a batch. Pushes are suppressed until [`end_batch`](Self::end_batch)
    /// records one entry for the whole gesture.
    pub fn start_batch(&mut self, label: &str) {
        if self.batch_label.is_some() {
            tracing::warn!(label, "start_batch called while already batching, ignoring");
            return;
        }
        self.batch_label = Some(label.to_string());
        tracing::debug!(label, "Batch started");
    }

    /// Close the open batch and push `final_snapshot` under the batch label.
    /// No-op without an open batch. Returns the evicted snapshot as
    /// [`push`](Self::push) does.
    pub fn end_batch(&mut self, final_snapshot: S) -> Option<S> {
        let Some(label) = self.batch_label.take() else {
            return None;
        };
        self.push_entry(label, final_snapshot)
    }

    pub fn is_batching(&self) -> bool {
        self.batch_label.is_some()
    }

    /// Label of the action that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    /// Label of the action that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Empty both stacks. Called when a project is opened or closed.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_label = None;
        tracing::debug!("History cleared");
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Change the depth limit, trimming the oldest entries if needed.
    /// Returns the newest trimmed snapshot.
    pub fn set_max_entries(&mut self, max: usize) -> Option<S> {
        self.max_entries = max;
        self.evict_oldest()
    }
}
