/// Undo/redo manager that groups recorded delta batches into undo steps.
///
/// Consecutive batches recorded within the grouping timeout end up in the
/// same group, and adjacent buffer batches inside a group are coalesced so
/// the selection merger sees them as one run.
use std::time::{Duration, Instant};

use crate::config::HistoryConfig;
use crate::operation::{DeltaBatch, EditGroup};

/// Manages undo/redo history for a single session.
pub struct UndoManager {
    /// Undo stack, ordered by seq ascending (oldest first).
    undo_stack: Vec<EditGroup>,
    /// Redo stack, with the most recently undone group on top.
    redo_stack: Vec<EditGroup>,
    /// Next sequence number to assign to new groups.
    next_seq: u64,
    /// Whether recording is active (set to false during undo/redo replay).
    recording: bool,
    /// Timestamp of the last recorded batch, used for grouping.
    last_edit_time: Option<Instant>,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Distance from the last clean state, in groups.
    dirty_counter: i64,
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo_len", &self.undo_stack.len())
            .field("redo_len", &self.redo_stack.len())
            .field("next_seq", &self.next_seq)
            .field("recording", &self.recording)
            .field("dirty_counter", &self.dirty_counter)
            .finish()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoManager {
    /// Creates a new empty UndoManager.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_seq: 0,
            recording: true,
            last_edit_time: None,
            config,
            dirty_counter: 0,
        }
    }

    /// Records a batch.
    ///
    /// Groups with the previous batch if within the grouping timeout.
    /// Clears the redo stack when a new batch is recorded.
    pub fn record(&mut self, batch: DeltaBatch) {
        if !self.recording {
            return;
        }

        let now = Instant::now();
        let timeout = Duration::from_millis(self.config.group_timeout_ms);
        self.redo_stack.clear();

        if let (Some(last_group), Some(last_time)) = (self.undo_stack.last_mut(), self.last_edit_time) {
            if now.duration_since(last_time) < timeout {
                push_batch(&mut last_group.batches, batch);
                self.last_edit_time = Some(now);
                return;
            }
        }

        let group = EditGroup {
            batches: vec![batch],
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.undo_stack.push(group);
        self.last_edit_time = Some(now);
        self.dirty_counter += 1;

        if self.undo_stack.len() > self.config.max_history_depth {
            let excess = self.undo_stack.len() - self.config.max_history_depth;
            self.undo_stack.drain(..excess);
            tracing::trace!("Evicted {excess} undo groups past the history depth");
        }
    }

    /// Forces a group break so the next batch starts a new undo group.
    pub fn force_group_break(&mut self) {
        self.last_edit_time = None;
    }

    /// Undoes the most recent group.
    ///
    /// Returns the batches in chronological order; the caller replays them
    /// in reverse. Returns `None` if there's nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<DeltaBatch>> {
        let group = self.undo_stack.pop()?;
        let batches = group.batches.clone();
        self.redo_stack.push(group);
        self.last_edit_time = None;
        self.dirty_counter -= 1;
        Some(batches)
    }

    /// Redoes the most recently undone group.
    ///
    /// Returns the batches in chronological order.
    /// Returns `None` if there's nothing to redo.
    pub fn redo(&mut self) -> Option<Vec<DeltaBatch>> {
        let group = self.redo_stack.pop()?;
        let batches = group.batches.clone();
        self.undo_stack.push(group);
        self.last_edit_time = None;
        self.dirty_counter += 1;
        Some(batches)
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Temporarily disables recording (used during undo/redo replay).
    pub fn pause_recording(&mut self) {
        self.recording = false;
    }

    /// Re-enables recording after a pause.
    pub fn resume_recording(&mut self) {
        self.recording = true;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether the history sits at the state last marked clean.
    pub fn is_clean(&self) -> bool {
        self.dirty_counter == 0
    }

    /// Marks the current state as clean (e.g. after the host saved).
    pub fn mark_clean(&mut self) {
        self.dirty_counter = 0;
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.next_seq = 0;
        self.last_edit_time = None;
        self.dirty_counter = 0;
    }
}

/// Appends `batch`, folding consecutive buffer batches into one.
fn push_batch(batches: &mut Vec<DeltaBatch>, batch: DeltaBatch) {
    match (batches.last_mut(), batch) {
        (Some(DeltaBatch::Doc(existing)), DeltaBatch::Doc(mut more)) => existing.append(&mut more),
        (_, batch) => batches.push(batch),
    }
}
