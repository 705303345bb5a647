/// Undo/redo replay through the layout session.
///
/// Recording is paused while a group replays so the replayed deltas do not
/// land back on the undo stack.
use anyhow::Result;
use tracing::{debug, warn};

use super::LayoutSession;
use crate::fold::Fold;
use crate::history::{merge_undo_selection, DeltaBatch, Range};

impl LayoutSession {
    /// Undoes the most recent edit group.
    ///
    /// Returns the range to select afterwards, or `None` if there was
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded delta no longer fits the buffer or
    /// the layout caches fall out of step.
    pub fn undo(&mut self) -> Result<Option<Range>> {
        let Some(batches) = self.history.undo() else {
            return Ok(None);
        };
        debug!("Undoing {} batch(es)", batches.len());
        self.history.pause_recording();
        let result = self.undo_changes(&batches);
        self.history.resume_recording();
        result
    }

    /// Redoes the most recently undone edit group.
    ///
    /// # Errors
    ///
    /// As for [`LayoutSession::undo`].
    pub fn redo(&mut self) -> Result<Option<Range>> {
        let Some(batches) = self.history.redo() else {
            return Ok(None);
        };
        debug!("Redoing {} batch(es)", batches.len());
        self.history.pause_recording();
        let result = self.redo_changes(&batches);
        self.history.resume_recording();
        result
    }

    /// Reverts `batches` newest first and returns the merged selection.
    ///
    /// Folds an edit destroyed are restored once the edit is reverted.
    ///
    /// # Errors
    ///
    /// As for [`LayoutSession::undo`].
    pub fn undo_changes(&mut self, batches: &[DeltaBatch]) -> Result<Option<Range>> {
        let mut selection = None;
        let mut pending: Vec<Fold> = Vec::new();
        for batch in batches.iter().rev() {
            match batch {
                DeltaBatch::Fold(records) => {
                    pending.extend(records.iter().cloned().map(Fold::from));
                }
                DeltaBatch::Doc(deltas) => {
                    for delta in deltas.iter().rev() {
                        self.buffer.revert_delta(delta)?;
                        self.on_change(&delta.inverted())?;
                    }
                    selection = merge_undo_selection(deltas, true, selection).or(selection);
                    for fold in pending.drain(..) {
                        let range = fold.range;
                        if let Err(e) = self.add_fold(fold) {
                            warn!("Could not restore fold {range:?}: {e}");
                        }
                    }
                }
            }
        }
        Ok(selection)
    }

    /// Re-applies `batches` oldest first and returns the merged selection.
    ///
    /// # Errors
    ///
    /// As for [`LayoutSession::undo`].
    pub fn redo_changes(&mut self, batches: &[DeltaBatch]) -> Result<Option<Range>> {
        let mut selection = None;
        for batch in batches {
            if let DeltaBatch::Doc(deltas) = batch {
                for delta in deltas {
                    self.buffer.apply_delta(delta)?;
                    self.on_change(delta)?;
                }
                selection = merge_undo_selection(deltas, false, selection).or(selection);
            }
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Point;

    #[test]
    fn test_undo_restores_text_and_selects_removed_range() {
        let mut s = LayoutSession::from_text("hello world");
        s.remove(Range::new(0, 5, 0, 11)).unwrap();
        assert_eq!(s.buffer().to_string(), "hello");
        let selection = s.undo().unwrap();
        assert_eq!(s.buffer().to_string(), "hello world");
        assert_eq!(selection, Some(Range::new(0, 5, 0, 11)));
    }

    #[test]
    fn test_redo_reapplies_and_selects_insert() {
        let mut s = LayoutSession::from_text("ab");
        s.insert(Point::new(0, 1), "XY").unwrap();
        s.undo().unwrap();
        assert_eq!(s.buffer().to_string(), "ab");
        let selection = s.redo().unwrap();
        assert_eq!(s.buffer().to_string(), "aXYb");
        assert_eq!(selection, Some(Range::new(0, 1, 0, 3)));
    }

    #[test]
    fn test_undo_with_empty_history() {
        let mut s = LayoutSession::from_text("x");
        assert_eq!(s.undo().unwrap(), None);
        assert_eq!(s.redo().unwrap(), None);
    }

    #[test]
    fn test_undo_restores_removed_fold() {
        let mut s = LayoutSession::from_text("a\nf() {\n  x\n}\nb");
        s.add_fold(Fold::new(Range::new(1, 5, 3, 1), "{...}")).unwrap();
        let change = s.remove(Range::new(0, 1, 2, 1)).unwrap();
        assert_eq!(change.removed_folds.len(), 1);
        assert!(s.all_folds().is_empty());

        s.undo().unwrap();
        assert_eq!(s.buffer().to_string(), "a\nf() {\n  x\n}\nb");
        assert_eq!(s.all_folds().len(), 1);
        assert_eq!(s.all_folds()[0].range, Range::new(1, 5, 3, 1));
        assert_eq!(s.screen_length(), 3);
    }

    #[test]
    fn test_replay_does_not_record() {
        let mut s = LayoutSession::from_text("");
        s.insert(Point::new(0, 0), "a").unwrap();
        s.undo().unwrap();
        assert!(!s.history().can_undo());
        assert!(s.history().can_redo());
        assert!(s.history().is_recording());
    }

    #[test]
    fn test_grouped_edits_undo_together() {
        let mut s = LayoutSession::from_text("");
        s.insert(Point::new(0, 0), "ab").unwrap();
        s.insert(Point::new(0, 2), "\ncd").unwrap();
        s.break_undo_group();
        s.insert(Point::new(1, 2), "!").unwrap();

        s.undo().unwrap();
        assert_eq!(s.buffer().to_string(), "ab\ncd");
        let selection = s.undo().unwrap();
        assert_eq!(s.buffer().to_string(), "");
        assert_eq!(selection, Some(Range::new(0, 0, 0, 0)));
    }
}
