// Integration tests for the history system.
//
// These tests exercise full workflows spanning the UndoManager and the
// selection merger together, the way a session replays an undo group.

use wrapfold_mod_history::{
    merge_undo_selection, Delta, DeltaAction, DeltaBatch, HistoryConfig, Range, UndoManager,
};

fn insert(row: usize, col: usize, text: &str) -> Delta {
    Delta {
        action: DeltaAction::Insert,
        range: Range::new(row, col, row, col + text.chars().count()),
        lines: vec![text.to_string()],
    }
}

fn remove(row: usize, col: usize, text: &str) -> Delta {
    Delta {
        action: DeltaAction::Remove,
        range: Range::new(row, col, row, col + text.chars().count()),
        lines: vec![text.to_string()],
    }
}

/// Replays the doc batches of a group the way a session does on undo:
/// last batch first, threading the previous merged range through.
fn undo_selection(batches: &[DeltaBatch]) -> Option<Range> {
    let mut last = None;
    for batch in batches.iter().rev() {
        if let DeltaBatch::Doc(deltas) = batch {
            last = merge_undo_selection(deltas, true, last);
        }
    }
    last
}

fn redo_selection(batches: &[DeltaBatch]) -> Option<Range> {
    let mut last = None;
    for batch in batches {
        if let DeltaBatch::Doc(deltas) = batch {
            last = merge_undo_selection(deltas, false, last);
        }
    }
    last
}

// ── Full Workflow ──────────────────────────────────────────────────────

#[test]
fn test_typing_run_undoes_as_one_collapsed_selection() {
    let mut mgr = UndoManager::default();
    for (i, ch) in ["h", "e", "l", "l", "o"].iter().enumerate() {
        mgr.record(DeltaBatch::Doc(vec![insert(0, i, ch)]));
    }

    let batches = mgr.undo().expect("undo");
    assert_eq!(undo_selection(&batches), Some(Range::new(0, 0, 0, 0)));
    assert!(!mgr.can_undo());

    let batches = mgr.redo().expect("redo");
    assert_eq!(redo_selection(&batches), Some(Range::new(0, 0, 0, 5)));
}

#[test]
fn test_undoing_a_deletion_selects_restored_text() {
    let mut mgr = UndoManager::default();
    mgr.record(DeltaBatch::Doc(vec![remove(3, 4, "world")]));

    let batches = mgr.undo().expect("undo");
    assert_eq!(undo_selection(&batches), Some(Range::new(3, 4, 3, 9)));
}

#[test]
fn test_insert_delete_insert_redo_spans_inserts() {
    let mut mgr = UndoManager::default();
    mgr.record(DeltaBatch::Doc(vec![insert(0, 0, "abc")]));
    mgr.record(DeltaBatch::Doc(vec![remove(0, 5, "x")]));
    mgr.record(DeltaBatch::Doc(vec![insert(0, 6, "def")]));

    let batches = mgr.undo().expect("undo");
    let batches_for_redo = batches.clone();
    assert!(undo_selection(&batches).is_some());

    mgr.redo().expect("redo");
    assert_eq!(redo_selection(&batches_for_redo), Some(Range::new(0, 0, 0, 9)));
}

#[test]
fn test_separate_groups_undo_independently() {
    let mut mgr = UndoManager::new(HistoryConfig {
        max_history_depth: 100,
        group_timeout_ms: 0,
    });
    mgr.record(DeltaBatch::Doc(vec![insert(0, 0, "one")]));
    mgr.record(DeltaBatch::Doc(vec![insert(1, 0, "two")]));

    let second = mgr.undo().expect("undo second");
    assert_eq!(undo_selection(&second), Some(Range::new(1, 0, 1, 0)));
    let first = mgr.undo().expect("undo first");
    assert_eq!(undo_selection(&first), Some(Range::new(0, 0, 0, 0)));
    assert!(!mgr.can_undo());
    assert_eq!(mgr.redo().map(|b| b.len()), Some(1));
}
