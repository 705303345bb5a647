// Integration tests for the layout engine.
//
// These drive a LayoutSession the way an editor does: configure wrapping,
// fold regions, edit, query positions, and undo.

use wrapfold_config::LayoutConfig;
use wrapfold_core::display::{classify, TokenTag};
use wrapfold_core::history::{Point, Range};
use wrapfold_core::wrap::compute_splits;
use wrapfold_core::{Fold, LayoutSession, ScreenPosition};

fn wrapped(text: &str, limit: usize) -> LayoutSession {
    let config = LayoutConfig {
        use_wrap_mode: true,
        wrap_limit: limit,
        ..LayoutConfig::default()
    };
    LayoutSession::with_config(text, &config)
}

fn screen_rows(session: &mut LayoutSession) -> Vec<ScreenPosition> {
    let rows = session.len_lines();
    (0..rows)
        .map(|row| session.document_to_screen_position(row, 0))
        .collect()
}

// ── Wrapping ────────────────────────────────────────────────────────

#[test]
fn test_spaced_letters_wrap_after_spaces() {
    let tags = classify("a b c d e f g h", 0, 4);
    assert_eq!(compute_splits(&tags, 5, false), vec![6, 12]);

    let mut s = wrapped("a b c d e f g h", 5);
    assert_eq!(s.screen_length(), 3);
    assert_eq!(s.display_line(0).as_deref(), Some("a b c d e f g h"));
    assert_eq!(s.document_to_screen_position(0, 12), ScreenPosition::new(2, 0));
}

#[test]
fn test_tab_expansion_depends_on_column() {
    assert_eq!(classify("\t", 3, 4), vec![TokenTag::Tab]);
    assert_eq!(
        classify("\t", 0, 4),
        vec![
            TokenTag::Tab,
            TokenTag::TabContinuation,
            TokenTag::TabContinuation,
            TokenTag::TabContinuation
        ]
    );
}

#[test]
fn test_code_mode_changes_wrap_points() {
    let text = "call(argument_one, argument_two)";
    let mut s = wrapped(text, 12);
    let prose = s.row_split_data(0).map(<[usize]>::to_vec);
    s.set_wrap_as_code(true);
    let code = s.row_split_data(0).map(<[usize]>::to_vec);
    assert_ne!(prose, code);
}

// ── Edits against a wrapped, folded document ────────────────────────

#[test]
fn test_inserting_rows_shifts_folds_below() {
    let text: Vec<String> = (0..10).map(|i| format!("row {i} with some text")).collect();
    let mut s = wrapped(&text.join("\n"), 10);
    s.add_fold(Fold::new(Range::new(1, 3, 2, 5), "...")).unwrap();
    s.add_fold(Fold::new(Range::new(3, 0, 4, 4), "...")).unwrap();
    s.add_fold(Fold::new(Range::new(6, 2, 8, 1), "...")).unwrap();
    let total = s.screen_length();

    s.insert(Point::new(3, 0), "first new\nsecond new\n").unwrap();

    let ranges: Vec<Range> = s.all_folds().iter().map(|f| f.range).collect();
    assert_eq!(
        ranges,
        vec![Range::new(1, 3, 2, 5), Range::new(5, 0, 6, 4), Range::new(8, 2, 10, 1)]
    );
    for row in 0..s.len_lines() {
        assert!(s.row_split_data(row).is_some(), "row {row} lost its wrap data");
    }
    // neither new row is long enough to wrap at this limit
    assert_eq!(s.screen_length(), total + 2);
}

#[test]
fn test_rows_above_an_edit_keep_their_screen_rows() {
    let text: Vec<String> = (0..12).map(|i| format!("{i}: the quick brown fox")).collect();
    let mut s = wrapped(&text.join("\n"), 9);
    s.add_fold(Fold::new(Range::new(2, 1, 4, 3), "<>")).unwrap();
    let before = screen_rows(&mut s);

    s.insert(Point::new(7, 3), " jumps over\nthe lazy dog").unwrap();

    let after = screen_rows(&mut s);
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..7], &before[..7]);

    let mut fresh = wrapped(&s.buffer().to_string(), 9);
    fresh
        .add_fold(Fold::new(Range::new(2, 1, 4, 3), "<>"))
        .unwrap();
    assert_eq!(after, screen_rows(&mut fresh));
}

#[test]
fn test_fold_placeholder_is_unsplittable() {
    let mut s = wrapped("abc {\n  body\n} tail tail", 8);
    s.add_fold(Fold::new(Range::new(0, 4, 2, 1), "{...}")).unwrap();
    assert_eq!(s.display_line(0).as_deref(), Some("abc {...} tail tail"));
    let splits = s.row_split_data(0).unwrap().to_vec();
    // the split lands before the placeholder, not inside it
    assert_eq!(splits[0], 4);
    assert_eq!(s.screen_to_document_position(1, 0), Point::new(0, 4));
    assert_eq!(s.screen_to_document_position(1, 2), Point::new(0, 4));
}

// ── Undo ────────────────────────────────────────────────────────────

#[test]
fn test_undo_group_of_insert_remove_insert() {
    let mut s = LayoutSession::from_text("0123456789");
    s.insert(Point::new(0, 0), "abc").unwrap();
    s.remove(Range::new(0, 5, 0, 6)).unwrap();
    s.insert(Point::new(0, 6), "xyz").unwrap();
    assert_eq!(s.buffer().to_string(), "abc013xyz456789");

    let undone = s.undo().unwrap();
    assert_eq!(s.buffer().to_string(), "0123456789");
    assert_eq!(undone, Some(Range::new(0, 0, 0, 6)));

    // redo selects both inserted runs as one range
    let redone = s.redo().unwrap();
    assert_eq!(s.buffer().to_string(), "abc013xyz456789");
    assert_eq!(redone, Some(Range::new(0, 0, 0, 9)));
}

#[test]
fn test_undo_redo_keeps_layout_consistent() {
    let mut s = wrapped("fn main() {\n    println!(\"hello, wrapped world\");\n}", 16);
    s.add_fold(Fold::new(Range::new(0, 11, 2, 0), "...")).unwrap();
    let folded_length = s.screen_length();

    s.break_undo_group();
    let change = s.remove(Range::new(0, 5, 1, 8)).unwrap();
    assert_eq!(change.removed_folds.len(), 1);

    s.undo().unwrap();
    assert_eq!(s.all_folds().len(), 1);
    assert_eq!(s.screen_length(), folded_length);

    s.redo().unwrap();
    assert!(s.all_folds().is_empty());
    let mut fresh = wrapped(&s.buffer().to_string(), 16);
    assert_eq!(s.screen_length(), fresh.screen_length());
    assert_eq!(screen_rows(&mut s), screen_rows(&mut fresh));
}

// ── Recovery ────────────────────────────────────────────────────────

#[test]
fn test_rebuild_matches_incremental_layout() {
    let mut s = wrapped("one two three four five\nsix", 6);
    s.insert(Point::new(1, 3), " seven eight\nnine ten").unwrap();
    s.remove(Range::new(0, 4, 1, 2)).unwrap();
    let incremental: Vec<Option<Vec<usize>>> = (0..s.len_lines())
        .map(|r| s.row_split_data(r).map(<[usize]>::to_vec))
        .collect();
    s.rebuild();
    let rebuilt: Vec<Option<Vec<usize>>> = (0..s.len_lines())
        .map(|r| s.row_split_data(r).map(<[usize]>::to_vec))
        .collect();
    assert_eq!(incremental, rebuilt);
}
