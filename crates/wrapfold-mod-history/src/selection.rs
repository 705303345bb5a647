/// Computes the selection to highlight after undoing or redoing a batch.
use crate::operation::{Delta, Point, Range};

/// Merges the ranges touched by `deltas` into one selection range.
///
/// A delta counts as an insertion for the merge when it inserted text and
/// we are redoing, or when it removed text and we are undoing (reverting a
/// removal re-inserts the text). Insertions widen the result; removals can
/// only collapse it to an earlier point.
///
/// `previous` is the range produced for the batch replayed just before this
/// one in the same undo group. When given, the two are coalesced so a whole
/// group yields one coherent selection.
///
/// Returns `None` for an empty batch. The caller's `previous` is taken by
/// value and never retained.
pub fn merge_undo_selection(
    deltas: &[Delta],
    is_undo: bool,
    previous: Option<Range>,
) -> Option<Range> {
    let effective_insert = |delta: &Delta| delta.is_insert() != is_undo;

    let (first, rest) = deltas.split_first()?;
    let mut range = if effective_insert(first) {
        first.range
    } else {
        Range::empty_at(first.range.start)
    };

    for delta in rest {
        let start = delta.range.start;
        if effective_insert(delta) {
            if range.compare(start.row, start.column) == -1 {
                range.start = start;
            }
            let end = delta.range.end;
            if range.compare(end.row, end.column) == 1 {
                range.end = end;
            }
        } else if range.compare(start.row, start.column) == -1 {
            range = Range::empty_at(start);
        }
    }

    if let Some(mut last) = previous {
        if last.start == range.start {
            let shift = range.end.column as isize - range.start.column as isize;
            last.start.column = shift_column(last.start.column, shift);
            last.end.column = shift_column(last.end.column, shift);
        }

        match last.compare_range(&range) {
            1 => range.start = last.start,
            -1 => range.end = Point::new(last.end.row, last.start.column),
            _ => {}
        }
    }

    Some(range)
}

fn shift_column(column: usize, shift: isize) -> usize {
    column.saturating_add_signed(shift)
}
