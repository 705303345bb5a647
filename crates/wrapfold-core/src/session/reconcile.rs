/// Keeps the layout caches in step with buffer edits.
///
/// Only the rows an edit touches are re-measured; everything after the
/// edit point in the row cache is dropped.
use tracing::{error, trace, warn};

use super::LayoutSession;
use crate::buffer::char_slice;
use crate::display::{classify, classify_into, placeholder_tags};
use crate::error::LayoutError;
use crate::fold::{Fold, Segment};
use crate::history::{Delta, Point, Range};
use crate::wrap::compute_splits;

impl LayoutSession {
    /// Updates folds, widgets and caches for a delta already applied to
    /// the buffer. Returns the folds the edit destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::WrapDataMismatch`] if, in wrap mode, the wrap
    /// data no longer has one entry per buffer row.
    pub(crate) fn on_change(&mut self, delta: &Delta) -> Result<Vec<Fold>, LayoutError> {
        let Range { start, end } = delta.range;
        let first_row = start.row;
        let mut last_row = end.row;
        let len = end.row - start.row;
        let shift = len as isize;
        let mut removed = Vec::new();
        trace!(action = ?delta.action, range = ?delta.range, "Reconciling layout");

        self.row_cache.truncate_from(first_row);
        self.width_dirty = true;

        if len != 0 {
            if delta.is_insert() {
                self.splice_rows_in(first_row, len);

                let inside = self.folds.folds_in_range(&Range::empty_at(start));
                if !inside.is_empty() {
                    warn!("Insert at {start:?} splits {} fold(s); unfolding", inside.len());
                    self.folds.remove_folds(&inside);
                    removed.extend(inside);
                }

                let mut idx = 0;
                if let Some(i) = self.folds.fold_line_index(first_row) {
                    let column_shift = end.column as isize - start.column as isize;
                    let lines = self.folds.lines_mut();
                    idx = i + 1;
                    match lines[i].range().compare_inside(start.row, start.column) {
                        0 => match lines[i].split(start.row, start.column) {
                            Some(mut tail) => {
                                tail.shift_row(shift);
                                tail.add_remove_chars(last_row, 0, column_shift);
                                lines.insert(i + 1, tail);
                                idx = i + 2;
                            }
                            None => warn!("Could not split fold line at {start:?}"),
                        },
                        -1 => {
                            lines[i].add_remove_chars(first_row, 0, column_shift);
                            lines[i].shift_row(shift);
                        }
                        _ => {}
                    }
                }
                for line in &mut self.folds.lines_mut()[idx..] {
                    if line.start_row() >= first_row {
                        line.shift_row(shift);
                    }
                }
            } else {
                self.splice_rows_out(first_row, len);

                let inside = self.folds.folds_in_range(&delta.range);
                self.folds.remove_folds(&inside);
                removed.extend(inside);

                let mut idx = 0;
                if let Some(i) = self.folds.fold_line_index(end.row) {
                    let column_shift = start.column as isize - end.column as isize;
                    let lines = self.folds.lines_mut();
                    lines[i].add_remove_chars(end.row, end.column, column_shift);
                    lines[i].shift_row(-shift);
                    idx = i + 1;
                    if let Some(before) = self.folds.fold_line_index(first_row) {
                        if before != i {
                            self.folds.merge_lines(before, i);
                            idx = before + 1;
                        }
                    }
                }
                for line in &mut self.folds.lines_mut()[idx..] {
                    if line.start_row() >= end.row {
                        line.shift_row(-shift);
                    }
                }
                last_row = first_row;
            }
        } else {
            let mut column_shift = end.column as isize - start.column as isize;
            if !delta.is_insert() {
                let inside = self.folds.folds_in_range(&delta.range);
                self.folds.remove_folds(&inside);
                removed.extend(inside);
                column_shift = -column_shift;
            }
            if let Some(i) = self.folds.fold_line_index(first_row) {
                self.folds.lines_mut()[i].add_remove_chars(first_row, start.column, column_shift);
            }
        }

        let buffer_rows = self.buffer.len_lines();
        if self.use_wrap_mode && self.wrap_data.len() != buffer_rows {
            let err = LayoutError::WrapDataMismatch {
                wrap_rows: self.wrap_data.len(),
                buffer_rows,
            };
            error!("{err}");
            return Err(err);
        }

        if self.use_wrap_mode {
            self.update_wrap_data(first_row, last_row);
        } else {
            self.update_row_length_cache(first_row, last_row);
        }
        Ok(removed)
    }

    /// Makes room for `count` new rows after `first_row`.
    fn splice_rows_in(&mut self, first_row: usize, count: usize) {
        if self.use_wrap_mode {
            let at = first_row.min(self.wrap_data.len());
            self.wrap_data.splice(at..at, std::iter::repeat_with(Vec::new).take(count));
        }
        let at = first_row.min(self.row_lengths.len());
        self.row_lengths.splice(at..at, std::iter::repeat(None).take(count));

        let moved = self.line_widgets.split_off(&first_row);
        self.line_widgets
            .extend(moved.into_iter().map(|(row, rows)| (row + count, rows)));
    }

    /// Drops the entries of the `count` rows after `first_row`.
    fn splice_rows_out(&mut self, first_row: usize, count: usize) {
        if self.use_wrap_mode {
            let range = clamp_span(first_row, count, self.wrap_data.len());
            self.wrap_data.drain(range);
        }
        let range = clamp_span(first_row, count, self.row_lengths.len());
        self.row_lengths.drain(range);

        let moved = self.line_widgets.split_off(&(first_row + 1));
        self.line_widgets.extend(
            moved
                .into_iter()
                .filter(|&(row, _)| row > first_row + count)
                .map(|(row, rows)| (row - count, rows)),
        );
    }

    /// Recomputes wrap splits for `first..=last`, treating each fold line
    /// as one row keyed by its start.
    pub(crate) fn update_wrap_data(&mut self, first: usize, last: usize) {
        let rows = self.buffer.len_lines();
        self.wrap_data.resize_with(rows, Vec::new);
        let last = last.min(rows - 1);
        let mut row = first;
        let mut hint = 0;
        while row <= last {
            match self.folds.fold_line_index_from(row, hint) {
                None => {
                    let tags = classify(&self.line_text(row), 0, self.tab_size);
                    self.wrap_data[row] = compute_splits(&tags, self.wrap_limit, self.wrap_as_code);
                    row += 1;
                }
                Some(idx) => {
                    hint = idx;
                    let line = &self.folds.lines()[idx];
                    let mut tags = Vec::new();
                    for segment in line.walk(Point::new(line.end_row(), usize::MAX)) {
                        match segment {
                            Segment::Text { row, from, to } => {
                                let text = self.line_text(row);
                                let column = tags.len();
                                classify_into(&mut tags, char_slice(&text, from, to), column, self.tab_size);
                            }
                            Segment::Placeholder(placeholder) => {
                                tags.extend(placeholder_tags(placeholder, tags.len(), self.tab_size));
                            }
                        }
                    }
                    let start_row = line.start_row();
                    row = line.end_row() + 1;
                    self.wrap_data[start_row] = compute_splits(&tags, self.wrap_limit, self.wrap_as_code);
                }
            }
        }
    }

    /// Marks the measured widths of `first..=last` stale.
    pub(crate) fn update_row_length_cache(&mut self, first: usize, last: usize) {
        let rows = self.buffer.len_lines();
        self.row_lengths.resize(rows, None);
        for width in self.row_lengths.iter_mut().take(last.saturating_add(1)).skip(first) {
            *width = None;
        }
    }
}

fn clamp_span(first: usize, count: usize, len: usize) -> std::ops::Range<usize> {
    let start = first.min(len);
    start..first.saturating_add(count).min(len)
}
