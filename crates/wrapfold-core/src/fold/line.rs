/// A chain of folds rendered on one screen line.
use super::Fold;
use crate::history::{Point, Range};

/// One piece of a fold line's display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Chars `from..to` of document row `row`. `to` may exceed the line length.
    Text { row: usize, from: usize, to: usize },
    /// A fold's placeholder, standing in for the folded text.
    Placeholder(&'a str),
}

/// Folds whose ranges chain end-row to start-row, so they all collapse
/// into a single screen line.
///
/// Invariant: `folds` is non-empty, sorted, and each fold starts on the row
/// where the previous one ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldLine {
    folds: Vec<Fold>,
}

/// Whether `next` continues the chain ending with `prev`.
pub(crate) fn chains(prev: &Fold, next: &Fold) -> bool {
    prev.range.end.row == next.range.start.row
}

fn shift_column(column: usize, delta: isize) -> usize {
    column.saturating_add_signed(delta)
}

fn shift_row(row: usize, delta: isize) -> usize {
    row.saturating_add_signed(delta)
}

impl FoldLine {
    pub fn new(fold: Fold) -> Self {
        Self { folds: vec![fold] }
    }

    /// Builds a line from already-chained folds. Returns `None` for an empty list.
    pub(crate) fn from_folds(folds: Vec<Fold>) -> Option<Self> {
        if folds.is_empty() {
            None
        } else {
            Some(Self { folds })
        }
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    pub fn start(&self) -> Point {
        self.folds[0].range.start
    }

    pub fn end(&self) -> Point {
        self.folds[self.folds.len() - 1].range.end
    }

    pub fn start_row(&self) -> usize {
        self.start().row
    }

    pub fn end_row(&self) -> usize {
        self.end().row
    }

    pub fn range(&self) -> Range {
        Range::from_points(self.start(), self.end())
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.start_row() <= row && row <= self.end_row()
    }

    /// Moves every fold by `delta` rows.
    pub fn shift_row(&mut self, delta: isize) {
        for fold in &mut self.folds {
            fold.range.start.row = shift_row(fold.range.start.row, delta);
            fold.range.end.row = shift_row(fold.range.end.row, delta);
        }
    }

    /// First fold that ends after `(row, column)`, and whether the point is inside it.
    fn next_fold_to(&self, row: usize, column: usize) -> Option<(usize, bool)> {
        self.folds
            .iter()
            .enumerate()
            .find_map(|(i, fold)| match fold.range.compare_end(row, column) {
                -1 => Some((i, false)),
                0 => Some((i, true)),
                _ => None,
            })
    }

    /// Adjusts columns on `row` after `delta` chars were inserted (positive)
    /// or removed (negative) at `column`.
    ///
    /// Folds starting at or after the edit move; a fold the edit lands
    /// inside only moves its end.
    pub fn add_remove_chars(&mut self, row: usize, column: usize, delta: isize) {
        let Some((mut idx, inside)) = self.next_fold_to(row, column) else {
            return;
        };
        if inside && !self.folds[idx].range.is_start(row, column) {
            let fold = &mut self.folds[idx];
            if fold.range.end.row != row {
                return;
            }
            fold.range.end.column = shift_column(fold.range.end.column, delta);
            idx += 1;
        }
        for fold in &mut self.folds[idx..] {
            if fold.range.start.row != row {
                break;
            }
            fold.range.start.column = shift_column(fold.range.start.column, delta);
            if fold.range.is_multi_line() {
                break;
            }
            fold.range.end.column = shift_column(fold.range.end.column, delta);
        }
    }

    /// Splits the line at `(row, column)`, keeping earlier folds here and
    /// returning the rest as a new line.
    ///
    /// Returns `None` if the point lies strictly inside a fold, or if no
    /// fold lies on either side of it.
    pub fn split(&mut self, row: usize, column: usize) -> Option<FoldLine> {
        let at = Point::new(row, column);
        let idx = self.folds.iter().position(|f| f.range.start >= at)?;
        if idx == 0 || self.folds[idx - 1].range.end > at {
            return None;
        }
        Some(FoldLine {
            folds: self.folds.split_off(idx),
        })
    }

    /// Appends the folds of `next`, which must start where this line ends.
    pub fn merge(&mut self, next: FoldLine) {
        self.folds.extend(next.folds);
        self.folds.sort_by(|a, b| a.range.start.cmp(&b.range.start));
    }

    /// Visible pieces of the line up to `end`, in display order.
    ///
    /// Stops before a fold that starts at or after `end`; a fold containing
    /// `end` still contributes its placeholder.
    pub fn walk(&self, end: Point) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.folds.len() * 2 + 1);
        let mut last_end = 0;
        for fold in &self.folds {
            let cmp = fold.range.compare_start(end.row, end.column);
            if cmp == -1 {
                segments.push(Segment::Text {
                    row: end.row,
                    from: last_end,
                    to: end.column,
                });
                return segments;
            }
            segments.push(Segment::Text {
                row: fold.range.start.row,
                from: last_end,
                to: fold.range.start.column,
            });
            segments.push(Segment::Placeholder(&fold.placeholder));
            if cmp == 0 {
                return segments;
            }
            last_end = fold.range.end.column;
        }
        segments.push(Segment::Text {
            row: end.row,
            from: last_end,
            to: end.column,
        });
        segments
    }

    /// Maps an offset in the line's display text back to a document position.
    ///
    /// Offsets inside a placeholder resolve to the start of its fold.
    pub fn idx_to_position(&self, idx: usize) -> Point {
        let mut idx = idx as isize;
        let mut last_fold_end = 0usize;
        for fold in &self.folds {
            idx -= fold.range.start.column as isize - last_fold_end as isize;
            if idx < 0 {
                return Point::new(
                    fold.range.start.row,
                    shift_column(fold.range.start.column, idx),
                );
            }
            idx -= fold.placeholder.chars().count() as isize;
            if idx < 0 {
                return fold.range.start;
            }
            last_fold_end = fold.range.end.column;
        }
        let end = self.end();
        Point::new(end.row, shift_column(end.column, idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(sr: usize, sc: usize, er: usize, ec: usize) -> Fold {
        Fold::new(Range::new(sr, sc, er, ec), "...")
    }

    fn chain() -> FoldLine {
        // row 1: "ab[...]" fold to row 3 col 2, then "[...]" 3:4-3:6, then to 5:1
        FoldLine::from_folds(vec![fold(1, 2, 3, 2), fold(3, 4, 3, 6), fold(3, 8, 5, 1)]).unwrap()
    }

    #[test]
    fn test_bounds_follow_folds() {
        let line = chain();
        assert_eq!(line.start(), Point::new(1, 2));
        assert_eq!(line.end(), Point::new(5, 1));
        assert!(line.contains_row(4));
        assert!(!line.contains_row(6));
    }

    #[test]
    fn test_shift_row() {
        let mut line = chain();
        line.shift_row(2);
        assert_eq!(line.range(), Range::new(3, 2, 7, 1));
        line.shift_row(-3);
        assert_eq!(line.range(), Range::new(0, 2, 4, 1));
    }

    // ── Column adjustments ──────────────────────────────────────────

    #[test]
    fn test_add_chars_before_folds_on_row() {
        let mut line = chain();
        line.add_remove_chars(3, 3, 2);
        assert_eq!(line.folds()[0].range, Range::new(1, 2, 3, 2));
        assert_eq!(line.folds()[1].range, Range::new(3, 6, 3, 8));
        assert_eq!(line.folds()[2].range.start, Point::new(3, 10));
        assert_eq!(line.folds()[2].range.end, Point::new(5, 1));
    }

    #[test]
    fn test_remove_chars_pulls_folds_left() {
        let mut line = FoldLine::new(fold(0, 5, 0, 9));
        line.add_remove_chars(0, 1, -3);
        assert_eq!(line.range(), Range::new(0, 2, 0, 6));
    }

    #[test]
    fn test_edit_at_fold_start_moves_fold() {
        let mut line = FoldLine::new(fold(0, 5, 0, 9));
        line.add_remove_chars(0, 5, 1);
        assert_eq!(line.range(), Range::new(0, 6, 0, 10));
    }

    #[test]
    fn test_edit_inside_fold_grows_its_end() {
        let mut line = FoldLine::new(fold(0, 5, 0, 9));
        line.add_remove_chars(0, 7, 2);
        assert_eq!(line.range(), Range::new(0, 5, 0, 11));
    }

    #[test]
    fn test_edit_after_folds_is_ignored() {
        let mut line = chain();
        let before = line.clone();
        line.add_remove_chars(5, 3, 4);
        assert_eq!(line, before);
    }

    // ── Split and merge ─────────────────────────────────────────────

    #[test]
    fn test_split_between_folds() {
        let mut line = chain();
        let tail = line.split(3, 3).unwrap();
        assert_eq!(line.folds().len(), 1);
        assert_eq!(tail.start(), Point::new(3, 4));
        assert_eq!(tail.end(), Point::new(5, 1));
    }

    #[test]
    fn test_split_at_fold_start_is_allowed() {
        let mut line = chain();
        let tail = line.split(3, 8).unwrap();
        assert_eq!(line.end(), Point::new(3, 6));
        assert_eq!(tail.folds().len(), 1);
    }

    #[test]
    fn test_split_inside_fold_fails() {
        let mut line = chain();
        assert!(line.split(2, 0).is_none());
        assert!(line.split(1, 0).is_none());
        assert_eq!(line.folds().len(), 3);
    }

    #[test]
    fn test_merge_appends() {
        let mut head = FoldLine::new(fold(0, 1, 2, 3));
        head.merge(FoldLine::new(fold(2, 5, 4, 0)));
        assert_eq!(head.range(), Range::new(0, 1, 4, 0));
        assert_eq!(head.folds().len(), 2);
    }

    // ── Walking ─────────────────────────────────────────────────────

    #[test]
    fn test_walk_whole_line() {
        let line = chain();
        let segs = line.walk(Point::new(5, usize::MAX));
        assert_eq!(
            segs,
            vec![
                Segment::Text { row: 1, from: 0, to: 2 },
                Segment::Placeholder("..."),
                Segment::Text { row: 3, from: 2, to: 4 },
                Segment::Placeholder("..."),
                Segment::Text { row: 3, from: 6, to: 8 },
                Segment::Placeholder("..."),
                Segment::Text { row: 5, from: 1, to: usize::MAX },
            ]
        );
    }

    #[test]
    fn test_walk_stops_before_fold_at_end_point() {
        let line = chain();
        let segs = line.walk(Point::new(3, 4));
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[2], Segment::Text { row: 3, from: 2, to: 4 });
    }

    #[test]
    fn test_walk_includes_fold_containing_end_point() {
        let line = chain();
        let segs = line.walk(Point::new(3, 5));
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[3], Segment::Placeholder("..."));
    }

    // ── Display offsets ─────────────────────────────────────────────

    #[test]
    fn test_idx_to_position() {
        // display text: "ab" "..." "xy" "..." "zw" "..." tail
        let line = chain();
        assert_eq!(line.idx_to_position(1), Point::new(1, 1));
        assert_eq!(line.idx_to_position(3), Point::new(1, 2));
        assert_eq!(line.idx_to_position(5), Point::new(3, 2));
        assert_eq!(line.idx_to_position(6), Point::new(3, 3));
        assert_eq!(line.idx_to_position(15), Point::new(5, 1));
        assert_eq!(line.idx_to_position(17), Point::new(5, 3));
    }
}
