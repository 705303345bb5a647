//! Fold collection.
//!
//! Folds are kept sorted and non-overlapping. Folds that chain end-row to
//! start-row share one screen line and are grouped into a [`FoldLine`].

mod line;

pub use line::{FoldLine, Segment};

use crate::error::LayoutError;
use crate::history::{FoldRecord, Point, Range};

/// A collapsed document range shown as `placeholder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub range: Range,
    pub placeholder: String,
}

impl Fold {
    pub fn new(range: Range, placeholder: impl Into<String>) -> Self {
        Self {
            range,
            placeholder: placeholder.into(),
        }
    }

    pub fn start(&self) -> Point {
        self.range.start
    }

    pub fn end(&self) -> Point {
        self.range.end
    }

    pub fn is_same_row(&self) -> bool {
        !self.range.is_multi_line()
    }
}

impl From<&Fold> for FoldRecord {
    fn from(fold: &Fold) -> Self {
        FoldRecord {
            range: fold.range,
            placeholder: fold.placeholder.clone(),
        }
    }
}

impl From<FoldRecord> for Fold {
    fn from(record: FoldRecord) -> Self {
        Fold::new(record.range, record.placeholder)
    }
}

/// Ordered collection of fold lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldSet {
    lines: Vec<FoldLine>,
}

/// Groups sorted folds into chained lines.
fn regroup(folds: Vec<Fold>) -> Vec<FoldLine> {
    let mut lines: Vec<FoldLine> = Vec::new();
    let mut current: Vec<Fold> = Vec::new();
    for fold in folds {
        if let Some(prev) = current.last() {
            if !line::chains(prev, &fold) {
                lines.extend(FoldLine::from_folds(std::mem::take(&mut current)));
            }
        }
        current.push(fold);
    }
    lines.extend(FoldLine::from_folds(current));
    lines
}

impl FoldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[FoldLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<FoldLine> {
        &mut self.lines
    }

    /// Every fold, in document order.
    pub fn folds(&self) -> impl Iterator<Item = &Fold> + '_ {
        self.lines.iter().flat_map(|l| l.folds().iter())
    }

    pub fn all_folds(&self) -> Vec<Fold> {
        self.folds().cloned().collect()
    }

    pub fn fold_count(&self) -> usize {
        self.lines.iter().map(|l| l.folds().len()).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Index of the fold line covering `row`.
    pub fn fold_line_index(&self, row: usize) -> Option<usize> {
        self.fold_line_index_from(row, 0)
    }

    /// Like [`FoldSet::fold_line_index`], scanning from line `hint` on.
    pub fn fold_line_index_from(&self, row: usize, hint: usize) -> Option<usize> {
        let start = if hint < self.lines.len() { hint } else { 0 };
        for (i, line) in self.lines.iter().enumerate().skip(start) {
            if line.contains_row(row) {
                return Some(i);
            }
            if line.end_row() > row {
                return None;
            }
        }
        None
    }

    pub fn fold_line(&self, row: usize) -> Option<&FoldLine> {
        self.fold_line_index(row).map(|i| &self.lines[i])
    }

    /// Index of the first fold line ending at or after `row`, scanning from `hint`.
    pub fn next_fold_line_index(&self, row: usize, hint: usize) -> Option<usize> {
        let start = if hint < self.lines.len() { hint } else { 0 };
        (start..self.lines.len()).find(|&i| self.lines[i].end_row() >= row)
    }

    /// The fold containing `(row, column)`.
    ///
    /// `side` excludes edges: `1` skips a fold ending at the point, `-1` one
    /// starting at it, `0` accepts both.
    pub fn fold_at(&self, row: usize, column: usize, side: i8) -> Option<&Fold> {
        let line = self.fold_line(row)?;
        line.folds().iter().find(|fold| {
            let range = &fold.range;
            if !range.contains(row, column) {
                return false;
            }
            !(side == 1 && range.is_end(row, column) || side == -1 && range.is_start(row, column))
        })
    }

    /// Folds intersecting `range`. Folds that only touch its edges are excluded.
    pub fn folds_in_range(&self, range: &Range) -> Vec<Fold> {
        self.folds()
            .filter(|f| f.range.end > range.start && f.range.start < range.end)
            .cloned()
            .collect()
    }

    /// Adds a fold and returns the index of the line that now holds it.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::FoldTooShort`] for single-row folds narrower
    /// than two chars and [`LayoutError::FoldOverlap`] if the fold
    /// intersects an existing one.
    pub fn add_fold(&mut self, fold: Fold) -> Result<usize, LayoutError> {
        let range = fold.range;
        if range.start > range.end
            || (!range.is_multi_line() && range.end.column - range.start.column < 2)
        {
            return Err(LayoutError::FoldTooShort(range));
        }
        if !self.folds_in_range(&range).is_empty() {
            return Err(LayoutError::FoldOverlap(range));
        }

        let mut folds = self.all_folds();
        let at = folds.partition_point(|f| f.range.start < range.start);
        folds.insert(at, fold);
        self.lines = regroup(folds);
        self.fold_line_index(range.start.row)
            .ok_or(LayoutError::FoldOverlap(range))
    }

    /// Removes the fold whose range is exactly `range`.
    pub fn remove_fold(&mut self, range: &Range) -> Option<Fold> {
        let mut folds = self.all_folds();
        let idx = folds.iter().position(|f| f.range == *range)?;
        let removed = folds.remove(idx);
        self.lines = regroup(folds);
        Some(removed)
    }

    /// Removes every fold in `folds`; unknown folds are ignored.
    pub fn remove_folds(&mut self, folds: &[Fold]) {
        if folds.is_empty() {
            return;
        }
        let kept = self
            .all_folds()
            .into_iter()
            .filter(|f| !folds.iter().any(|r| r.range == f.range))
            .collect();
        self.lines = regroup(kept);
    }

    /// Merges line `idx` into line `before`, which must precede it.
    pub(crate) fn merge_lines(&mut self, before: usize, idx: usize) {
        if before >= idx || idx >= self.lines.len() {
            return;
        }
        let next = self.lines.remove(idx);
        self.lines[before].merge(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(sr: usize, sc: usize, er: usize, ec: usize) -> Fold {
        Fold::new(Range::new(sr, sc, er, ec), "...")
    }

    fn set(folds: &[Fold]) -> FoldSet {
        let mut s = FoldSet::new();
        for f in folds {
            s.add_fold(f.clone()).unwrap();
        }
        s
    }

    // ── Adding ──────────────────────────────────────────────────────

    #[test]
    fn test_add_fold_creates_line() {
        let s = set(&[fold(2, 0, 4, 3)]);
        assert_eq!(s.lines().len(), 1);
        assert_eq!(s.lines()[0].range(), Range::new(2, 0, 4, 3));
    }

    #[test]
    fn test_chained_folds_share_a_line() {
        let s = set(&[fold(4, 5, 6, 0), fold(2, 0, 4, 3)]);
        assert_eq!(s.lines().len(), 1);
        assert_eq!(s.lines()[0].folds().len(), 2);
        assert_eq!(s.fold_count(), 2);
    }

    #[test]
    fn test_separate_rows_make_separate_lines() {
        let s = set(&[fold(1, 0, 2, 0), fold(5, 0, 7, 0)]);
        assert_eq!(s.lines().len(), 2);
    }

    #[test]
    fn test_add_rejects_short_fold() {
        let mut s = FoldSet::new();
        assert_eq!(
            s.add_fold(fold(0, 1, 0, 2)),
            Err(LayoutError::FoldTooShort(Range::new(0, 1, 0, 2)))
        );
    }

    #[test]
    fn test_add_rejects_overlap_but_allows_touching() {
        let mut s = set(&[fold(1, 4, 3, 2)]);
        assert!(matches!(s.add_fold(fold(2, 0, 5, 0)), Err(LayoutError::FoldOverlap(_))));
        assert!(s.add_fold(fold(3, 2, 3, 6)).is_ok());
        assert_eq!(s.lines().len(), 1);
    }

    // ── Lookups ─────────────────────────────────────────────────────

    #[test]
    fn test_fold_line_lookup() {
        let s = set(&[fold(1, 0, 2, 0), fold(5, 0, 7, 0)]);
        assert_eq!(s.fold_line_index(0), None);
        assert_eq!(s.fold_line_index(2), Some(0));
        assert_eq!(s.fold_line_index(3), None);
        assert_eq!(s.fold_line_index(6), Some(1));
        assert_eq!(s.fold_line_index_from(6, 1), Some(1));
    }

    #[test]
    fn test_next_fold_line() {
        let s = set(&[fold(1, 0, 2, 0), fold(5, 0, 7, 0)]);
        assert_eq!(s.next_fold_line_index(0, 0), Some(0));
        assert_eq!(s.next_fold_line_index(3, 0), Some(1));
        assert_eq!(s.next_fold_line_index(8, 0), None);
    }

    #[test]
    fn test_fold_at_sides() {
        let s = set(&[fold(1, 2, 1, 8)]);
        assert!(s.fold_at(1, 5, 0).is_some());
        assert!(s.fold_at(1, 8, 0).is_some());
        assert!(s.fold_at(1, 8, 1).is_none());
        assert!(s.fold_at(1, 2, -1).is_none());
        assert!(s.fold_at(1, 2, 1).is_some());
        assert!(s.fold_at(1, 9, 0).is_none());
    }

    #[test]
    fn test_folds_in_range_excludes_touching() {
        let s = set(&[fold(1, 2, 1, 8), fold(3, 0, 4, 0)]);
        assert_eq!(s.folds_in_range(&Range::new(1, 8, 3, 0)).len(), 0);
        assert_eq!(s.folds_in_range(&Range::new(1, 7, 3, 1)).len(), 2);
        assert_eq!(s.folds_in_range(&Range::new(0, 0, 1, 3)).len(), 1);
    }

    // ── Removing ────────────────────────────────────────────────────

    #[test]
    fn test_remove_middle_multi_row_fold_splits_line() {
        let mut s = set(&[fold(1, 0, 3, 2), fold(3, 4, 5, 1), fold(5, 3, 5, 6)]);
        assert_eq!(s.lines().len(), 1);
        let removed = s.remove_fold(&Range::new(3, 4, 5, 1)).unwrap();
        assert_eq!(removed.range, Range::new(3, 4, 5, 1));
        assert_eq!(s.lines().len(), 2);
        assert_eq!(s.lines()[1].start(), Point::new(5, 3));
    }

    #[test]
    fn test_remove_unknown_fold() {
        let mut s = set(&[fold(1, 0, 3, 2)]);
        assert!(s.remove_fold(&Range::new(0, 0, 0, 5)).is_none());
        assert_eq!(s.fold_count(), 1);
    }

    #[test]
    fn test_remove_folds() {
        let mut s = set(&[fold(1, 0, 2, 0), fold(5, 0, 7, 0)]);
        s.remove_folds(&[fold(1, 0, 2, 0)]);
        assert_eq!(s.all_folds(), vec![fold(5, 0, 7, 0)]);
    }

    #[test]
    fn test_record_conversion() {
        let f = fold(1, 0, 2, 0);
        let record = FoldRecord::from(&f);
        assert_eq!(Fold::from(record), f);
    }
}
