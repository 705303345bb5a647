/// Core value types for buffer deltas and undo groups.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A document position: 0-indexed row and char column within that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// 0-indexed row.
    pub row: usize,
    /// 0-indexed column (char offset within the row).
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.column.cmp(&other.column))
    }
}

/// A half-open document range `[start, end)`.
///
/// The comparison helpers return `-1`, `0` or `1` rather than [`Ordering`]
/// because several callers distinguish more than three outcomes
/// (see [`Range::compare_range`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start_row: usize, start_column: usize, end_row: usize, end_column: usize) -> Self {
        Self {
            start: Point::new(start_row, start_column),
            end: Point::new(end_row, end_column),
        }
    }

    /// Builds a range from two points, in the given order.
    pub fn from_points(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Collapsed range at `point`.
    pub fn empty_at(point: Point) -> Self {
        Self::from_points(point, point)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_multi_line(&self) -> bool {
        self.start.row != self.end.row
    }

    pub fn is_start(&self, row: usize, column: usize) -> bool {
        self.start.row == row && self.start.column == column
    }

    pub fn is_end(&self, row: usize, column: usize) -> bool {
        self.end.row == row && self.end.column == column
    }

    /// Compares a point against this range, both ends inclusive.
    ///
    /// Returns `-1` if the point lies before the range, `1` if after,
    /// `0` if inside.
    pub fn compare(&self, row: usize, column: usize) -> i8 {
        if !self.is_multi_line() && row == self.start.row {
            return if column < self.start.column {
                -1
            } else if column > self.end.column {
                1
            } else {
                0
            };
        }
        if row < self.start.row {
            return -1;
        }
        if row > self.end.row {
            return 1;
        }
        if self.start.row == row {
            return if column >= self.start.column { 0 } else { -1 };
        }
        if self.end.row == row {
            return if column <= self.end.column { 0 } else { 1 };
        }
        0
    }

    /// Like [`Range::compare`], but a point equal to `start` counts as before.
    pub fn compare_start(&self, row: usize, column: usize) -> i8 {
        if self.is_start(row, column) {
            -1
        } else {
            self.compare(row, column)
        }
    }

    /// Like [`Range::compare`], but a point equal to `end` counts as after.
    pub fn compare_end(&self, row: usize, column: usize) -> i8 {
        if self.is_end(row, column) {
            1
        } else {
            self.compare(row, column)
        }
    }

    /// Like [`Range::compare`], but both edges count as outside.
    pub fn compare_inside(&self, row: usize, column: usize) -> i8 {
        if self.is_end(row, column) {
            1
        } else if self.is_start(row, column) {
            -1
        } else {
            self.compare(row, column)
        }
    }

    /// Compares `other` against this range.
    ///
    /// * `-2`: `other` ends before this range starts
    /// * `-1`: `other` starts before this range and ends inside it
    /// * `0`: `other` lies inside this range or encloses it
    /// * `1`: `other` starts inside this range and ends after it
    /// * `2`: `other` starts after this range ends
    /// * `42`: `other` is inverted (its start lies after this range while
    ///   its end lies inside)
    pub fn compare_range(&self, other: &Range) -> i8 {
        let cmp = self.compare(other.end.row, other.end.column);
        if cmp == 1 {
            match self.compare(other.start.row, other.start.column) {
                1 => 2,
                0 => 1,
                _ => 0,
            }
        } else if cmp == -1 {
            -2
        } else {
            match self.compare(other.start.row, other.start.column) {
                -1 => -1,
                1 => 42,
                _ => 0,
            }
        }
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        self.compare(row, column) == 0
    }
}

/// What a delta did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaAction {
    Insert,
    Remove,
}

/// One atomic buffer edit.
///
/// `lines` holds the inserted or removed text split on `\n`, so
/// `lines.len() == range.end.row - range.start.row + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub action: DeltaAction,
    pub range: Range,
    pub lines: Vec<String>,
}

impl Delta {
    pub fn is_insert(&self) -> bool {
        self.action == DeltaAction::Insert
    }

    /// Number of rows added (insert) or removed (remove) by this delta.
    pub fn row_delta(&self) -> usize {
        self.range.end.row - self.range.start.row
    }

    /// The delta that undoes this one.
    pub fn inverted(&self) -> Delta {
        let action = match self.action {
            DeltaAction::Insert => DeltaAction::Remove,
            DeltaAction::Remove => DeltaAction::Insert,
        };
        Delta {
            action,
            range: self.range,
            lines: self.lines.clone(),
        }
    }

    /// The affected text joined back with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Snapshot of a fold, kept so that undo can restore folds an edit removed.
///
/// Mirrors the fold type of `wrapfold-core` without depending on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRecord {
    pub range: Range,
    pub placeholder: String,
}

/// One batch inside an undo group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaBatch {
    /// Buffer deltas, in the order they were applied.
    Doc(Vec<Delta>),
    /// Folds removed as a side effect of the preceding buffer deltas.
    Fold(Vec<FoldRecord>),
}

/// A group of batches that undo/redo as a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditGroup {
    /// Batches in chronological order.
    pub batches: Vec<DeltaBatch>,
    /// Monotonic sequence number assigned by the `UndoManager`.
    pub seq: u64,
}
