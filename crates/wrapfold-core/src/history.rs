// Re-exports from wrapfold-mod-history plus the screen-side position type.
// The history crate owns the document-side value types so both crates agree
// on what a delta looks like.
use serde::{Deserialize, Serialize};

pub use wrapfold_mod_history::{
    merge_undo_selection, Delta, DeltaAction, DeltaBatch, EditGroup, FoldRecord, HistoryConfig,
    Point, Range, UndoManager,
};

/// Logical (row, char column) address into the buffer.
pub type DocPosition = Point;

/// Address into the wrapped/folded layout. `column` counts display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub row: usize,
    pub column: usize,
}

impl ScreenPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<ScreenPosition> for Point {
    fn from(p: ScreenPosition) -> Self {
        Point::new(p.row, p.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_position_orders_row_first() {
        assert!(ScreenPosition::new(0, 9) < ScreenPosition::new(1, 0));
        assert!(ScreenPosition::new(2, 1) < ScreenPosition::new(2, 3));
    }

    #[test]
    fn test_screen_position_into_point() {
        let p: Point = ScreenPosition::new(3, 7).into();
        assert_eq!(p, Point::new(3, 7));
    }
}
