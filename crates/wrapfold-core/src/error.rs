/// Typed failures raised by the layout engine.
use thiserror::Error;

use crate::history::Range;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Wrap data lost or duplicated a row entry during reconciliation.
    ///
    /// Screen positions are unreliable until [`crate::LayoutSession::rebuild`] runs.
    #[error("wrap data has {wrap_rows} rows but the buffer has {buffer_rows}")]
    WrapDataMismatch { wrap_rows: usize, buffer_rows: usize },

    #[error("fold {0:?} must span at least two characters")]
    FoldTooShort(Range),

    #[error("fold {0:?} overlaps an existing fold")]
    FoldOverlap(Range),
}
