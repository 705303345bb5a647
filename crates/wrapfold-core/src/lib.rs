//! Document/screen layout engine.
//!
//! [`LayoutSession`] owns a [`TextBuffer`], a [`FoldSet`] and three caches
//! (row anchors, wrap splits, measured row widths) and keeps them consistent
//! under incremental edits while translating between document and screen
//! coordinates.

pub mod buffer;
pub mod display;
pub mod error;
pub mod fold;
pub mod history;
pub mod row_cache;
pub mod session;
pub mod word;
pub mod wrap;

pub use buffer::TextBuffer;
pub use error::LayoutError;
pub use fold::{Fold, FoldLine, FoldSet, Segment};
pub use history::{DocPosition, ScreenPosition};
pub use session::{Change, LayoutSession, RowKind};
pub use word::WordClassifier;
