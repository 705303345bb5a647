/// Undo/redo history for layout sessions.
///
/// Provides the delta and range value types shared with `wrapfold-core`,
/// an in-memory `UndoManager` that groups recorded batches into undo steps,
/// and the selection merger used when replaying a group.
pub mod config;
pub mod manager;
pub mod operation;
pub mod selection;

pub use config::HistoryConfig;
pub use manager::UndoManager;
pub use operation::{Delta, DeltaAction, DeltaBatch, EditGroup, FoldRecord, Point, Range};
pub use selection::merge_undo_selection;
