//! Layout session combining the buffer, folds, and layout caches.
//!
//! A `LayoutSession` owns a `TextBuffer`, a `FoldSet`, undo history and the
//! three layout caches (row anchors, wrap splits, measured row widths).
//! Coordinate translation lives in the `coords` submodule, cache
//! maintenance after edits in `reconcile`, and history replay in `undo`.

mod coords;
mod reconcile;
mod undo;

pub use coords::RowKind;

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;
use wrapfold_config::LayoutConfig;

use crate::buffer::{char_slice, TextBuffer};
use crate::display::string_screen_width;
use crate::error::LayoutError;
use crate::fold::{Fold, FoldSet, Segment};
use crate::history::{Delta, DeltaBatch, DocPosition, FoldRecord, HistoryConfig, Point, Range, UndoManager};
use crate::row_cache::RowCache;
use crate::word::WordClassifier;

/// What one edit did: the buffer deltas and the folds it destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Change {
    pub deltas: Vec<Delta>,
    pub removed_folds: Vec<Fold>,
}

/// A document laid out for display.
#[derive(Debug)]
pub struct LayoutSession {
    /// The text being laid out.
    buffer: TextBuffer,
    /// Collapsed ranges.
    folds: FoldSet,
    /// Known document-row to screen-row anchors.
    row_cache: RowCache,
    /// Split offsets per document row. Empty unless wrap mode is on, then
    /// exactly one entry per row; folded lines are keyed by their start row.
    wrap_data: Vec<Vec<usize>>,
    /// Measured screen width per row, `None` when stale. One entry per row.
    row_lengths: Vec<Option<usize>>,
    /// Extra screen rows shown under a document row.
    line_widgets: BTreeMap<usize, usize>,
    /// Undo/redo history.
    history: UndoManager,
    /// Word boundaries for word-range queries.
    words: WordClassifier,
    tab_size: usize,
    use_wrap_mode: bool,
    wrap_limit: usize,
    wrap_limit_range: (Option<usize>, Option<usize>),
    /// Wrap limit used when no range is set.
    print_margin: usize,
    wrap_as_code: bool,
    /// Cached result of [`LayoutSession::screen_width`].
    screen_width: usize,
    /// Whether `screen_width` must be recomputed.
    width_dirty: bool,
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutSession {
    /// Creates a session over an empty document with default settings.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Creates a session over `text` with default settings.
    pub fn from_text(text: &str) -> Self {
        Self::with_config(text, &LayoutConfig::default())
    }

    /// Creates a session over `text` laid out per `config`.
    pub fn with_config(text: &str, config: &LayoutConfig) -> Self {
        let mut session = Self {
            buffer: TextBuffer::from(text),
            folds: FoldSet::new(),
            row_cache: RowCache::new(),
            wrap_data: Vec::new(),
            row_lengths: Vec::new(),
            line_widgets: BTreeMap::new(),
            history: UndoManager::new(HistoryConfig::default()),
            words: WordClassifier::default(),
            tab_size: 4,
            use_wrap_mode: false,
            wrap_limit: 80,
            wrap_limit_range: (None, None),
            print_margin: 80,
            wrap_as_code: false,
            screen_width: 0,
            width_dirty: true,
        };
        session.apply_config(config);
        session
    }

    /// Replaces the undo history configuration, dropping recorded history.
    pub fn set_history_config(&mut self, config: HistoryConfig) {
        self.history = UndoManager::new(config);
    }

    pub fn set_word_classifier(&mut self, words: WordClassifier) {
        self.words = words;
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn folds(&self) -> &FoldSet {
        &self.folds
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Starts a new undo group with the next edit.
    pub fn break_undo_group(&mut self) {
        self.history.force_group_break();
    }

    pub fn len_lines(&self) -> usize {
        self.buffer.len_lines()
    }

    /// Text of `row`, or an empty string past the end.
    pub(crate) fn line_text(&self, row: usize) -> String {
        self.buffer.line(row).unwrap_or_default()
    }

    // ── Settings ────────────────────────────────────────────────────

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn use_wrap_mode(&self) -> bool {
        self.use_wrap_mode
    }

    pub fn wrap_limit(&self) -> usize {
        self.wrap_limit
    }

    pub fn wrap_as_code(&self) -> bool {
        self.wrap_as_code
    }

    pub fn print_margin(&self) -> usize {
        self.print_margin
    }

    /// Applies every field of `config` and recomputes the whole layout.
    pub fn apply_config(&mut self, config: &LayoutConfig) {
        let mut config = config.clone();
        config.sanitize();
        self.tab_size = config.tab_size;
        self.use_wrap_mode = config.use_wrap_mode;
        self.wrap_as_code = config.wrap_as_code;
        self.wrap_limit_range = (config.wrap_limit_min, config.wrap_limit_max);
        self.print_margin = config.print_margin;
        self.wrap_limit = constrain_wrap_limit(config.wrap_limit, self.wrap_limit_range);
        self.rebuild();
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        if tab_size == 0 || tab_size == self.tab_size {
            return;
        }
        self.tab_size = tab_size;
        self.rebuild();
    }

    pub fn set_use_wrap_mode(&mut self, use_wrap_mode: bool) {
        if use_wrap_mode == self.use_wrap_mode {
            return;
        }
        self.use_wrap_mode = use_wrap_mode;
        self.rebuild();
    }

    pub fn set_wrap_as_code(&mut self, wrap_as_code: bool) {
        if wrap_as_code == self.wrap_as_code {
            return;
        }
        self.wrap_as_code = wrap_as_code;
        if self.use_wrap_mode {
            self.rebuild();
        }
    }

    /// Pins the wrap limit to exactly `limit`.
    pub fn set_wrap_limit(&mut self, limit: usize) -> bool {
        self.set_wrap_limit_range(Some(limit), Some(limit));
        self.adjust_wrap_limit(limit)
    }

    /// Sets the fallback wrap limit and renegotiates the current one.
    ///
    /// Only takes effect on the limit when no range is set.
    pub fn set_print_margin(&mut self, print_margin: usize) -> bool {
        if print_margin <= 1 {
            return false;
        }
        self.print_margin = print_margin;
        self.adjust_wrap_limit(self.wrap_limit)
    }

    /// Bounds applied by [`LayoutSession::adjust_wrap_limit`].
    pub fn set_wrap_limit_range(&mut self, min: Option<usize>, max: Option<usize>) {
        self.wrap_limit_range = (min, max);
    }

    /// Negotiates the wrap limit from a desired width, e.g. the viewport's.
    ///
    /// The desired value is clamped into the configured range, or pinned to
    /// the print margin when no range is set. Limits of 0 or 1 are ignored.
    /// Returns whether the limit changed.
    pub fn adjust_wrap_limit(&mut self, desired: usize) -> bool {
        let range = match self.wrap_limit_range {
            (None, None) => (Some(self.print_margin), Some(self.print_margin)),
            range => range,
        };
        let limit = constrain_wrap_limit(desired, range);
        if limit == self.wrap_limit || limit <= 1 {
            return false;
        }
        debug!("Wrap limit {} -> {limit}", self.wrap_limit);
        self.wrap_limit = limit;
        self.width_dirty = true;
        if self.use_wrap_mode {
            self.rebuild();
        }
        true
    }

    /// Discards every layout cache and recomputes the whole document.
    ///
    /// This is the recovery path after [`LayoutError::WrapDataMismatch`].
    pub fn rebuild(&mut self) {
        let rows = self.buffer.len_lines();
        debug!(rows, wrap = self.use_wrap_mode, "Rebuilding layout");
        self.row_cache.clear();
        self.row_lengths = vec![None; rows];
        self.wrap_data.clear();
        if self.use_wrap_mode {
            self.wrap_data = vec![Vec::new(); rows];
            self.update_wrap_data(0, rows - 1);
        }
        self.width_dirty = true;
    }

    /// Re-lays-out rows `first..=last` after a fold or widget change.
    fn refresh_rows(&mut self, first: usize, last: usize) {
        self.row_cache.truncate_from(first);
        self.width_dirty = true;
        if self.use_wrap_mode {
            self.update_wrap_data(first, last);
        } else {
            self.update_row_length_cache(first, last);
        }
    }

    // ── Measurements ────────────────────────────────────────────────

    /// Screen rows taken by document row `row`: its wrapped rows plus widget rows.
    pub fn row_length(&self, row: usize) -> usize {
        self.row_line_count(row) + self.line_widgets.get(&row).copied().unwrap_or(0)
    }

    /// Screen rows taken by the text of `row`, ignoring widgets.
    pub fn row_line_count(&self, row: usize) -> usize {
        1 + self.row_split_data(row).map_or(0, <[usize]>::len)
    }

    /// Wrap splits of `row`, or `None` when wrap mode is off.
    pub fn row_split_data(&self, row: usize) -> Option<&[usize]> {
        if !self.use_wrap_mode {
            return None;
        }
        self.wrap_data.get(row).map(Vec::as_slice)
    }

    /// Number of visible screen rows.
    pub fn screen_length(&self) -> usize {
        let rows = self.buffer.len_lines();
        let mut lines = self.folds.lines().iter().peekable();
        let mut total = 0;
        let mut row = 0;
        while row < rows {
            total += self.row_length(row);
            while lines.next_if(|l| l.end_row() < row).is_some() {}
            match lines.peek() {
                Some(line) if line.start_row() == row => {
                    row = line.end_row() + 1;
                    lines.next();
                }
                _ => row += 1,
            }
        }
        total
    }

    /// Widest screen row: the wrap limit in wrap mode, else the longest
    /// visible line as displayed.
    pub fn screen_width(&mut self) -> usize {
        if !self.width_dirty {
            return self.screen_width;
        }
        self.width_dirty = false;
        if self.use_wrap_mode {
            self.screen_width = self.wrap_limit;
            return self.screen_width;
        }
        let rows = self.buffer.len_lines();
        self.row_lengths.resize(rows, None);
        let mut widest = 0;
        let mut row = 0;
        while row < rows {
            let fold_line = self.folds.fold_line_index(row);
            let width = match self.row_lengths[row] {
                Some(width) => width,
                None => {
                    let text = match fold_line {
                        Some(idx) => self.fold_display_line(idx),
                        None => self.line_text(row),
                    };
                    let width = string_screen_width(&text, None, 0, self.tab_size).0;
                    self.row_lengths[row] = Some(width);
                    width
                }
            };
            widest = widest.max(width);
            row = match fold_line {
                Some(idx) => self.folds.lines()[idx].end_row() + 1,
                None => row + 1,
            };
        }
        self.screen_width = widest;
        widest
    }

    // ── Line widgets ────────────────────────────────────────────────

    /// Reserves `rows` extra screen rows under document row `row`.
    pub fn set_line_widget(&mut self, row: usize, rows: usize) {
        if rows == 0 {
            self.remove_line_widget(row);
            return;
        }
        self.line_widgets.insert(row, rows);
        self.row_cache.truncate_from(row);
    }

    pub fn remove_line_widget(&mut self, row: usize) -> Option<usize> {
        let removed = self.line_widgets.remove(&row);
        if removed.is_some() {
            self.row_cache.truncate_from(row);
        }
        removed
    }

    pub fn line_widget(&self, row: usize) -> Option<usize> {
        self.line_widgets.get(&row).copied()
    }

    // ── Folds ───────────────────────────────────────────────────────

    /// Folds `range` (clipped to the document) behind `placeholder`.
    ///
    /// # Errors
    ///
    /// Fails if the fold is too short or intersects an existing fold.
    pub fn add_fold(&mut self, fold: Fold) -> Result<(), LayoutError> {
        let range = self.clip_range_to_document(fold.range);
        let idx = self.folds.add_fold(Fold::new(range, fold.placeholder))?;
        let line = self.folds.lines()[idx].range();
        self.refresh_rows(line.start.row, line.end.row);
        Ok(())
    }

    /// Removes the fold covering exactly `range`.
    pub fn remove_fold(&mut self, range: &Range) -> Option<Fold> {
        let span = self.folds.fold_line(range.start.row).map(|l| l.range())?;
        let removed = self.folds.remove_fold(range)?;
        self.refresh_rows(span.start.row, span.end.row);
        Some(removed)
    }

    pub fn remove_folds(&mut self, folds: &[Fold]) -> Vec<Fold> {
        folds.iter().filter_map(|f| self.remove_fold(&f.range)).collect()
    }

    /// Expands every fold on the screen line showing `row`.
    pub fn unfold_row(&mut self, row: usize) -> Vec<Fold> {
        let folds = match self.folds.fold_line(row) {
            Some(line) => line.folds().to_vec(),
            None => return Vec::new(),
        };
        self.remove_folds(&folds)
    }

    pub fn all_folds(&self) -> Vec<Fold> {
        self.folds.all_folds()
    }

    pub fn is_row_folded(&self, row: usize) -> bool {
        self.folds.fold_line(row).is_some()
    }

    /// First document row shown on the same screen line as `row`.
    pub fn row_fold_start(&self, row: usize) -> usize {
        self.folds.fold_line(row).map_or(row, |l| l.start_row())
    }

    /// Last document row shown on the same screen line as `row`.
    pub fn row_fold_end(&self, row: usize) -> usize {
        self.folds.fold_line(row).map_or(row, |l| l.end_row())
    }

    /// Visible document rows among `first..=last`, counting each folded
    /// stretch once.
    pub fn folded_row_count(&self, first: usize, last: usize) -> usize {
        if first > last {
            return 0;
        }
        let mut count = last - first + 1;
        for line in self.folds.lines() {
            let (start, end) = (line.start_row(), line.end_row());
            if end >= last {
                if start < last {
                    if start >= first {
                        count -= last - start;
                    } else {
                        count = 0;
                    }
                }
                break;
            } else if end >= first {
                if start >= first {
                    count -= end - start;
                } else {
                    count -= end - first + 1;
                }
            }
        }
        count
    }

    /// Display text of fold line `line_idx`, placeholders substituted.
    pub fn fold_display_line(&self, line_idx: usize) -> String {
        match self.folds.lines().get(line_idx) {
            Some(line) => self.fold_display_prefix(line_idx, Point::new(line.end_row(), usize::MAX)),
            None => String::new(),
        }
    }

    /// Display text of fold line `line_idx` up to document position `end`.
    pub(crate) fn fold_display_prefix(&self, line_idx: usize, end: Point) -> String {
        let Some(line) = self.folds.lines().get(line_idx) else {
            return String::new();
        };
        let mut text = String::new();
        for segment in line.walk(end) {
            match segment {
                Segment::Text { row, from, to } => {
                    text.push_str(char_slice(&self.line_text(row), from, to));
                }
                Segment::Placeholder(placeholder) => text.push_str(placeholder),
            }
        }
        text
    }

    /// Text shown for document row `row`, or `None` when a fold hides it.
    pub fn display_line(&self, row: usize) -> Option<String> {
        match self.row_kind(row) {
            RowKind::Hidden { .. } => None,
            RowKind::Folded { line } => Some(self.fold_display_line(line)),
            RowKind::Plain | RowKind::Wrapped { .. } => self.buffer.line(row).ok(),
        }
    }

    // ── Editing ─────────────────────────────────────────────────────

    /// Inserts `text` at `at` (clipped to the document).
    ///
    /// # Errors
    ///
    /// Returns an error if the layout caches fall out of step with the
    /// buffer; call [`LayoutSession::rebuild`] to recover.
    pub fn insert(&mut self, at: DocPosition, text: &str) -> Result<Change> {
        let at = self.buffer.clip_position(at.row, at.column);
        let deltas = self.buffer.insert(at, text)?.into_iter().collect();
        self.commit(deltas)
    }

    /// Removes the text in `range` (clipped to the document).
    ///
    /// # Errors
    ///
    /// As for [`LayoutSession::insert`].
    pub fn remove(&mut self, range: Range) -> Result<Change> {
        let range = self.clip_range_to_document(range);
        let deltas = self.buffer.remove(range)?.into_iter().collect();
        self.commit(deltas)
    }

    /// Replaces the text in `range` with `text`.
    ///
    /// # Errors
    ///
    /// As for [`LayoutSession::insert`].
    pub fn replace(&mut self, range: Range, text: &str) -> Result<Change> {
        let range = self.clip_range_to_document(range);
        let deltas = self.buffer.replace(range, text)?;
        self.commit(deltas)
    }

    /// Reconciles the layout with deltas already applied to the buffer
    /// and records them for undo.
    ///
    /// Every delta is recorded even when reconciling one fails, so undo
    /// still matches the buffer after [`LayoutSession::rebuild`].
    fn commit(&mut self, deltas: Vec<Delta>) -> Result<Change> {
        let mut removed_folds = Vec::new();
        for (i, delta) in deltas.iter().enumerate() {
            self.history.record(DeltaBatch::Doc(vec![delta.clone()]));
            let removed = match self.on_change(delta) {
                Ok(removed) => removed,
                Err(e) => {
                    for rest in &deltas[i + 1..] {
                        self.history.record(DeltaBatch::Doc(vec![rest.clone()]));
                    }
                    return Err(e.into());
                }
            };
            if !removed.is_empty() {
                self.history
                    .record(DeltaBatch::Fold(removed.iter().map(FoldRecord::from).collect()));
            }
            removed_folds.extend(removed);
        }
        Ok(Change {
            deltas,
            removed_folds,
        })
    }

    // ── Words ───────────────────────────────────────────────────────

    /// The word (or whitespace or punctuation run) around a position.
    pub fn word_range(&self, row: usize, column: usize) -> Range {
        let at = self.buffer.clip_position(row, column);
        self.words.word_range(&self.line_text(at.row), at.row, at.column)
    }

    /// The word around a position plus the blanks after it.
    pub fn a_word_range(&self, row: usize, column: usize) -> Range {
        let at = self.buffer.clip_position(row, column);
        self.words.a_word_range(&self.line_text(at.row), at.row, at.column)
    }
}

/// Clamps `limit` into the optional `(min, max)` bounds.
fn constrain_wrap_limit(limit: usize, (min, max): (Option<usize>, Option<usize>)) -> usize {
    let limit = min.map_or(limit, |min| limit.max(min));
    max.map_or(limit, |max| limit.min(max))
}
