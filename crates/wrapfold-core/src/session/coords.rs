/// Document/screen coordinate translation.
///
/// Both directions walk forward from the nearest row-cache anchor, jumping
/// over fold lines in one step, and append new anchors when they walk past
/// the last one.
use super::LayoutSession;
use crate::buffer::char_slice;
use crate::display::{string_screen_width, tab_stop_width};
use crate::history::{DocPosition, Point, Range, ScreenPosition};

/// How a document row is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// One screen row of plain text.
    Plain,
    /// Plain text broken into `segments` screen rows.
    Wrapped { segments: usize },
    /// First row of fold line `line`; shows that line's display text.
    Folded { line: usize },
    /// Swallowed by fold line `line`; has no screen row of its own.
    Hidden { line: usize },
}

impl LayoutSession {
    pub fn row_kind(&self, row: usize) -> RowKind {
        if let Some(line) = self.folds.fold_line_index(row) {
            return if self.folds.lines()[line].start_row() == row {
                RowKind::Folded { line }
            } else {
                RowKind::Hidden { line }
            };
        }
        match self.row_line_count(row) {
            1 => RowKind::Plain,
            segments => RowKind::Wrapped { segments },
        }
    }

    /// Maps a screen position to the document position displayed there.
    ///
    /// Negative rows map to the document start; rows past the end map to
    /// the end of the last line. Columns past a wrapped segment stay on
    /// that segment's last char.
    pub fn screen_to_document_position(&mut self, screen_row: isize, screen_column: usize) -> DocPosition {
        let Ok(screen_row) = usize::try_from(screen_row) else {
            return Point::new(0, 0);
        };
        let max_row = self.buffer.len_lines() - 1;
        let (mut row, mut doc_row, do_cache) = match self.row_cache.floor_by_screen(screen_row) {
            Some(anchor) => (
                anchor.screen_row,
                anchor.doc_row,
                self.row_cache.last().is_some_and(|last| screen_row > last.screen_row),
            ),
            None => (0, 0, self.row_cache.is_empty()),
        };

        let mut line_idx = self.folds.next_fold_line_index(doc_row, 0);
        let row_length = loop {
            let length = self.row_length(doc_row);
            if row + length > screen_row || doc_row >= max_row {
                break length;
            }
            row += length;
            doc_row += 1;
            if let Some(idx) = line_idx {
                let line = &self.folds.lines()[idx];
                if doc_row > line.start_row() {
                    doc_row = line.end_row() + 1;
                    line_idx = self.folds.next_fold_line_index(doc_row, idx);
                }
            }
            if do_cache && doc_row <= max_row {
                self.row_cache.push(doc_row, row);
            }
        };

        let fold_line = line_idx.filter(|&idx| self.folds.lines()[idx].start_row() <= doc_row);
        let (text, doc_row, split_index, screen_column) = match fold_line {
            Some(idx) => {
                let start = self.folds.lines()[idx].start_row();
                let text = self.fold_display_line(idx);
                if row + row_length <= screen_row {
                    (text, start, self.row_line_count(start) - 1, usize::MAX)
                } else {
                    (text, start, screen_row - row, screen_column)
                }
            }
            None if row + row_length <= screen_row || doc_row > max_row => {
                return Point::new(max_row, self.buffer.line_len(max_row).unwrap_or(0));
            }
            None => (self.line_text(doc_row), doc_row, screen_row - row, screen_column),
        };

        let mut text = text.as_str();
        let mut doc_column = 0;
        let mut segment_end = None;
        if let Some(splits) = self.row_split_data(doc_row) {
            segment_end = splits.get(split_index).copied();
            if split_index > 0 {
                if let Some(&start) = splits.get(split_index - 1).or(splits.last()) {
                    doc_column = start;
                    text = char_slice(text, start, usize::MAX);
                }
            }
        }
        doc_column += string_screen_width(text, Some(screen_column), 0, self.tab_size).1;
        if let Some(end) = segment_end {
            if doc_column >= end {
                doc_column = end.saturating_sub(1);
            }
        }

        match fold_line {
            Some(idx) => self.folds.lines()[idx].idx_to_position(doc_column),
            None => Point::new(doc_row, doc_column),
        }
    }

    /// Maps a document position (clipped to the document) to the screen.
    ///
    /// Positions inside a fold map to where the fold starts.
    pub fn document_to_screen_position(&mut self, doc_row: usize, doc_column: usize) -> ScreenPosition {
        let mut pos = self.clip_position_to_document(doc_row, doc_column);
        if let Some(fold) = self.folds.fold_at(pos.row, pos.column, 1) {
            pos = fold.start();
        }

        let (mut row, mut screen_row, do_cache) = match self.row_cache.floor_by_doc(pos.row) {
            Some(anchor) => (
                anchor.doc_row,
                anchor.screen_row,
                self.row_cache.last().is_some_and(|last| pos.row > last.doc_row),
            ),
            None => (0, 0, self.row_cache.is_empty()),
        };

        let mut line_idx = self.folds.next_fold_line_index(row, 0);
        while row < pos.row {
            let row_end = match line_idx {
                Some(idx) if row >= self.folds.lines()[idx].start_row() => {
                    let end = self.folds.lines()[idx].end_row() + 1;
                    if end > pos.row {
                        break;
                    }
                    line_idx = self.folds.next_fold_line_index(end, idx);
                    end
                }
                _ => row + 1,
            };
            screen_row += self.row_length(row);
            row = row_end;
            if do_cache {
                self.row_cache.push(row, screen_row);
            }
        }

        let (text, wrap_row) = match line_idx {
            Some(idx) if row >= self.folds.lines()[idx].start_row() => (
                self.fold_display_prefix(idx, pos),
                self.folds.lines()[idx].start_row(),
            ),
            _ => (char_slice(&self.line_text(pos.row), 0, pos.column).to_string(), pos.row),
        };

        let mut text = text.as_str();
        if let Some(splits) = self.row_split_data(wrap_row) {
            let len = text.chars().count();
            let crossed = splits.iter().take_while(|&&split| len >= split).count();
            if crossed > 0 {
                screen_row += crossed;
                text = char_slice(text, splits[crossed - 1], usize::MAX);
            }
        }
        ScreenPosition::new(screen_row, string_screen_width(text, None, 0, self.tab_size).0)
    }

    pub fn document_to_screen_row(&mut self, doc_row: usize, doc_column: usize) -> usize {
        self.document_to_screen_position(doc_row, doc_column).row
    }

    pub fn document_to_screen_column(&mut self, doc_row: usize, doc_column: usize) -> usize {
        self.document_to_screen_position(doc_row, doc_column).column
    }

    pub fn screen_to_document_row(&mut self, screen_row: isize, screen_column: usize) -> usize {
        self.screen_to_document_position(screen_row, screen_column).row
    }

    pub fn screen_to_document_column(&mut self, screen_row: isize, screen_column: usize) -> usize {
        self.screen_to_document_position(screen_row, screen_column).column
    }

    /// Screen positions of both ends of `range`.
    pub fn document_to_screen_range(&mut self, range: Range) -> (ScreenPosition, ScreenPosition) {
        let start = self.document_to_screen_position(range.start.row, range.start.column);
        let end = self.document_to_screen_position(range.end.row, range.end.column);
        (start, end)
    }

    /// Screen column where screen row `screen_row` ends.
    pub fn screen_last_row_column(&mut self, screen_row: usize) -> usize {
        let screen_row = isize::try_from(screen_row).unwrap_or(isize::MAX);
        let pos = self.screen_to_document_position(screen_row, usize::MAX);
        self.document_to_screen_column(pos.row, pos.column)
    }

    /// Screen column where the screen row showing a document position ends.
    pub fn document_last_row_column(&mut self, doc_row: usize, doc_column: usize) -> usize {
        let screen_row = self.document_to_screen_row(doc_row, doc_column);
        self.screen_last_row_column(screen_row)
    }

    /// Last document position on the screen row showing a document position.
    pub fn document_last_row_column_position(&mut self, doc_row: usize, doc_column: usize) -> DocPosition {
        let screen_row = self.document_to_screen_row(doc_row, doc_column);
        let screen_row = isize::try_from(screen_row).unwrap_or(isize::MAX);
        self.screen_to_document_position(screen_row, usize::MAX)
    }

    pub fn clip_position_to_document(&self, row: usize, column: usize) -> DocPosition {
        self.buffer.clip_position(row, column)
    }

    pub fn clip_range_to_document(&self, range: Range) -> Range {
        Range::from_points(
            self.clip_position_to_document(range.start.row, range.start.column),
            self.clip_position_to_document(range.end.row, range.end.column),
        )
    }

    /// Width of a tab starting at `screen_column`.
    pub fn screen_tab_size(&self, screen_column: usize) -> usize {
        tab_stop_width(screen_column, self.tab_size)
    }
}
