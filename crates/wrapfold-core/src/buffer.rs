/// Line-oriented text buffer wrapping `ropey::Rope`.
///
/// Every mutation returns the [`Delta`] describing it; the layout session
/// feeds those deltas to its reconciler and to the undo history.
use std::borrow::Cow;
use std::fmt;

use anyhow::Result;
use ropey::Rope;

use crate::history::{Delta, DeltaAction, Point, Range};

/// A text buffer backed by a rope. Line endings are normalized to `\n`.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&normalize_newlines(text)),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Returns the underlying rope (read-only).
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Returns the number of lines. An empty buffer has one empty line.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the text of a line without its trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of bounds.
    pub fn line(&self, row: usize) -> Result<String> {
        self.check_row(row)?;
        let mut text = self.rope.line(row).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    /// Returns rows `first..=last` without trailing newlines.
    ///
    /// # Errors
    ///
    /// Returns an error if either row is out of bounds or `first > last`.
    pub fn lines(&self, first: usize, last: usize) -> Result<Vec<String>> {
        if first > last {
            anyhow::bail!("invalid row range: first ({first}) > last ({last})");
        }
        self.check_row(last)?;
        (first..=last).map(|row| self.line(row)).collect()
    }

    /// Returns every line of the buffer.
    pub fn all_lines(&self) -> Vec<String> {
        self.rope
            .lines()
            .map(|l| {
                let mut text = l.to_string();
                if text.ends_with('\n') {
                    text.pop();
                }
                text
            })
            .collect()
    }

    /// Returns the length of a line in chars, excluding the newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of bounds.
    pub fn line_len(&self, row: usize) -> Result<usize> {
        self.check_row(row)?;
        let line = self.rope.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            return Ok(len - 1);
        }
        Ok(len)
    }

    /// Clamps a position into the buffer: past the last row lands at the end
    /// of the document, past the end of a line lands at its end.
    pub fn clip_position(&self, row: usize, column: usize) -> Point {
        let last_row = self.len_lines() - 1;
        if row > last_row {
            return Point::new(last_row, self.line_len(last_row).unwrap_or(0));
        }
        let len = self.line_len(row).unwrap_or(0);
        Point::new(row, column.min(len))
    }

    /// Converts a position to a char index into the rope.
    ///
    /// # Errors
    ///
    /// Returns an error if the row or column is out of bounds.
    pub fn point_to_char(&self, point: Point) -> Result<usize> {
        let len = self.line_len(point.row)?;
        if point.column > len {
            anyhow::bail!(
                "column {} out of bounds (row {} has {} chars)",
                point.column,
                point.row,
                len
            );
        }
        Ok(self.rope.line_to_char(point.row) + point.column)
    }

    /// Returns the text covered by `range`, rows joined with `\n`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or inverted.
    pub fn text_range(&self, range: Range) -> Result<String> {
        let (start, end) = self.char_span(range)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Inserts `text` at `at`.
    ///
    /// Returns `None` when `text` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `at` is out of bounds.
    pub fn insert(&mut self, at: Point, text: &str) -> Result<Option<Delta>> {
        let char_idx = self.point_to_char(at)?;
        if text.is_empty() {
            return Ok(None);
        }
        let text = normalize_newlines(text);
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let end = end_of_insert(at, &lines);
        self.rope.insert(char_idx, &text);
        Ok(Some(Delta {
            action: DeltaAction::Insert,
            range: Range::from_points(at, end),
            lines,
        }))
    }

    /// Removes the text covered by `range`.
    ///
    /// Returns `None` when the range is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or inverted.
    pub fn remove(&mut self, range: Range) -> Result<Option<Delta>> {
        let (start, end) = self.char_span(range)?;
        if start == end {
            return Ok(None);
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        Ok(Some(Delta {
            action: DeltaAction::Remove,
            range,
            lines: removed.split('\n').map(str::to_string).collect(),
        }))
    }

    /// Replaces the text in `range` with `text`: a remove followed by an insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn replace(&mut self, range: Range, text: &str) -> Result<Vec<Delta>> {
        let mut deltas = Vec::with_capacity(2);
        deltas.extend(self.remove(range)?);
        deltas.extend(self.insert(range.start, text)?);
        Ok(deltas)
    }

    /// Re-applies a recorded delta.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta does not fit the current text.
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<()> {
        match delta.action {
            DeltaAction::Insert => {
                let text = delta.text();
                let end = end_of_insert(delta.range.start, &delta.lines);
                if end != delta.range.end {
                    anyhow::bail!(
                        "insert delta text ends at {:?}, range says {:?}",
                        end,
                        delta.range.end
                    );
                }
                let char_idx = self.point_to_char(delta.range.start)?;
                self.rope.insert(char_idx, &text);
            }
            DeltaAction::Remove => {
                let (start, end) = self.char_span(delta.range)?;
                let current = self.rope.slice(start..end).to_string();
                if current != delta.text() {
                    anyhow::bail!("remove delta text does not match buffer at {:?}", delta.range);
                }
                self.rope.remove(start..end);
            }
        }
        Ok(())
    }

    /// Undoes a delta previously applied to this buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta does not fit the current text.
    pub fn revert_delta(&mut self, delta: &Delta) -> Result<()> {
        self.apply_delta(&delta.inverted())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rope.len_lines() {
            anyhow::bail!(
                "row {} out of bounds (buffer has {} lines)",
                row,
                self.rope.len_lines()
            );
        }
        Ok(())
    }

    fn char_span(&self, range: Range) -> Result<(usize, usize)> {
        if range.start > range.end {
            anyhow::bail!("invalid range: start {:?} > end {:?}", range.start, range.end);
        }
        Ok((self.point_to_char(range.start)?, self.point_to_char(range.end)?))
    }
}

/// Position right after `lines` once they are inserted at `at`.
fn end_of_insert(at: Point, lines: &[String]) -> Point {
    match lines {
        [] => at,
        [only] => Point::new(at.row, at.column + only.chars().count()),
        [.., last] => Point::new(at.row + lines.len() - 1, last.chars().count()),
    }
}

/// Rewrites `\r\n` and lone `\r` as `\n`.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Slices `s` by char offsets, clamping both ends to its length.
pub(crate) fn char_slice(s: &str, from: usize, to: usize) -> &str {
    let byte_at = |idx: usize| s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b);
    let start = byte_at(from);
    let end = if to <= from { start } else { byte_at(to) };
    &s[start..end]
}
