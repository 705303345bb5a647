/// Sparse document-row to screen-row anchors.
///
/// Each entry records that document row `doc_rows[i]` starts at screen row
/// `screen_rows[i]`. Both sequences are strictly increasing. Entries are
/// appended lazily while resolving queries and dropped from the edit point on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCache {
    doc_rows: Vec<usize>,
    screen_rows: Vec<usize>,
}

/// A known-correct (document row, screen row) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub doc_row: usize,
    pub screen_row: usize,
}

/// Index of the largest entry `<= key` in a sorted slice.
pub fn lookup_floor(keys: &[usize], key: usize) -> Option<usize> {
    match keys.binary_search(&key) {
        Ok(idx) => Some(idx),
        Err(idx) => idx.checked_sub(1),
    }
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.doc_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_rows.is_empty()
    }

    /// Nearest anchor at or before `doc_row`.
    pub fn floor_by_doc(&self, doc_row: usize) -> Option<Anchor> {
        lookup_floor(&self.doc_rows, doc_row).map(|i| self.anchor(i))
    }

    /// Nearest anchor at or before `screen_row`.
    pub fn floor_by_screen(&self, screen_row: usize) -> Option<Anchor> {
        lookup_floor(&self.screen_rows, screen_row).map(|i| self.anchor(i))
    }

    pub fn last(&self) -> Option<Anchor> {
        self.len().checked_sub(1).map(|i| self.anchor(i))
    }

    /// Appends an anchor. Out-of-order anchors are ignored.
    pub fn push(&mut self, doc_row: usize, screen_row: usize) {
        if let Some(last) = self.last() {
            if doc_row <= last.doc_row || screen_row <= last.screen_row {
                return;
            }
        }
        self.doc_rows.push(doc_row);
        self.screen_rows.push(screen_row);
    }

    /// Drops every anchor past `doc_row`. Row 0 clears the cache.
    pub fn truncate_from(&mut self, doc_row: usize) {
        if doc_row == 0 {
            self.clear();
            return;
        }
        let keep = lookup_floor(&self.doc_rows, doc_row).map_or(0, |i| i + 1);
        self.doc_rows.truncate(keep);
        self.screen_rows.truncate(keep);
    }

    pub fn clear(&mut self) {
        self.doc_rows.clear();
        self.screen_rows.clear();
    }

    pub fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        (0..self.len()).map(|i| self.anchor(i))
    }

    fn anchor(&self, i: usize) -> Anchor {
        Anchor {
            doc_row: self.doc_rows[i],
            screen_row: self.screen_rows[i],
        }
    }
}
