//! Display-token classification and display-width measurement.
//!
//! Both are pure functions of a string, a starting display column and the
//! tab size. Tab stops depend on the column a tab starts at, so callers that
//! measure a fragment of a line must pass where that fragment begins.

/// Coarse category of one display column, used to pick wrap points.
///
/// Ordering matters: every tag `>= Space` counts as whitespace when looking
/// for a split, and `< PlaceholderStart` covers ordinary glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenTag {
    Char = 1,
    /// Second column of a double-width glyph.
    CharExtension = 2,
    PlaceholderStart = 3,
    PlaceholderBody = 4,
    Punctuation = 9,
    Space = 10,
    Tab = 11,
    /// Columns a tab occupies after its first one.
    TabContinuation = 12,
}

impl TokenTag {
    pub fn is_whitespace(self) -> bool {
        self >= TokenTag::Space
    }

    pub fn is_placeholder(self) -> bool {
        matches!(self, TokenTag::PlaceholderStart | TokenTag::PlaceholderBody)
    }

    /// Whether this column is a screen-only expansion with no document char behind it.
    pub fn is_expansion(self) -> bool {
        matches!(self, TokenTag::TabContinuation | TokenTag::CharExtension)
    }
}

/// East-Asian wide and fullwidth code point ranges, inclusive.
const FULL_WIDTH_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115F),
    (0x11A3, 0x11A7),
    (0x11FA, 0x11FF),
    (0x2329, 0x232A),
    (0x2E80, 0x2E99),
    (0x2E9B, 0x2EF3),
    (0x2F00, 0x2FD5),
    (0x2FF0, 0x2FFB),
    (0x3000, 0x303E),
    (0x3041, 0x3096),
    (0x3099, 0x30FF),
    (0x3105, 0x312D),
    (0x3131, 0x318E),
    (0x3190, 0x31BA),
    (0x31C0, 0x31E3),
    (0x31F0, 0x321E),
    (0x3220, 0x3247),
    (0x3250, 0x32FE),
    (0x3300, 0x4DBF),
    (0x4E00, 0xA48C),
    (0xA490, 0xA4C6),
    (0xA960, 0xA97C),
    (0xAC00, 0xD7A3),
    (0xD7B0, 0xD7C6),
    (0xD7CB, 0xD7FB),
    (0xF900, 0xFAFF),
    (0xFE10, 0xFE19),
    (0xFE30, 0xFE52),
    (0xFE54, 0xFE66),
    (0xFE68, 0xFE6B),
    (0xFF01, 0xFF60),
    (0xFFE0, 0xFFE6),
];

/// Whether `c` occupies two display columns.
pub fn is_full_width(c: char) -> bool {
    let cp = c as u32;
    if cp < 0x1100 {
        return false;
    }
    FULL_WIDTH_RANGES
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

fn is_punctuation(c: char) -> bool {
    matches!(c as u32, 40..=47 | 58..=63)
}

/// Columns from `column` to the next tab stop.
pub fn tab_stop_width(column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    tab_size - column % tab_size
}

/// Classifies `text` into display tags, assuming it starts at `start_column`.
pub fn classify(text: &str, start_column: usize, tab_size: usize) -> Vec<TokenTag> {
    let mut tags = Vec::with_capacity(text.len());
    classify_into(&mut tags, text, start_column, tab_size);
    tags
}

/// Appends the tags of `text` to `tags`; `start_column` is the display
/// column of the first char relative to the start of `tags`.
pub fn classify_into(tags: &mut Vec<TokenTag>, text: &str, start_column: usize, tab_size: usize) {
    let base = tags.len();
    for c in text.chars() {
        match c {
            '\t' => {
                let width = tab_stop_width(tags.len() - base + start_column, tab_size);
                tags.push(TokenTag::Tab);
                tags.extend(std::iter::repeat(TokenTag::TabContinuation).take(width - 1));
            }
            ' ' => tags.push(TokenTag::Space),
            c if is_punctuation(c) => tags.push(TokenTag::Punctuation),
            c if is_full_width(c) => {
                tags.push(TokenTag::Char);
                tags.push(TokenTag::CharExtension);
            }
            _ => tags.push(TokenTag::Char),
        }
    }
}

/// Tags for a fold placeholder: its display columns, marked unsplittable.
pub fn placeholder_tags(placeholder: &str, start_column: usize, tab_size: usize) -> Vec<TokenTag> {
    let mut tags = classify(placeholder, start_column, tab_size);
    for (i, tag) in tags.iter_mut().enumerate() {
        *tag = if i == 0 {
            TokenTag::PlaceholderStart
        } else {
            TokenTag::PlaceholderBody
        };
    }
    tags
}

/// Measures `text` starting at display column `start_column`.
///
/// Stops after the first char that pushes the column past `max_column`.
/// Returns `(end_column, chars_consumed)`; `end_column` includes
/// `start_column`, and `chars_consumed` excludes the char that overflowed.
pub fn string_screen_width(
    text: &str,
    max_column: Option<usize>,
    start_column: usize,
    tab_size: usize,
) -> (usize, usize) {
    if max_column == Some(0) {
        return (0, 0);
    }
    let max_column = max_column.unwrap_or(usize::MAX);
    let mut column = start_column;
    let mut consumed = 0;
    for c in text.chars() {
        column += if c == '\t' {
            tab_stop_width(column, tab_size)
        } else if is_full_width(c) {
            2
        } else {
            1
        };
        if column > max_column {
            break;
        }
        consumed += 1;
    }
    (column, consumed)
}
