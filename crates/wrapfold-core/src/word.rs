/// Word-boundary classification for word-range queries.
use anyhow::{Context, Result};
use regex::Regex;

use crate::buffer::char_slice;
use crate::history::Range;

/// Decides which chars belong to words.
///
/// Each pattern is matched against one char at a time. Without custom
/// patterns a word char is alphanumeric, `_` or `$`, and everything else
/// is a non-word char.
#[derive(Debug, Clone, Default)]
pub struct WordClassifier {
    token: Option<Regex>,
    non_token: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).context("invalid word pattern")
}

fn builtin_token(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Which run of chars a word-range query extends over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Token,
    Whitespace,
    NonToken,
}

impl WordClassifier {
    /// Builds a classifier from single-char patterns, e.g. `[\w$]`.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn with_patterns(token: &str, non_token: &str) -> Result<Self> {
        Ok(Self {
            token: Some(compile(token)?),
            non_token: Some(compile(non_token)?),
        })
    }

    pub fn is_token(&self, c: char) -> bool {
        match &self.token {
            Some(re) => re.is_match(c.encode_utf8(&mut [0; 4])),
            None => builtin_token(c),
        }
    }

    pub fn is_non_token(&self, c: char) -> bool {
        match &self.non_token {
            Some(re) => re.is_match(c.encode_utf8(&mut [0; 4])),
            None => !builtin_token(c),
        }
    }

    fn matches(&self, class: Class, c: char) -> bool {
        match class {
            Class::Token => self.is_token(c),
            Class::Whitespace => c.is_whitespace(),
            Class::NonToken => self.is_non_token(c),
        }
    }

    /// The run of same-class chars around `column` in `line`.
    ///
    /// A word char on either side of `column` selects the word; otherwise a
    /// pure whitespace neighbourhood selects the whitespace run, and anything
    /// else the non-word run.
    pub fn word_range(&self, line: &str, row: usize, column: usize) -> Range {
        let chars: Vec<char> = line.chars().collect();
        let column = column.min(chars.len());
        let before = column.checked_sub(1).and_then(|i| chars.get(i)).copied();
        let at = chars.get(column).copied();

        let class = if before.is_some_and(|c| self.is_token(c)) || at.is_some_and(|c| self.is_token(c)) {
            Class::Token
        } else {
            let around = char_slice(line, column.saturating_sub(1), column + 1);
            if !around.is_empty() && around.chars().all(char::is_whitespace) {
                Class::Whitespace
            } else {
                Class::NonToken
            }
        };

        let mut start = column;
        while start > 0 && self.matches(class, chars[start - 1]) {
            start -= 1;
        }
        let mut end = column;
        while end < chars.len() && self.matches(class, chars[end]) {
            end += 1;
        }
        Range::new(row, start, row, end)
    }

    /// Like [`WordClassifier::word_range`], extended over trailing spaces and tabs.
    pub fn a_word_range(&self, line: &str, row: usize, column: usize) -> Range {
        let mut range = self.word_range(line, row, column);
        range.end.column += line
            .chars()
            .skip(range.end.column)
            .take_while(|c| matches!(c, ' ' | '\t'))
            .count();
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_under_cursor() {
        let words = WordClassifier::default();
        assert_eq!(words.word_range("let foo_bar = 1;", 0, 6), Range::new(0, 4, 0, 11));
    }

    #[test]
    fn test_word_just_before_cursor() {
        let words = WordClassifier::default();
        assert_eq!(words.word_range("foo bar", 2, 3), Range::new(2, 0, 2, 3));
    }

    #[test]
    fn test_whitespace_run() {
        let words = WordClassifier::default();
        assert_eq!(words.word_range("a    b", 0, 3), Range::new(0, 1, 0, 5));
    }

    #[test]
    fn test_punctuation_run() {
        let words = WordClassifier::default();
        // the default non-word class also spans whitespace
        assert_eq!(words.word_range("x = (-1)", 0, 5), Range::new(0, 1, 0, 6));
    }

    #[test]
    fn test_dollar_is_a_word_char() {
        let words = WordClassifier::default();
        assert_eq!(words.word_range("$el.x", 0, 1), Range::new(0, 0, 0, 3));
    }

    #[test]
    fn test_column_past_line_end_is_clamped() {
        let words = WordClassifier::default();
        assert_eq!(words.word_range("abc", 0, 99), Range::new(0, 0, 0, 3));
        assert_eq!(words.word_range("", 0, 5), Range::new(0, 0, 0, 0));
    }

    #[test]
    fn test_a_word_range_takes_trailing_blanks() {
        let words = WordClassifier::default();
        assert_eq!(words.a_word_range("foo \t bar", 0, 1), Range::new(0, 0, 0, 6));
    }

    // ── Custom patterns ─────────────────────────────────────────────

    #[test]
    fn test_custom_patterns() {
        let words = WordClassifier::with_patterns("[a-z-]", r"[^a-z-]").unwrap();
        assert_eq!(words.word_range("(kebab-case)", 0, 3), Range::new(0, 1, 0, 11));
        assert!(!words.is_token('$'));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = WordClassifier::with_patterns("[", ".").unwrap_err();
        assert!(err.to_string().contains("invalid word pattern"));
    }
}
