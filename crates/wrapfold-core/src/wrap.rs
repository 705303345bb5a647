/// Splits one logical line into screen rows.
use crate::display::TokenTag;

/// Look-back window when wrapping as code.
const CODE_LOOKBACK: isize = 10;

/// Computes where a line breaks when wrapped at `wrap_limit` columns.
///
/// `tags` is the display-tag sequence of the line (one tag per display
/// column). The returned offsets are cumulative document columns: tab
/// continuations and double-width extensions do not count. For folded rows
/// the offsets index into the placeholder-substituted display line.
///
/// Splits prefer whitespace. In code mode the look-back window is short and
/// a break may also land before a run of punctuation. Placeholders never split.
pub fn compute_splits(tags: &[TokenTag], wrap_limit: usize, is_code: bool) -> Vec<usize> {
    let mut splits = Vec::new();
    if tags.is_empty() || wrap_limit == 0 {
        return splits;
    }

    let display_length = tags.len();
    let limit = wrap_limit as isize;
    let tag_at = |idx: isize| -> Option<TokenTag> {
        usize::try_from(idx).ok().and_then(|i| tags.get(i).copied())
    };
    let mut last_split = 0usize;
    let mut last_doc_split = 0usize;

    let mut add_split = |screen_pos: usize, last_split: &mut usize| {
        let doc_len = tags[*last_split..screen_pos]
            .iter()
            .filter(|t| !t.is_expansion())
            .count();
        last_doc_split += doc_len;
        splits.push(last_doc_split);
        *last_split = screen_pos;
    };

    while display_length - last_split > wrap_limit {
        let mut split = (last_split + wrap_limit) as isize;

        // Whitespace on both sides: break right here.
        if tag_at(split - 1).is_some_and(TokenTag::is_whitespace)
            && tag_at(split).is_some_and(TokenTag::is_whitespace)
        {
            add_split(split as usize, &mut last_split);
            continue;
        }

        // Inside a placeholder: break before it, or after it if it starts the row.
        if tag_at(split).is_some_and(TokenTag::is_placeholder) {
            while split != last_split as isize - 1 {
                if tag_at(split) == Some(TokenTag::PlaceholderStart) {
                    break;
                }
                split -= 1;
            }
            if split > last_split as isize {
                add_split(split as usize, &mut last_split);
                continue;
            }

            let mut end = last_split + wrap_limit;
            while end < display_length && tags[end] == TokenTag::PlaceholderBody {
                end += 1;
            }
            if end == display_length {
                // placeholder runs to the end of the line
                break;
            }
            add_split(end, &mut last_split);
            continue;
        }

        let lookback = if is_code { CODE_LOOKBACK } else { limit - (limit >> 2) };
        let min_split = (split - lookback).max(last_split as isize - 1);
        while split > min_split && tag_at(split).is_some_and(|t| t < TokenTag::PlaceholderStart) {
            split -= 1;
        }
        if is_code {
            while split > min_split && tag_at(split) == Some(TokenTag::Punctuation) {
                split -= 1;
            }
        } else {
            while split > min_split && tag_at(split).is_some_and(|t| t < TokenTag::Space) {
                split -= 1;
            }
        }
        if split > min_split {
            add_split((split + 1) as usize, &mut last_split);
            continue;
        }

        // No break opportunity in the window: cut mid-word, but never
        // between a wide glyph and its second column.
        let mut forced = last_split + wrap_limit;
        if tags[forced] == TokenTag::CharExtension && forced - 1 > last_split {
            forced -= 1;
        }
        add_split(forced, &mut last_split);
    }
    splits
}
