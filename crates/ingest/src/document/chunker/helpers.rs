//! Character-level splitting and overlap utilities used by the chunker.

/// Separator placed between element texts inside a chunk.
pub(crate) const ELEMENT_SEPARATOR: &str = "\n\n";

/// Length in characters (Unicode scalar values), the unit of every limit.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `overlap` characters of `text`, moved forward to a word start
/// when the cut lands inside a word and a later word boundary exists.
pub(crate) fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.trim_end().chars().collect();
    if chars.len() <= overlap {
        return chars.iter().collect::<String>().trim_start().to_string();
    }
    let start = word_aligned_start(&chars, chars.len() - overlap, chars.len());
    chars[start..].iter().collect::<String>().trim_start().to_string()
}

/// Advance `pos` past the rest of a word it falls inside, unless no
/// whitespace follows before `limit`.
fn word_aligned_start(chars: &[char], pos: usize, limit: usize) -> usize {
    if pos == 0 || chars[pos - 1].is_whitespace() {
        return pos;
    }
    match (pos..limit).find(|&j| chars[j].is_whitespace()) {
        Some(ws) => ws + 1,
        None => pos,
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Cuts prefer the last newline, then the last space, in the back half of
/// the window; a piece with no whitespace there is cut hard. Every piece
/// after the first restarts `overlap` characters before the previous cut.
pub(crate) fn split_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut pieces = Vec::new();
    let mut start = 0;

    if max_chars == 0 {
        return pieces;
    }

    loop {
        while start < len && chars[start].is_whitespace() {
            start += 1;
        }
        if start >= len {
            break;
        }
        if len - start <= max_chars {
            push_piece(&mut pieces, &chars[start..len]);
            break;
        }

        let window_end = start + max_chars;
        let cut = find_cut(&chars, start, window_end);
        push_piece(&mut pieces, &chars[start..cut]);

        let next = if overlap == 0 {
            cut
        } else {
            let back = cut.saturating_sub(overlap).max(start + 1);
            word_aligned_start(&chars, back, cut)
        };
        start = next.max(start + 1);
    }
    pieces
}

/// Cut position in `(start, window_end]`: the piece is `start..cut`.
fn find_cut(chars: &[char], start: usize, window_end: usize) -> usize {
    let floor = start + (window_end - start) / 2;
    let search = |pred: &dyn Fn(char) -> bool, lo: usize| {
        (lo.max(start + 1)..=window_end).rev().find(|&j| pred(chars[j]))
    };
    search(&|c: char| c == '\n', floor)
        .or_else(|| search(&|c: char| c.is_whitespace(), floor))
        .or_else(|| search(&|c: char| c.is_whitespace(), start + 1))
        .unwrap_or(window_end)
}

fn push_piece(pieces: &mut Vec<String>, chars: &[char]) {
    let piece: String = chars.iter().collect();
    let piece = piece.trim();
    if !piece.is_empty() {
        pieces.push(piece.to_string());
    }
}
