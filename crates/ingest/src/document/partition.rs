//! Heuristic layout classification of extracted page text.
//!
//! Each page is cut into blocks at blank lines. A block is classified as a
//! title, list item, narrative paragraph or uncategorized text from its shape
//! alone (length, punctuation, capitalization, leading markers).

use super::{Element, ElementKind, ElementMetadata, PageContent};

const TITLE_MAX_WORDS: usize = 12;
const TITLE_MAX_CHARS: usize = 120;
const NARRATIVE_MIN_WORDS: usize = 8;

const BULLETS: &[char] = &['•', '●', '○', '▪', '■', '◦', '·', '–', '-', '*'];

#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// Language codes recorded on every element.
    pub languages: Vec<String>,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
        }
    }
}

/// Classify the text of `pages` into elements, in reading order.
pub fn partition_text(
    pages: &[PageContent],
    filename: Option<&str>,
    opts: &PartitionOptions,
) -> Vec<Element> {
    let mut elements = Vec::new();
    for page in pages {
        let metadata = ElementMetadata {
            filename: filename.map(str::to_string),
            page_number: Some(page.page_number),
            languages: opts.languages.clone(),
        };
        for (kind, text) in partition_page(&page.text) {
            elements.push(Element {
                kind,
                text,
                metadata: metadata.clone(),
            });
        }
    }
    elements
}

fn partition_page(text: &str) -> Vec<(ElementKind, String)> {
    let mut out = Vec::new();
    for block in split_blocks(text) {
        let mut pending: Vec<&str> = Vec::new();
        let mut pending_is_list = false;

        for (i, &line) in block.iter().enumerate() {
            if let Some(item) = strip_list_marker(line) {
                flush(&mut out, &mut pending, pending_is_list);
                pending.push(item);
                pending_is_list = true;
            } else if pending_is_list {
                pending.push(line);
            } else if i == 0 && block.len() > 1 && is_heading_line(line) {
                out.push((ElementKind::Title, normalize(&[line])));
            } else {
                pending.push(line);
            }
        }
        flush(&mut out, &mut pending, pending_is_list);
    }
    out
}

fn flush(out: &mut Vec<(ElementKind, String)>, pending: &mut Vec<&str>, is_list: bool) {
    if pending.is_empty() {
        return;
    }
    let text = normalize(pending);
    pending.clear();
    if text.is_empty() {
        return;
    }
    let kind = if is_list { ElementKind::ListItem } else { classify(&text) };
    out.push((kind, text));
}

/// Group trimmed, non-empty lines into blocks separated by blank lines.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Join wrapped lines into one string, undoing end-of-line hyphenation and
/// collapsing whitespace runs.
fn normalize(lines: &[&str]) -> String {
    let mut joined = String::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let starts_lower = line.chars().next().is_some_and(char::is_lowercase);
        let hyphen_wrapped = joined.ends_with('-')
            && joined.chars().rev().nth(1).is_some_and(char::is_alphabetic);
        if hyphen_wrapped && starts_lower {
            joined.pop();
        } else if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(line);
    }
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn classify(text: &str) -> ElementKind {
    if looks_like_title(text) {
        ElementKind::Title
    } else if is_narrative(text) {
        ElementKind::NarrativeText
    } else {
        ElementKind::UncategorizedText
    }
}

/// Returns the item text when `line` starts with a bullet or an enumerator
/// such as `1.`, `2)`, `a.` or `(iv)`.
fn strip_list_marker(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;

    if BULLETS.contains(&first) {
        let rest = chars.as_str();
        if rest.starts_with(char::is_whitespace) {
            let item = rest.trim_start();
            return (!item.is_empty()).then_some(item);
        }
        return None;
    }

    let (body, rest) = if let Some(inner) = line.strip_prefix('(') {
        let close = inner.find(')')?;
        (&inner[..close], &inner[close + 1..])
    } else {
        let end = line.find(['.', ')'])?;
        (&line[..end], &line[end + 1..])
    };

    let is_enumerator = match body.len() {
        0 => false,
        1..=3 if body.chars().all(|c| c.is_ascii_digit()) => true,
        1 => body.chars().all(|c| c.is_ascii_lowercase()),
        2..=5 => body.chars().all(|c| matches!(c, 'i' | 'v' | 'x')),
        _ => false,
    };
    if !is_enumerator || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim_start();
    (!item.is_empty()).then_some(item)
}

fn looks_like_title(text: &str) -> bool {
    let words = text.split_whitespace().count();
    if words == 0 || words > TITLE_MAX_WORDS || text.chars().count() > TITLE_MAX_CHARS {
        return false;
    }
    if text.ends_with(['.', ',', ';', '!', '?']) {
        return false;
    }
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let alphabetic = visible.iter().filter(|c| c.is_alphabetic()).count();
    alphabetic > 0 && alphabetic * 2 >= visible.len()
}

/// Stricter title test for the first line of a multi-line block: it must
/// also be capitalized like a heading, or be a numbered heading ("2.1 Scope").
fn is_heading_line(line: &str) -> bool {
    if !looks_like_title(line) {
        return false;
    }
    let mut words = line.split_whitespace().peekable();
    if words
        .peek()
        .is_some_and(|w| w.chars().all(|c| c.is_ascii_digit() || c == '.'))
    {
        words.next();
    }
    let significant: Vec<&str> = words.filter(|w| w.chars().count() > 3).collect();
    if significant.is_empty() {
        return line.chars().next().is_some_and(char::is_uppercase);
    }
    let capitalized = significant
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    capitalized * 2 > significant.len()
}

fn is_narrative(text: &str) -> bool {
    let words = text.split_whitespace().count();
    if words < 2 {
        return false;
    }
    let trimmed = text.trim_end_matches(['"', '\'', ')', '”', '’']);
    trimmed.ends_with(['.', '!', '?']) || words >= NARRATIVE_MIN_WORDS
}
