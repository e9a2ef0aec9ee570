//! Title-based chunking: sectioning, pre-chunk combining, and text splitting.

use super::helpers::{char_len, overlap_tail, split_text, ELEMENT_SEPARATOR};
use super::types::{Chunk, ChunkMetadata, ChunkingOptions};
use crate::document::{Element, ElementKind};

/// Elements destined for the same chunk (or the same run of split pieces).
#[derive(Debug, Default)]
struct PreChunk {
    elements: Vec<Element>,
    text_len: usize,
}

impl PreChunk {
    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn last_page(&self) -> Option<usize> {
        self.elements.last().and_then(|e| e.metadata.page_number)
    }

    fn joined_len(&self, extra: usize) -> usize {
        if self.is_empty() {
            extra
        } else {
            self.text_len + ELEMENT_SEPARATOR.len() + extra
        }
    }

    /// Whether `element` may join without crossing the soft or hard maximum.
    fn will_fit(&self, element_len: usize, opts: &ChunkingOptions) -> bool {
        if self.is_empty() {
            return true;
        }
        self.text_len < opts.new_after_n_chars
            && self.joined_len(element_len) <= opts.max_characters
    }

    fn add(&mut self, element: Element, element_len: usize) {
        self.text_len = self.joined_len(element_len);
        self.elements.push(element);
    }

    /// Small pre-chunks absorb their successor while the result still fits.
    fn can_combine(&self, next: &PreChunk, opts: &ChunkingOptions) -> bool {
        self.text_len < opts.combine_text_under_n_chars
            && self.joined_len(next.text_len) <= opts.max_characters
    }

    fn combine(&mut self, next: PreChunk) {
        self.text_len = self.joined_len(next.text_len);
        self.elements.extend(next.elements);
    }

    fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(ELEMENT_SEPARATOR)
    }

    fn metadata(&self) -> ChunkMetadata {
        self.elements
            .first()
            .map(|e| ChunkMetadata {
                filename: e.metadata.filename.clone(),
                page_number: e.metadata.page_number,
            })
            .unwrap_or_default()
    }
}

/// Chunk `elements` by section. Every returned chunk is at most
/// `opts.max_characters` characters long.
pub fn chunk_by_title(elements: &[Element], opts: &ChunkingOptions) -> Vec<Chunk> {
    let pre_chunks = combine_pre_chunks(build_pre_chunks(elements, opts), opts);

    let mut chunks = Vec::new();
    let mut prev_text: Option<String> = None;

    for pre_chunk in &pre_chunks {
        let body = pre_chunk.text();
        let mut pieces = split_text(&body, opts.max_characters, opts.overlap);

        if let (Some(prev), Some(first)) = (prev_text.as_deref(), pieces.first_mut()) {
            if opts.overlap_all && opts.overlap > 0 {
                // The prefix only takes the room left under the hard max.
                let room = opts.max_characters.saturating_sub(char_len(first) + 1);
                let tail = overlap_tail(prev, opts.overlap.min(room));
                if !tail.is_empty() {
                    *first = format!("{tail} {first}");
                }
            }
        }

        let metadata = pre_chunk.metadata();
        let orig = opts.include_orig_elements.then(|| pre_chunk.elements.clone());

        for piece in pieces {
            chunks.push(Chunk {
                index: chunks.len(),
                text: piece,
                metadata: metadata.clone(),
                orig_elements: orig.clone(),
            });
        }
        prev_text = Some(body);
    }

    tracing::debug!(
        elements = elements.len(),
        pre_chunks = pre_chunks.len(),
        chunks = chunks.len(),
        "chunked by title"
    );
    chunks
}

// ── Sectioning ──────────────────────────────────────────────────────────────

fn build_pre_chunks(elements: &[Element], opts: &ChunkingOptions) -> Vec<PreChunk> {
    let mut pre_chunks = Vec::new();
    let mut current = PreChunk::default();

    for element in elements {
        let text = element.text.trim();
        if text.is_empty() {
            continue;
        }
        let element_len = char_len(text);

        let new_section = element.kind == ElementKind::Title
            || (!opts.multipage_sections
                && current.last_page().is_some()
                && element.metadata.page_number != current.last_page());

        if !current.is_empty() && (new_section || !current.will_fit(element_len, opts)) {
            pre_chunks.push(std::mem::take(&mut current));
        }

        let mut element = element.clone();
        element.text = text.to_string();
        current.add(element, element_len);
    }
    if !current.is_empty() {
        pre_chunks.push(current);
    }
    pre_chunks
}

// ── Combining ───────────────────────────────────────────────────────────────

fn combine_pre_chunks(pre_chunks: Vec<PreChunk>, opts: &ChunkingOptions) -> Vec<PreChunk> {
    let mut combined: Vec<PreChunk> = Vec::with_capacity(pre_chunks.len());
    for pre_chunk in pre_chunks {
        if let Some(last) = combined.last_mut() {
            if last.can_combine(&pre_chunk, opts) {
                last.combine(pre_chunk);
                continue;
            }
        }
        combined.push(pre_chunk);
    }
    combined
}
