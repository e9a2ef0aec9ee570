//! Chunk options and output types.

use pdfrag_core::config::ChunkingConfig;

use crate::document::Element;

// ── Options ─────────────────────────────────────────────────────────────────

/// Options for [`chunk_by_title`](super::chunk_by_title). All lengths are in characters.
#[derive(Debug, Clone)]
pub struct ChunkingOptions {
    /// Hard maximum chunk length (default: 500).
    pub max_characters: usize,
    /// Soft maximum: stop adding elements once reached (default: 400).
    pub new_after_n_chars: usize,
    /// Combine chunks shorter than this with the next one (default: 100).
    pub combine_text_under_n_chars: usize,
    /// Overlap carried between split pieces (default: 100).
    pub overlap: usize,
    /// Also overlap ordinary chunk boundaries (default: false).
    pub overlap_all: bool,
    /// Let sections span page breaks (default: true).
    pub multipage_sections: bool,
    /// Keep the source elements on each chunk (default: false).
    pub include_orig_elements: bool,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self::from(&ChunkingConfig::default())
    }
}

impl From<&ChunkingConfig> for ChunkingOptions {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            max_characters: c.max_characters,
            new_after_n_chars: c.new_after_n_chars.min(c.max_characters),
            combine_text_under_n_chars: c.combine_text_under_n_chars.min(c.max_characters),
            overlap: c.overlap,
            overlap_all: c.overlap_all,
            multipage_sections: c.multipage_sections,
            include_orig_elements: false,
        }
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Filename of the first element in the chunk.
    pub filename: Option<String>,
    /// Page of the first element in the chunk.
    pub page_number: Option<usize>,
}

/// A chunk of text ready for upload.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 0-based position in the chunk sequence.
    pub index: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Source elements, only when `include_orig_elements` is set.
    pub orig_elements: Option<Vec<Element>>,
}
