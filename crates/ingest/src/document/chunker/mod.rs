//! Title-based chunking engine.
//!
//! Packs classified elements into chunks bounded by a character budget.
//! Titles open new sections, small neighbouring chunks are combined, and
//! text longer than the hard limit is split with overlap.

mod helpers;
mod strategies;
mod types;

pub use strategies::chunk_by_title;
pub use types::{Chunk, ChunkMetadata, ChunkingOptions};
