//! PDF ingestion pipeline: partition, chunk, prepare, count tokens, upload.

pub mod document;
pub mod prepare;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tokens;
pub mod upload;

pub use document::chunker::{chunk_by_title, Chunk, ChunkingOptions};
pub use document::{load_documents, Element, ElementKind, ExtractionError, LoadReport, PartitionOptions};
pub use prepare::prepare_documents;
pub use tokens::{TokenCounter, TokenizerError};
pub use upload::{UploadError, UploadOutcome, UploadReport, Uploader};
