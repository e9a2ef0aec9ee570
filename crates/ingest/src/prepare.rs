use pdfrag_core::UploadDocument;

use crate::document::chunker::Chunk;

/// Turn chunks into upload payloads. Chunks with empty text are dropped; ids
/// are the chunk position plus one, so dropped chunks leave gaps.
pub fn prepare_documents(chunks: &[Chunk]) -> Vec<UploadDocument> {
    let documents: Vec<UploadDocument> = chunks
        .iter()
        .enumerate()
        .filter(|(_, chunk)| !chunk.text.is_empty())
        .map(|(i, chunk)| UploadDocument {
            id: i as u64 + 1,
            filename: chunk.metadata.filename.clone(),
            page: chunk
                .metadata
                .page_number
                .and_then(|p| u32::try_from(p).ok())
                .unwrap_or(0),
            text: chunk.text.clone(),
        })
        .collect();
    tracing::debug!(chunks = chunks.len(), documents = documents.len(), "prepared documents");
    documents
}
