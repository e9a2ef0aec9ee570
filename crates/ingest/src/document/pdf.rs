use super::{ExtractionError, PageContent};

/// Extract the text layer of a PDF, one entry per non-empty page.
pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    // pdf-extract can panic on malformed PDFs.
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));
    let pages = match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => return Err(ExtractionError::PdfError(e.to_string())),
        Err(_) => {
            return Err(ExtractionError::PdfError(
                "extraction panicked (malformed PDF)".to_string(),
            ))
        }
    };
    Ok(number_pages(pages))
}

/// Number pages from 1 in document order, dropping pages without text.
pub(crate) fn number_pages(pages: Vec<String>) -> Vec<PageContent> {
    let numbered: Vec<PageContent> = pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| PageContent {
            page_number: i + 1,
            text: text.trim().to_string(),
        })
        .collect();

    if numbered.is_empty() {
        // Scanned/image-only PDF: nothing in the text layer.
        tracing::warn!("PDF has no extractable text layer");
    }
    numbered
}
