pub mod chunker;
mod partition;
mod pdf;

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use partition::{partition_text, PartitionOptions};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Folder {} not found!", .0.display())]
    FolderNotFound(PathBuf),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number.
    pub page_number: usize,
    pub text: String,
}

/// Layout category assigned to a block of page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Title,
    NarrativeText,
    ListItem,
    UncategorizedText,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    pub filename: Option<String>,
    pub page_number: Option<usize>,
    pub languages: Vec<String>,
}

/// A classified block of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub text: String,
    pub metadata: ElementMetadata,
}

/// Outcome of partitioning a whole folder.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub elements: Vec<Element>,
    pub files_processed: usize,
    /// Files that failed extraction, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// List the `*.pdf` files directly inside `dir`, sorted by path.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    if !dir.is_dir() {
        return Err(ExtractionError::FolderNotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extract and classify the elements of a single PDF.
pub fn partition_pdf(path: &Path, opts: &PartitionOptions) -> Result<Vec<Element>, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let pages = pdf::extract_pdf(&bytes)?;
    let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
    Ok(partition_text(&pages, filename.as_deref(), opts))
}

/// Partition every PDF in `dir`. Files that fail to extract are logged and
/// skipped; a missing folder is an error.
pub fn load_documents(
    dir: &Path,
    opts: &PartitionOptions,
    progress: Option<&ProgressBar>,
) -> Result<LoadReport, ExtractionError> {
    let files = discover_pdfs(dir)?;
    tracing::info!(dir = %dir.display(), files = files.len(), "loading documents");
    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
    }

    let mut report = LoadReport::default();
    for file in files {
        if let Some(pb) = progress {
            pb.set_message(
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }
        match partition_pdf(&file, opts) {
            Ok(elements) => {
                tracing::debug!(file = %file.display(), elements = elements.len(), "partitioned");
                report.elements.extend(elements);
                report.files_processed += 1;
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping file");
                report.skipped.push((file, e.to_string()));
            }
        }
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use crate::testing::pdf_with_pages;
    use super::*;

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_pdfs(&missing).unwrap_err();
        assert!(matches!(err, ExtractionError::FolderNotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn discovers_only_top_level_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.pdf"), b"x").unwrap();

        let files = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn partition_pdf_attributes_elements_to_their_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        std::fs::write(
            &path,
            pdf_with_pages(&["Alpha page text here.", "Beta page text here."]),
        )
        .unwrap();

        let elements = partition_pdf(&path, &PartitionOptions::default()).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].kind, ElementKind::NarrativeText);
        assert_eq!(elements[0].text, "Alpha page text here.");
        assert_eq!(elements[0].metadata.page_number, Some(1));
        assert_eq!(elements[1].text, "Beta page text here.");
        assert_eq!(elements[1].metadata.page_number, Some(2));
        assert!(elements
            .iter()
            .all(|e| e.metadata.filename.as_deref() == Some("manual.pdf")));
    }

    #[test]
    fn load_documents_reads_valid_pdfs_and_skips_broken_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), pdf_with_pages(&["Alpha page text here."])).unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"definitely not a pdf").unwrap();
        std::fs::write(
            dir.path().join("c.pdf"),
            pdf_with_pages(&["Gamma page text here.", "Delta page text here."]),
        )
        .unwrap();

        let pb = ProgressBar::hidden();
        let report = load_documents(dir.path(), &PartitionOptions::default(), Some(&pb)).unwrap();
        assert_eq!(report.files_processed, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("b.pdf"));
        assert_eq!(pb.position(), 3);

        let located: Vec<(Option<&str>, Option<usize>)> = report
            .elements
            .iter()
            .map(|e| (e.metadata.filename.as_deref(), e.metadata.page_number))
            .collect();
        assert_eq!(
            located,
            vec![(Some("a.pdf"), Some(1)), (Some("c.pdf"), Some(1)), (Some("c.pdf"), Some(2))]
        );
    }

    #[test]
    fn unreadable_pdfs_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"definitely not a pdf").unwrap();

        let report = load_documents(dir.path(), &PartitionOptions::default(), None).unwrap();
        assert!(report.elements.is_empty());
        assert_eq!(report.files_processed, 0);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn empty_folder_yields_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = load_documents(dir.path(), &PartitionOptions::default(), None).unwrap();
        assert!(report.elements.is_empty());
        assert!(report.skipped.is_empty());
    }
}
