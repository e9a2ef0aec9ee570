//! The ingestion steps in the order the operator runs them.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use pdfrag_core::config::ChunkingConfig;
use pdfrag_core::{Config, UploadDocument};
use pdfrag_ingest::{
    chunk_by_title, load_documents, prepare_documents, Chunk, ChunkingOptions, Element,
    PartitionOptions, TokenCounter, UploadReport, Uploader,
};

use crate::terminal::Terminal;

pub struct Pipeline<'a> {
    config: &'a Config,
    chunking: ChunkingConfig,
    tokens: TokenCounter,
    terminal: &'a Terminal,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, terminal: &'a Terminal) -> Result<Self> {
        let chunking = config
            .chunking
            .clone()
            .validate()
            .context("invalid chunking configuration")?;
        let tokens = TokenCounter::new(&config.tokenizer.encoding)
            .context("invalid token encoding")?;
        tracing::debug!(encoding = tokens.encoding_name(), "tokenizer ready");
        Ok(Self { config, chunking, tokens, terminal })
    }

    pub fn load(&self, dir: &Path) -> Result<Vec<Element>> {
        self.terminal
            .print_step(&format!("Loading documents from: {}", dir.display()))?;
        let opts = PartitionOptions {
            languages: self.config.source.languages.clone(),
        };

        let pb = self.terminal.progress_bar("Loading files");
        let report = load_documents(dir, &opts, Some(&pb))?;
        pb.finish_and_clear();

        for (file, reason) in &report.skipped {
            self.terminal
                .print_warning(&format!("Skipped {}: {}", file.display(), reason))?;
        }
        self.terminal.print_success(&format!(
            "{} elements extracted from {} files",
            report.elements.len(),
            report.files_processed
        ))?;
        Ok(report.elements)
    }

    pub fn chunk(&self, elements: &[Element]) -> Result<Vec<Chunk>> {
        self.terminal.print_step("Chunking elements")?;
        let chunks = chunk_by_title(elements, &ChunkingOptions::from(&self.chunking));
        self.terminal
            .print_success(&format!("{} elements after chunk", chunks.len()))?;
        Ok(chunks)
    }

    pub fn prepare(&self, chunks: &[Chunk]) -> Result<Vec<UploadDocument>> {
        self.terminal.print_step("Preparing documents")?;
        let documents = prepare_documents(chunks);
        self.terminal
            .print_success(&format!("{} documents ready", documents.len()))?;
        Ok(documents)
    }

    pub fn estimate_tokens(&self, documents: &[UploadDocument]) -> Result<usize> {
        let pb = self.terminal.progress_bar("Calculating token count");
        let total = self.tokens.count_documents(documents, Some(&pb));
        pb.finish_and_clear();
        Ok(total)
    }

    pub async fn upload(&self, endpoint: &str, documents: &[UploadDocument]) -> Result<UploadReport> {
        let uploader = Uploader::new(endpoint, Duration::from_secs(self.config.upload.timeout_secs))?;
        let pb = self.terminal.progress_bar("Uploading documents");
        let report = uploader.upload_all(documents, Some(&pb)).await;
        pb.finish_and_clear();

        for rejection in &report.rejected {
            self.terminal.print_warning(&format!(
                "Resource not created: {}, {}",
                rejection.status, rejection.body
            ))?;
        }
        if let Some(reason) = &report.aborted {
            self.terminal.print_error(&format!("Upload failed: '{reason}'"))?;
        }
        Ok(report)
    }
}
