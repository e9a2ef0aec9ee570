use std::path::PathBuf;

use clap::Parser;
use pdfrag_core::Config;

/// Upload every PDF in a folder to an embedding/indexing endpoint.
///
/// PDFs are partitioned into titled sections, chunked to a character budget,
/// token-counted, and posted one document at a time after confirmation.
#[derive(Parser, Debug)]
#[command(name = "pdfrag", version, about = "Chunk PDFs and upload them to an embedding endpoint")]
pub struct CliArgs {
    /// Folder containing the PDFs (default: ../data)
    #[arg(long, short = 'd')]
    pub data_dir: Option<PathBuf>,

    /// Upload endpoint (overrides UPLOAD_API_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Config profile; keys are read as {PROFILE}_{KEY} first
    #[arg(long, env = "PDFRAG_PROFILE")]
    pub profile: Option<String>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Stop after the token estimate, upload nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Hard maximum characters per chunk
    #[arg(long)]
    pub max_characters: Option<usize>,

    /// Soft maximum: start a new chunk once this length is reached
    #[arg(long)]
    pub new_after_n_chars: Option<usize>,

    /// Combine chunks shorter than this with the next one
    #[arg(long)]
    pub combine_text_under_n_chars: Option<usize>,

    /// Characters of overlap between split chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Overlap every chunk boundary, not only split ones
    #[arg(long)]
    pub overlap_all: bool,

    /// Start a new section on every page break
    #[arg(long)]
    pub no_multipage_sections: bool,

    /// tiktoken encoding used for the token estimate
    #[arg(long)]
    pub encoding: Option<String>,

    /// Per-request upload timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl CliArgs {
    /// Layer command-line values over the environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.source.data_dir = dir.clone();
        }
        if let Some(endpoint) = self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            config.upload.endpoint = Some(endpoint.to_string());
        }
        if let Some(timeout) = self.timeout_secs {
            config.upload.timeout_secs = timeout;
        }
        if let Some(encoding) = &self.encoding {
            config.tokenizer.encoding = encoding.clone();
        }

        let chunking = &mut config.chunking;
        if let Some(v) = self.max_characters {
            chunking.max_characters = v;
        }
        if let Some(v) = self.new_after_n_chars {
            chunking.new_after_n_chars = v;
        }
        if let Some(v) = self.combine_text_under_n_chars {
            chunking.combine_text_under_n_chars = v;
        }
        if let Some(v) = self.overlap {
            chunking.overlap = v;
        }
        if self.overlap_all {
            chunking.overlap_all = true;
        }
        if self.no_multipage_sections {
            chunking.multipage_sections = false;
        }
    }
}
