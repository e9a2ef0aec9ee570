use indicatif::ProgressBar;
use pdfrag_core::UploadDocument;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Unknown token encoding: {0}")]
    UnknownEncoding(String),
    #[error("Failed to load encoding {name}: {reason}")]
    Load { name: String, reason: String },
}

/// BPE token counter for one tiktoken encoding. Built once, reused per text.
pub struct TokenCounter {
    name: String,
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Load an encoding by name: `cl100k_base`, `o200k_base`, `p50k_base`,
    /// `p50k_edit` or `r50k_base`.
    pub fn new(encoding: &str) -> Result<Self, TokenizerError> {
        let loaded = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => return Err(TokenizerError::UnknownEncoding(other.to_string())),
        };
        let bpe = loaded.map_err(|e| TokenizerError::Load {
            name: encoding.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { name: encoding.to_string(), bpe })
    }

    pub fn encoding_name(&self) -> &str {
        &self.name
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Predicted total token count of all document texts.
    pub fn count_documents(&self, documents: &[UploadDocument], progress: Option<&ProgressBar>) -> usize {
        if let Some(pb) = progress {
            pb.set_length(documents.len() as u64);
        }
        let mut total = 0;
        for doc in documents {
            total += self.count(&doc.text);
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
        tracing::debug!(encoding = %self.name, documents = documents.len(), total, "counted tokens");
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> UploadDocument {
        UploadDocument { id: 1, filename: None, page: 0, text: text.to_string() }
    }

    #[test]
    fn counts_known_cl100k_text() {
        let counter = TokenCounter::new("cl100k_base").unwrap();
        assert_eq!(counter.count("hello world"), 2);
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn sums_over_documents() {
        let counter = TokenCounter::new("cl100k_base").unwrap();
        let docs = vec![doc("hello world"), doc("hello world"), doc("")];
        let pb = ProgressBar::hidden();
        assert_eq!(counter.count_documents(&docs, Some(&pb)), 4);
        assert_eq!(pb.position(), 3);
    }

    #[test]
    fn special_tokens_are_counted_as_single_tokens() {
        let counter = TokenCounter::new("cl100k_base").unwrap();
        assert_eq!(counter.count("<|endoftext|>"), 1);
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = TokenCounter::new("gpt2_fancy").err().unwrap();
        assert!(matches!(err, TokenizerError::UnknownEncoding(ref n) if n == "gpt2_fancy"));
    }

    #[test]
    fn other_encodings_load() {
        let counter = TokenCounter::new("o200k_base").unwrap();
        assert_eq!(counter.encoding_name(), "o200k_base");
        assert!(counter.count("tokenization works") > 0);
    }
}
