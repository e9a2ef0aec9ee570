use std::time::Duration;

use indicatif::ProgressBar;
use pdfrag_core::UploadDocument;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// A document the endpoint answered with something other than 201.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub id: u64,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Every document was created.
    All,
    /// Some, but not all, documents were created.
    Partial,
    /// Nothing was created.
    None,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: usize,
    pub total: usize,
    pub rejected: Vec<Rejection>,
    /// Transport error that stopped the loop early.
    pub aborted: Option<String>,
}

impl UploadReport {
    pub fn outcome(&self) -> UploadOutcome {
        if self.uploaded == self.total {
            UploadOutcome::All
        } else if self.uploaded > 0 {
            UploadOutcome::Partial
        } else {
            UploadOutcome::None
        }
    }
}

/// Posts documents one at a time to the indexing endpoint.
pub struct Uploader {
    client: Client,
    endpoint: String,
}

impl Uploader {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Upload every document in order. `201 Created` counts as uploaded; any
    /// other status is recorded and the loop continues. A transport failure
    /// stops the loop and is recorded in `aborted`.
    pub async fn upload_all(
        &self,
        documents: &[UploadDocument],
        progress: Option<&ProgressBar>,
    ) -> UploadReport {
        let mut report = UploadReport {
            total: documents.len(),
            ..UploadReport::default()
        };
        if let Some(pb) = progress {
            pb.set_length(documents.len() as u64);
        }

        for doc in documents {
            let response = match self.client.post(&self.endpoint).json(doc).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(id = doc.id, error = %e, "upload failed");
                    report.aborted = Some(e.to_string());
                    break;
                }
            };

            let status = response.status();
            if status == StatusCode::CREATED {
                report.uploaded += 1;
            } else {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::debug!(id = doc.id, error = %e, "failed to read response body");
                        format!("<unreadable body: {e}>")
                    }
                };
                tracing::warn!(id = doc.id, status = status.as_u16(), body = %body, "resource not created");
                report.rejected.push(Rejection {
                    id: doc.id,
                    status: status.as_u16(),
                    body,
                });
            }
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        tracing::info!(
            uploaded = report.uploaded,
            total = report.total,
            rejected = report.rejected.len(),
            aborted = report.aborted.is_some(),
            "upload finished"
        );
        report
    }
}
