use serde::{Deserialize, Serialize};

/// One upload payload, posted as JSON to the indexing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDocument {
    /// 1-based position of the source chunk. Empty chunks are skipped
    /// without renumbering, so ids may have gaps.
    pub id: u64,
    pub filename: Option<String>,
    /// 1-based page number, 0 when unknown.
    pub page: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_upload_shape() {
        let doc = UploadDocument {
            id: 3,
            filename: Some("report.pdf".into()),
            page: 2,
            text: "Quarterly numbers".into(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "filename": "report.pdf",
                "page": 2,
                "text": "Quarterly numbers"
            })
        );
    }

    #[test]
    fn missing_filename_serializes_as_null() {
        let doc = UploadDocument { id: 1, filename: None, page: 0, text: "x".into() };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["filename"].is_null());
        assert_eq!(value["page"], 0);
    }
}
