use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A document as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "doc_id", alias = "docId")]
    pub id: String,
    pub filename: String,
    #[serde(
        alias = "uploadedAt",
        alias = "upload_date",
        deserialize_with = "timestamp"
    )]
    pub uploaded_at: DateTime<Utc>,
    /// Zero until the backend has finished counting pages. The backend sends
    /// `null` for counts it does not know yet.
    #[serde(default, alias = "pageCount", deserialize_with = "null_as_default")]
    pub page_count: u32,
    #[serde(
        default,
        alias = "fileSizeBytes",
        alias = "file_size",
        deserialize_with = "null_as_default"
    )]
    pub file_size_bytes: u64,
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Document {
    /// Local stand-in inserted right after an upload succeeds, replaced by
    /// the backend's record on the next refresh.
    pub fn placeholder(receipt: UploadReceipt, file_size_bytes: u64) -> Self {
        Self {
            id: receipt.id,
            filename: receipt.filename,
            uploaded_at: receipt.uploaded_at,
            page_count: 0,
            file_size_bytes,
        }
    }
}

/// Backend acknowledgement of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(alias = "doc_id", alias = "docId")]
    pub id: String,
    pub filename: String,
    #[serde(
        alias = "uploadedAt",
        alias = "upload_date",
        deserialize_with = "timestamp"
    )]
    pub uploaded_at: DateTime<Utc>,
}

/// Observable state of the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    pub documents: Vec<Document>,
    pub loading: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_unknown_page_count() {
        let receipt = UploadReceipt {
            id: "doc-1".to_string(),
            filename: "report.pdf".to_string(),
            uploaded_at: Utc::now(),
        };
        let doc = Document::placeholder(receipt, 2 * 1024 * 1024);
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.page_count, 0);
        assert_eq!(doc.file_size_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn accepts_camel_case_payloads() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"a","filename":"a.md","uploadedAt":"2024-05-01T10:00:00Z","pageCount":3,"fileSizeBytes":42}"#,
        )
        .unwrap();
        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.file_size_bytes, 42);
    }

    #[test]
    fn accepts_document_service_payloads() {
        let doc: Document = serde_json::from_str(
            r#"{"doc_id":"d-7","filename":"scan.pdf","uploaded_at":"2024-05-01T10:00:00","page_count":null,"file_size":null}"#,
        )
        .unwrap();
        assert_eq!(doc.id, "d-7");
        assert_eq!(doc.page_count, 0);
        assert_eq!(doc.file_size_bytes, 0);
        assert_eq!(doc.uploaded_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");

        let counted: Document = serde_json::from_str(
            r#"{"doc_id":"d-8","filename":"a.md","uploaded_at":"2024-05-01T10:00:00Z","page_count":4,"file_size":900}"#,
        )
        .unwrap();
        assert_eq!(counted.page_count, 4);
        assert_eq!(counted.file_size_bytes, 900);

        let receipt: UploadReceipt = serde_json::from_str(
            r#"{"doc_id":"d-9","filename":"scan.pdf","status":"success","uploaded_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(receipt.id, "d-9");
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"a","filename":"a.txt","uploaded_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(doc.page_count, 0);
        assert_eq!(doc.file_size_bytes, 0);
    }
}
