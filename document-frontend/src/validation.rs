//! Pre-flight checks run before anything is sent to the backend.

use std::path::Path;
use thiserror::Error;

/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File name is empty")]
    EmptyFileName,

    #[error("Unsupported file type for '{filename}': only PDF, TXT and MD files are allowed")]
    UnsupportedType { filename: String },

    #[error("'{filename}' is too large ({size} bytes); the maximum is {limit} bytes")]
    TooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Question is empty")]
    EmptyQuestion,
}

/// File types the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Text,
    Markdown,
}

impl DocumentType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "txt" => Some(DocumentType::Text),
            "md" | "markdown" => Some(DocumentType::Markdown),
            _ => None,
        }
    }

    /// Canonical content type sent with the upload.
    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "application/pdf",
            DocumentType::Text => "text/plain",
            DocumentType::Markdown => "text/markdown",
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match essence(content_type).as_str() {
            "application/pdf" => Some(DocumentType::Pdf),
            "text/plain" => Some(DocumentType::Text),
            "text/markdown" => Some(DocumentType::Markdown),
            _ => None,
        }
    }
}

/// Checks name, declared content type and size of a file about to be uploaded.
#[derive(Debug, Clone, Copy)]
pub struct FileValidator {
    max_bytes: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl FileValidator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// A file is allowed when either its extension or its declared content
    /// type is one of PDF, TXT or MD; the extension wins when both are known.
    /// The type check runs first, so a disallowed file is reported as such
    /// regardless of its size.
    pub fn validate(
        &self,
        filename: &str,
        content_type: Option<&str>,
        size: u64,
    ) -> Result<DocumentType, ValidationError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ValidationError::EmptyFileName);
        }

        let doc_type = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentType::from_extension)
            .or_else(|| content_type.and_then(DocumentType::from_content_type))
            .ok_or_else(|| ValidationError::UnsupportedType {
                filename: filename.to_string(),
            })?;

        if size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                filename: filename.to_string(),
                size,
                limit: self.max_bytes,
            });
        }

        Ok(doc_type)
    }
}

/// Lower-cased media type without parameters (`text/plain; charset=utf-8`
/// becomes `text/plain`).
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
