//! The document backend collaborator.
//!
//! Everything the front end knows about the remote service goes through the
//! [`Backend`] trait, so the live HTTP client and the fixture backend are
//! interchangeable.

pub mod http;
pub mod mock;

#[cfg(test)]
pub(crate) mod scripted;

use crate::config::{BackendMode, BackendSettings};
use crate::models::{Answer, Document, SearchHit, Summary, SummaryType, UploadReceipt};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Which backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    Upload,
    Fetch,
    Delete,
    Search,
    Summarize,
    Qa,
}

impl BackendOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendOperation::Upload => "upload",
            BackendOperation::Fetch => "fetch",
            BackendOperation::Delete => "delete",
            BackendOperation::Search => "search",
            BackendOperation::Summarize => "summarize",
            BackendOperation::Qa => "qa",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            BackendOperation::Upload => "upload document",
            BackendOperation::Fetch => "fetch documents",
            BackendOperation::Delete => "delete document",
            BackendOperation::Search => "search documents",
            BackendOperation::Summarize => "summarize document",
            BackendOperation::Qa => "answer question",
        }
    }
}

impl std::fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to {operation}: network error: {message}")]
    Network {
        operation: BackendOperation,
        message: String,
    },

    #[error("Failed to {operation}: backend returned {status}: {message}")]
    Status {
        operation: BackendOperation,
        status: u16,
        message: String,
    },

    #[error("Failed to {operation}: malformed response: {message}")]
    Malformed {
        operation: BackendOperation,
        message: String,
    },

    #[error("Failed to {operation}: invalid request: {message}")]
    InvalidRequest {
        operation: BackendOperation,
        message: String,
    },
}

impl BackendError {
    pub fn network(operation: BackendOperation, message: impl std::fmt::Display) -> Self {
        BackendError::Network {
            operation,
            message: message.to_string(),
        }
    }

    pub fn status(operation: BackendOperation, status: u16, message: impl Into<String>) -> Self {
        BackendError::Status {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn malformed(operation: BackendOperation, message: impl std::fmt::Display) -> Self {
        BackendError::Malformed {
            operation,
            message: message.to_string(),
        }
    }

    pub fn operation(&self) -> BackendOperation {
        match self {
            BackendError::Network { operation, .. }
            | BackendError::Status { operation, .. }
            | BackendError::Malformed { operation, .. }
            | BackendError::InvalidRequest { operation, .. } => *operation,
        }
    }

    /// HTTP status reported by the backend, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote document service.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadReceipt, BackendError>;

    /// Full document list in backend order.
    async fn list_documents(&self) -> Result<Vec<Document>, BackendError>;

    async fn delete_document(&self, id: &str) -> Result<(), BackendError>;

    /// Hits ordered by descending relevance, at most `top_k` of them.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, BackendError>;

    async fn summarize(
        &self,
        doc_id: &str,
        summary_type: SummaryType,
    ) -> Result<Summary, BackendError>;

    /// Answer `question`, drawing only on `doc_ids` when given.
    async fn ask_question(
        &self,
        question: &str,
        doc_ids: Option<&[String]>,
    ) -> Result<Answer, BackendError>;
}

/// Build the backend selected by configuration.
pub fn build_backend(settings: &BackendSettings) -> Result<Arc<dyn Backend>, BackendError> {
    match settings.mode {
        BackendMode::Mock => {
            tracing::info!(
                latency_ms = settings.mock_latency_ms,
                "Using fixture document backend"
            );
            Ok(Arc::new(MockBackend::seeded(Duration::from_millis(
                settings.mock_latency_ms,
            ))))
        }
        BackendMode::Live => {
            tracing::info!(url = %settings.url, "Using live document backend");
            Ok(Arc::new(HttpBackend::new(
                &settings.url,
                Duration::from_millis(settings.request_timeout_ms),
            )?))
        }
    }
}
