//! User actions that span the document store, the notification queue and
//! the backend.
//!
//! Action-level failures (upload, delete, search, summarize, Q&A) are
//! returned to the caller *and* surfaced as an error notification. List-level
//! failures stay inside the [`DocumentStore`] snapshot.

use crate::models::{Answer, Document, DocumentSnapshot, SearchHit, Summary, SummaryType};
use crate::services::backend::{Backend, BackendError};
use crate::services::metrics;
use crate::state::{
    DocumentBusy, DocumentStore, NotificationQueue, ProcessingStatus, ProcessingTracker,
    SummaryCache, DEFAULT_NOTIFICATION_TTL,
};
use crate::validation::{FileValidator, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Upper bound for search result counts, as enforced by the document service.
pub const MAX_TOP_K: usize = 20;

/// Delay before re-syncing with the backend after an upload, giving it time
/// to finish page counting.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Busy(#[from] DocumentBusy),
}

impl From<WorkspaceError> for AppError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::Validation(e) => AppError::UnprocessableEntity(e.to_string()),
            WorkspaceError::Backend(e) if e.status_code() == Some(404) => {
                AppError::NotFound(anyhow::Error::new(e))
            }
            WorkspaceError::Backend(e) => AppError::BadGateway(e.to_string()),
            WorkspaceError::Busy(e) => AppError::Conflict(anyhow::Error::new(e)),
        }
    }
}

/// A file received from the user, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    pub notification_ttl: Duration,
    pub refresh_delay: Duration,
    pub max_upload_bytes: u64,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct Workspace {
    backend: Arc<dyn Backend>,
    documents: DocumentStore,
    notifications: NotificationQueue,
    processing: ProcessingTracker,
    summaries: SummaryCache,
    validator: FileValidator,
    refresh_delay: Duration,
}

impl Workspace {
    pub fn new(backend: Arc<dyn Backend>, options: WorkspaceOptions) -> Self {
        Self {
            documents: DocumentStore::new(Arc::clone(&backend)),
            notifications: NotificationQueue::new(options.notification_ttl),
            processing: ProcessingTracker::new(),
            summaries: SummaryCache::new(),
            validator: FileValidator::new(options.max_upload_bytes),
            refresh_delay: options.refresh_delay,
            backend,
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn processing(&self) -> &ProcessingTracker {
        &self.processing
    }

    pub fn summaries(&self) -> &SummaryCache {
        &self.summaries
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub async fn refresh(&self) -> DocumentSnapshot {
        self.documents.refresh().await
    }

    /// Refresh the store after the configured delay.
    pub fn schedule_refresh(&self) -> JoinHandle<DocumentSnapshot> {
        let store = self.documents.clone();
        let delay = self.refresh_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.refresh().await
        })
    }

    fn report_failure(&self, err: BackendError) -> BackendError {
        tracing::error!(operation = err.operation().as_str(), error = %err, "Backend call failed");
        metrics::record_backend_error(err.operation());
        self.notifications.error(err.to_string());
        err
    }

    fn reject(&self, err: ValidationError) -> WorkspaceError {
        tracing::warn!(error = %err, "Rejected invalid input");
        self.notifications.error(err.to_string());
        err.into()
    }

    /// Validate, upload, and insert a placeholder at the head of the list.
    ///
    /// The placeholder's page count is unknown; a refresh is scheduled to
    /// pick up the backend's figures.
    pub async fn upload(&self, file: UploadFile) -> Result<Document, WorkspaceError> {
        let size = file.bytes.len() as u64;
        let doc_type = self
            .validator
            .validate(&file.filename, file.content_type.as_deref(), size)
            .map_err(|e| self.reject(e))?;

        let receipt = self
            .backend
            .upload_document(file.bytes, file.filename.trim(), doc_type.content_type())
            .await
            .map_err(|e| self.report_failure(e))?;

        let document = Document::placeholder(receipt, size);
        self.documents.add(document.clone());
        metrics::record_upload();
        tracing::info!(
            document_id = %document.id,
            filename = %document.filename,
            size,
            "Upload accepted"
        );

        self.notifications
            .success(format!("{} uploaded successfully", document.filename));
        self.schedule_refresh();

        Ok(document)
    }

    pub async fn delete(&self, id: &str) -> Result<(), WorkspaceError> {
        let _busy = self.processing.begin(id, ProcessingStatus::Deleting)?;
        let filename = self.display_name(id);

        match self.documents.remove(id).await {
            Ok(()) => {
                self.summaries.clear(id);
                metrics::record_delete();
                self.notifications.success(format!("{} deleted", filename));
                Ok(())
            }
            Err(e) => {
                self.notifications
                    .error(format!("Could not delete {}: {}", filename, e));
                Err(e.into())
            }
        }
    }

    pub async fn summarize(
        &self,
        id: &str,
        summary_type: SummaryType,
    ) -> Result<Summary, WorkspaceError> {
        let _busy = self.processing.begin(id, ProcessingStatus::Summarizing)?;

        let summary = self
            .backend
            .summarize(id, summary_type)
            .await
            .map_err(|e| self.report_failure(e))?;

        tracing::info!(document_id = %id, summary_type = summary_type.as_str(), "Summary generated");
        self.summaries.store(id, summary_type, &summary);
        self.notifications
            .success(format!("Summary ready for {}", self.display_name(id)));
        Ok(summary)
    }

    /// `top_k` is clamped to `1..=MAX_TOP_K`.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, WorkspaceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.reject(ValidationError::EmptyQuery));
        }

        let hits = self
            .backend
            .search(query, top_k.clamp(1, MAX_TOP_K))
            .await
            .map_err(|e| self.report_failure(e))?;

        tracing::info!(results = hits.len(), "Search completed");
        self.notifications
            .info(format!("Found {} result(s)", hits.len()));
        Ok(hits)
    }

    /// Ask a question, optionally scoped to `doc_ids`. An empty scope means
    /// all documents.
    pub async fn ask(
        &self,
        question: &str,
        doc_ids: Option<&[String]>,
    ) -> Result<Answer, WorkspaceError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(self.reject(ValidationError::EmptyQuestion));
        }
        let doc_ids = doc_ids.filter(|ids| !ids.is_empty());

        let answer = self
            .backend
            .ask_question(question, doc_ids)
            .await
            .map_err(|e| self.report_failure(e))?;

        tracing::info!(sources = answer.sources.len(), "Question answered");
        Ok(answer)
    }

    fn display_name(&self, id: &str) -> String {
        self.documents
            .get(id)
            .map(|d| d.filename)
            .unwrap_or_else(|| format!("document {}", id))
    }
}
