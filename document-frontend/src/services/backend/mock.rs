//! Fixture backend returning canned data after an artificial delay.
//!
//! Only the field names follow the live API; the content is made up and is
//! not a contract.

use super::{Backend, BackendError, BackendOperation};
use crate::models::{
    Answer, AnswerSource, Document, SearchHit, Summary, SummaryType, UploadReceipt,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Rough bytes-per-page figures used to fake page counting.
const PDF_BYTES_PER_PAGE: u64 = 50 * 1024;
const TEXT_BYTES_PER_PAGE: u64 = 3_000;

pub struct MockBackend {
    latency: Duration,
    documents: Mutex<Vec<Document>>,
}

impl MockBackend {
    /// An empty backend.
    pub fn new(latency: Duration) -> Self {
        Self::with_documents(latency, Vec::new())
    }

    pub fn with_documents(latency: Duration, documents: Vec<Document>) -> Self {
        Self {
            latency,
            documents: Mutex::new(documents),
        }
    }

    /// A backend pre-populated with a few sample documents.
    pub fn seeded(latency: Duration) -> Self {
        let now = Utc::now();
        let sample = |id: &str, filename: &str, days_ago: i64, pages: u32, size: u64| Document {
            id: id.to_string(),
            filename: filename.to_string(),
            uploaded_at: now - ChronoDuration::days(days_ago),
            page_count: pages,
            file_size_bytes: size,
        };

        Self::with_documents(
            latency,
            vec![
                sample("sample-1", "quarterly-report.pdf", 1, 12, 1_245_184),
                sample("sample-2", "meeting-notes.md", 3, 2, 8_192),
                sample("sample-3", "onboarding-guide.txt", 7, 4, 14_336),
            ],
        )
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn find(&self, operation: BackendOperation, id: &str) -> Result<Document, BackendError> {
        self.documents
            .lock()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| {
                BackendError::status(operation, 404, format!("Document {} not found", id))
            })
    }
}

fn estimate_pages(filename: &str, size: u64) -> u32 {
    let per_page = if filename.to_ascii_lowercase().ends_with(".pdf") {
        PDF_BYTES_PER_PAGE
    } else {
        TEXT_BYTES_PER_PAGE
    };
    u32::try_from(size.div_ceil(per_page)).unwrap_or(u32::MAX).max(1)
}

#[async_trait]
impl Backend for MockBackend {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: &str,
    ) -> Result<UploadReceipt, BackendError> {
        self.simulate_latency().await;

        let size = bytes.len() as u64;
        let document = Document {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            page_count: estimate_pages(filename, size),
            file_size_bytes: size,
        };
        let receipt = UploadReceipt {
            id: document.id.clone(),
            filename: document.filename.clone(),
            uploaded_at: document.uploaded_at,
        };

        self.documents.lock().await.insert(0, document);
        Ok(receipt)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        self.simulate_latency().await;
        Ok(self.documents.lock().await.clone())
    }

    async fn delete_document(&self, id: &str) -> Result<(), BackendError> {
        self.simulate_latency().await;

        let mut documents = self.documents.lock().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(BackendError::status(
                BackendOperation::Delete,
                404,
                format!("Document {} not found", id),
            ));
        }
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, BackendError> {
        self.simulate_latency().await;

        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(rank, doc)| SearchHit {
                doc_id: doc.id.clone(),
                filename: doc.filename.clone(),
                score: (0.95 - 0.1 * rank as f32).max(0.05),
                snippet: format!("...a passage in {} that mentions \"{}\"...", doc.filename, query),
            })
            .collect())
    }

    async fn summarize(
        &self,
        doc_id: &str,
        summary_type: SummaryType,
    ) -> Result<Summary, BackendError> {
        self.simulate_latency().await;

        let doc = self.find(BackendOperation::Summarize, doc_id).await?;
        let summary = match summary_type {
            SummaryType::Short => format!(
                "{} covers its main topic across {} page(s).",
                doc.filename, doc.page_count
            ),
            SummaryType::Detailed => format!(
                "{} is a {}-page document of {} bytes. It opens with an overview, \
                 walks through the key findings section by section, and closes with \
                 recommendations and next steps.",
                doc.filename, doc.page_count, doc.file_size_bytes
            ),
        };
        Ok(Summary { summary })
    }

    async fn ask_question(
        &self,
        question: &str,
        doc_ids: Option<&[String]>,
    ) -> Result<Answer, BackendError> {
        self.simulate_latency().await;

        let documents = self.documents.lock().await;
        let sources: Vec<AnswerSource> = documents
            .iter()
            .filter(|doc| doc_ids.map_or(true, |ids| ids.contains(&doc.id)))
            .take(2)
            .enumerate()
            .map(|(rank, doc)| AnswerSource {
                doc_id: doc.id.clone(),
                filename: doc.filename.clone(),
                relevance_score: 0.9 - 0.15 * rank as f32,
                excerpt: format!("...relevant excerpt from {}...", doc.filename),
            })
            .collect();

        let answer = if sources.is_empty() {
            format!("No documents are available to answer \"{}\".", question)
        } else {
            format!(
                "Based on {} document(s), here is what I found about \"{}\".",
                sources.len(),
                question
            )
        };
        Ok(Answer { answer, sources })
    }
}
