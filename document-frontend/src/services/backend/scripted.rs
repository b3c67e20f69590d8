//! Test double whose responses are queued up front.

use super::{Backend, BackendError, BackendOperation};
use crate::models::{Answer, Document, SearchHit, Summary, SummaryType, UploadReceipt};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Scripted<T> = Mutex<VecDeque<Result<T, String>>>;

/// Gate that holds a call until the test releases it.
#[derive(Clone, Default)]
pub(crate) struct Gate(Option<Arc<Semaphore>>);

impl Gate {
    pub(crate) fn closed() -> Self {
        Gate(Some(Arc::new(Semaphore::new(0))))
    }

    pub(crate) fn release(&self) {
        if let Some(semaphore) = &self.0 {
            semaphore.add_permits(1);
        }
    }

    async fn pass(&self) {
        if let Some(semaphore) = &self.0 {
            semaphore.acquire().await.unwrap().forget();
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    lists: Mutex<VecDeque<(Result<Vec<Document>, String>, Gate)>>,
    deletes: Scripted<()>,
    uploads: Scripted<UploadReceipt>,
    summaries: Scripted<Summary>,
    pub(crate) delete_gate: Gate,
    pub(crate) summarize_gate: Gate,
    asked_doc_ids: Mutex<Vec<Option<Vec<String>>>>,
    searched_top_k: Mutex<Vec<usize>>,
    calls: AtomicUsize,
}

fn next<T>(queue: &Scripted<T>, operation: BackendOperation) -> Result<T, BackendError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(format!("no scripted {} response", operation.as_str())))
        .map_err(|message| BackendError::status(operation, 500, message))
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold every delete until `gate` is released.
    pub(crate) fn with_delete_gate(mut self, gate: Gate) -> Self {
        self.delete_gate = gate;
        self
    }

    /// Hold every summarize call until `gate` is released.
    pub(crate) fn with_summarize_gate(mut self, gate: Gate) -> Self {
        self.summarize_gate = gate;
        self
    }

    pub(crate) fn push_list(&self, result: Result<Vec<Document>, &str>) {
        self.push_list_gated(result, Gate::default());
    }

    /// Queue a list response that is held until `gate` is released.
    pub(crate) fn push_list_gated(&self, result: Result<Vec<Document>, &str>, gate: Gate) {
        self.lists
            .lock()
            .unwrap()
            .push_back((result.map_err(str::to_string), gate));
    }

    pub(crate) fn push_delete(&self, result: Result<(), &str>) {
        self.deletes
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    pub(crate) fn push_upload(&self, result: Result<UploadReceipt, &str>) {
        self.uploads
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    pub(crate) fn push_summary(&self, result: Result<Summary, &str>) {
        self.summaries
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    /// The `doc_ids` scope of every question asked, in order.
    pub(crate) fn asked_doc_ids(&self) -> Vec<Option<Vec<String>>> {
        self.asked_doc_ids.lock().unwrap().clone()
    }

    /// The `top_k` of every search, in order.
    pub(crate) fn searched_top_k(&self) -> Vec<usize> {
        self.searched_top_k.lock().unwrap().clone()
    }

    /// Total number of backend calls made so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn doc(id: &str, page_count: u32) -> Document {
    Document {
        id: id.to_string(),
        filename: format!("{}.pdf", id),
        uploaded_at: Utc::now(),
        page_count,
        file_size_bytes: 1024,
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn upload_document(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _content_type: &str,
    ) -> Result<UploadReceipt, BackendError> {
        self.record();
        next(&self.uploads, BackendOperation::Upload)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        self.record();
        // Take the response before waiting so overlapping calls consume
        // responses in call order.
        let (result, gate) = self
            .lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| (Err("no scripted fetch response".to_string()), Gate::default()));
        gate.pass().await;
        result.map_err(|message| BackendError::status(BackendOperation::Fetch, 500, message))
    }

    async fn delete_document(&self, _id: &str) -> Result<(), BackendError> {
        self.record();
        let result = next(&self.deletes, BackendOperation::Delete);
        self.delete_gate.pass().await;
        result
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SearchHit>, BackendError> {
        self.record();
        self.searched_top_k.lock().unwrap().push(top_k);
        Ok(Vec::new())
    }

    async fn summarize(
        &self,
        _doc_id: &str,
        _summary_type: SummaryType,
    ) -> Result<Summary, BackendError> {
        self.record();
        let result = next(&self.summaries, BackendOperation::Summarize);
        self.summarize_gate.pass().await;
        result
    }

    async fn ask_question(
        &self,
        _question: &str,
        doc_ids: Option<&[String]>,
    ) -> Result<Answer, BackendError> {
        self.record();
        self.asked_doc_ids
            .lock()
            .unwrap()
            .push(doc_ids.map(<[String]>::to_vec));
        Ok(Answer {
            answer: String::new(),
            sources: Vec::new(),
        })
    }
}
