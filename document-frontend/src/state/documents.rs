//! Session document collection with optimistic inserts.
//!
//! The store is the single writer of the document list. Every mutation
//! publishes a fresh [`DocumentSnapshot`] on a watch channel so views can
//! re-render.
//!
//! Overlapping refreshes are sequence-stamped: a completed refresh is only
//! applied when no later-issued refresh has been applied already, so a slow
//! stale response can never overwrite a newer list.

use crate::models::{Document, DocumentSnapshot};
use crate::services::backend::{Backend, BackendError};
use crate::services::metrics;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    backend: Arc<dyn Backend>,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<DocumentSnapshot>,
}

#[derive(Default)]
struct StoreState {
    documents: Vec<Document>,
    error: Option<String>,
    in_flight: usize,
    /// Ticket handed to the most recently started refresh.
    issued: u64,
    /// Ticket of the newest refresh whose outcome has been applied.
    applied: u64,
}

impl StoreState {
    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            documents: self.documents.clone(),
            loading: self.in_flight > 0,
            error: self.error.clone(),
        }
    }
}

/// Ends a refresh's loading period on every exit path, including when the
/// refresh future is dropped before the backend answers.
struct LoadingGuard<'a> {
    store: &'a DocumentStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.update(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
        });
    }
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (snapshots, _) = watch::channel(DocumentSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                backend,
                state: Mutex::new(StoreState::default()),
                snapshots,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state and publish the resulting snapshot under the same lock,
    /// so observers see snapshots in mutation order.
    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.inner.snapshots.send_replace(state.snapshot());
        result
    }

    /// Replace the collection with the backend's list.
    ///
    /// Failures are recorded in the snapshot's `error` and the previous
    /// documents stay available.
    pub async fn refresh(&self) -> DocumentSnapshot {
        let ticket = self.update(|state| {
            state.issued += 1;
            state.in_flight += 1;
            state.error = None;
            state.issued
        });
        let loading = LoadingGuard { store: self };

        let result = self.inner.backend.list_documents().await;

        self.update(|state| {
            if ticket <= state.applied {
                tracing::debug!(
                    ticket,
                    applied = state.applied,
                    "Discarding stale document list"
                );
                return;
            }
            state.applied = ticket;

            match result {
                Ok(documents) => {
                    tracing::info!(count = documents.len(), "Document list refreshed");
                    state.documents = documents;
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Document refresh failed, keeping previous list");
                    metrics::record_backend_error(e.operation());
                    state.error = Some(e.to_string());
                }
            }
        });

        drop(loading);
        self.snapshot()
    }

    /// Insert a document at the head without contacting the backend.
    ///
    /// An entry with the same id is replaced so ids stay unique. The next
    /// [`refresh`](Self::refresh) overwrites whatever was added here.
    pub fn add(&self, document: Document) {
        tracing::debug!(document_id = %document.id, "Optimistically adding document");
        self.update(|state| {
            state.documents.retain(|d| d.id != document.id);
            state.documents.insert(0, document);
        });
    }

    /// Delete on the backend, then drop the local entry.
    ///
    /// On failure nothing changes locally and the error goes back to the
    /// caller; the store-wide `error` is left alone.
    pub async fn remove(&self, id: &str) -> Result<(), BackendError> {
        self.inner.backend.delete_document(id).await.map_err(|e| {
            tracing::warn!(document_id = %id, error = %e, "Document delete failed");
            metrics::record_backend_error(e.operation());
            e
        })?;

        self.update(|state| state.documents.retain(|d| d.id != id));
        tracing::info!(document_id = %id, "Document removed");
        Ok(())
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.lock().snapshot()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.lock().documents.iter().find(|d| d.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().documents.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<DocumentSnapshot> {
        self.inner.snapshots.subscribe()
    }
}
