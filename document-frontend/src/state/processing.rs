//! Per-document operation status, e.g. "summarizing" while a summary is
//! being generated, so views can disable the matching controls.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Summarizing,
    Deleting,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Summarizing => write!(f, "summarizing"),
            ProcessingStatus::Deleting => write!(f, "deleting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Document {document_id} is busy ({status})")]
pub struct DocumentBusy {
    pub document_id: String,
    pub status: ProcessingStatus,
}

#[derive(Clone, Default)]
pub struct ProcessingTracker {
    statuses: Arc<DashMap<String, ProcessingStatus>>,
}

/// Clears the document's status when dropped.
#[must_use = "the status is cleared as soon as the guard is dropped"]
pub struct ProcessingGuard {
    statuses: Arc<DashMap<String, ProcessingStatus>>,
    document_id: String,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.statuses.remove(&self.document_id);
    }
}

impl ProcessingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `document_id` as busy with `status`. Fails if the document is
    /// already busy with any operation.
    pub fn begin(
        &self,
        document_id: &str,
        status: ProcessingStatus,
    ) -> Result<ProcessingGuard, DocumentBusy> {
        match self.statuses.entry(document_id.to_string()) {
            Entry::Occupied(existing) => Err(DocumentBusy {
                document_id: document_id.to_string(),
                status: *existing.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(status);
                Ok(ProcessingGuard {
                    statuses: Arc::clone(&self.statuses),
                    document_id: document_id.to_string(),
                })
            }
        }
    }

    pub fn status(&self, document_id: &str) -> Option<ProcessingStatus> {
        self.statuses.get(document_id).map(|s| *s.value())
    }

    pub fn is_processing(&self, document_id: &str) -> bool {
        self.statuses.contains_key(document_id)
    }

    /// All busy documents, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<String, ProcessingStatus> {
        self.statuses
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_status_on_drop() {
        let tracker = ProcessingTracker::new();
        {
            let _guard = tracker.begin("a", ProcessingStatus::Summarizing).unwrap();
            assert_eq!(tracker.status("a"), Some(ProcessingStatus::Summarizing));
            assert!(tracker.is_processing("a"));
        }
        assert_eq!(tracker.status("a"), None);
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn second_operation_on_same_document_is_rejected() {
        let tracker = ProcessingTracker::new();
        let _guard = tracker.begin("a", ProcessingStatus::Summarizing).unwrap();

        let err = tracker.begin("a", ProcessingStatus::Deleting).err().unwrap();
        assert_eq!(err.status, ProcessingStatus::Summarizing);
        assert_eq!(err.to_string(), "Document a is busy (summarizing)");
    }

    #[test]
    fn documents_are_tracked_independently() {
        let tracker = ProcessingTracker::new();
        let _a = tracker.begin("a", ProcessingStatus::Summarizing).unwrap();
        let b = tracker.begin("b", ProcessingStatus::Deleting).unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["b"], ProcessingStatus::Deleting);

        drop(b);
        assert!(tracker.is_processing("a"));
        assert!(!tracker.is_processing("b"));
    }
}
