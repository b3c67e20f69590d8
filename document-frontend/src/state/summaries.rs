//! Last generated summary per document, kept until cleared or the document
//! is deleted.

use crate::models::{Summary, SummaryType};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSummary {
    pub summary_type: SummaryType,
    pub summary: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SummaryCache {
    entries: Arc<DashMap<String, StoredSummary>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier summary of the document, whatever its type.
    pub fn store(&self, document_id: &str, summary_type: SummaryType, summary: &Summary) {
        self.entries.insert(
            document_id.to_string(),
            StoredSummary {
                summary_type,
                summary: summary.summary.clone(),
                generated_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, document_id: &str) -> Option<StoredSummary> {
        self.entries.get(document_id).map(|entry| entry.value().clone())
    }

    /// Returns `false` if there was nothing to clear.
    pub fn clear(&self, document_id: &str) -> bool {
        self.entries.remove(document_id).is_some()
    }

    /// All stored summaries, ordered by document id.
    pub fn snapshot(&self) -> BTreeMap<String, StoredSummary> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
