//! Session state owned by the application root and shared by handle.

pub mod documents;
pub mod notifications;
pub mod processing;
pub mod summaries;

pub use documents::DocumentStore;
pub use notifications::{NotificationQueue, DEFAULT_NOTIFICATION_TTL};
pub use processing::{DocumentBusy, ProcessingGuard, ProcessingStatus, ProcessingTracker};
pub use summaries::{StoredSummary, SummaryCache};
