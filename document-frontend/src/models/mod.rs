pub mod assistant;
pub mod document;
pub mod notification;

pub use assistant::{Answer, AnswerSource, SearchHit, Summary, SummaryType};
pub use document::{Document, DocumentSnapshot, UploadReceipt};
pub use notification::{Notification, NotificationId, NotificationKind};
