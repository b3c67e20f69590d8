//! Transient user-facing messages that dismiss themselves.
//!
//! Each notification gets its own expiry timer. Removal is idempotent, so a
//! timer that fires after an early [`dismiss`](NotificationQueue::dismiss)
//! does nothing.

use crate::models::{Notification, NotificationId, NotificationKind};
use crate::services::metrics;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    ttl: Duration,
    next_id: AtomicU64,
    /// Visible notifications, oldest first.
    entries: watch::Sender<Vec<Notification>>,
    timers: DashMap<NotificationId, AbortHandle>,
}

impl QueueInner {
    fn remove(&self, id: NotificationId) -> bool {
        self.entries.send_if_modified(|entries| {
            let before = entries.len();
            entries.retain(|n| n.id != id);
            entries.len() != before
        })
    }

    fn contains(&self, id: NotificationId) -> bool {
        self.entries.borrow().iter().any(|n| n.id == id)
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        for timer in self.timers.iter() {
            timer.value().abort();
        }
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(QueueInner {
                ttl,
                next_id: AtomicU64::new(0),
                entries,
                timers: DashMap::new(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Append a notification and schedule its removal after the queue's TTL.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            created_at: Utc::now(),
        };
        tracing::debug!(notification_id = %id, kind = %kind, message = %notification.message, "Notification enqueued");

        self.inner
            .entries
            .send_modify(|entries| entries.push(notification));
        metrics::record_notification(kind);

        let queue = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = queue.upgrade() {
                // Entry before handle: `enqueue` relies on this order to
                // never keep a handle for an expired notification.
                if inner.remove(id) {
                    tracing::debug!(notification_id = %id, "Notification expired");
                }
                inner.timers.remove(&id);
            }
        });

        self.inner.timers.insert(id, timer.abort_handle());
        // A short TTL on a multi-threaded runtime can expire before the
        // handle is stored, in which case the timer has already tried to
        // drop its handle.
        if !self.inner.contains(id) {
            self.inner.timers.remove(&id);
        }

        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, NotificationKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, NotificationKind::Info)
    }

    /// Remove a notification now. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        if let Some((_, timer)) = self.inner.timers.remove(&id) {
            timer.abort();
        }
        let removed = self.inner.remove(id);
        if removed {
            tracing::debug!(notification_id = %id, "Notification dismissed");
        }
        removed
    }

    /// Visible notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.entries.subscribe()
    }
}
