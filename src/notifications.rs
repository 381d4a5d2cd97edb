//! Unread-notification badge.
//!
//! Holds the unread count seeded from the initial page payload. Writes go to
//! the server and the count is then re-read from it; only
//! [`NotificationBadge::mark_all_as_read`] zeroes the count locally before the
//! server confirms.

use reqwest::Method;

use crate::config;
use crate::error::Result;
use crate::events::{SubscriptionId, Subscribers};
use crate::http::ApiClient;
use crate::models::UnreadCount;

/// Remote side of the notification badge.
pub trait NotificationBackend {
    fn unread_count(&self) -> Result<u64>;

    fn mark_as_read(&self, notification_id: u64) -> Result<()>;

    fn mark_all_as_read(&self) -> Result<()>;
}

/// [`NotificationBackend`] over the marketplace's `/notifications` endpoints.
#[derive(Debug, Clone)]
pub struct HttpNotificationBackend {
    api: ApiClient,
}

impl HttpNotificationBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl NotificationBackend for HttpNotificationBackend {
    fn unread_count(&self) -> Result<u64> {
        let resp: UnreadCount = self.api.get_json(config::UNREAD_COUNT_PATH)?;
        Ok(resp.count)
    }

    fn mark_as_read(&self, notification_id: u64) -> Result<()> {
        self.api
            .send(Method::POST, &config::mark_read_path(notification_id))
    }

    fn mark_all_as_read(&self) -> Result<()> {
        self.api.send(Method::POST, config::READ_ALL_PATH)
    }
}

// ---------------------------------------------------------------------------
// NotificationBadge
// ---------------------------------------------------------------------------

pub struct NotificationBadge<B> {
    backend: B,
    unread: u64,
    subscribers: Subscribers<UnreadCount>,
}

impl<B: NotificationBackend> NotificationBadge<B> {
    /// Create a badge seeded with the count from the initial page payload.
    pub fn new(backend: B, initial_unread: u64) -> Self {
        Self {
            backend,
            unread: initial_unread,
            subscribers: Subscribers::new(),
        }
    }

    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// Mark one notification read, then re-read the count from the server.
    pub fn mark_as_read(&mut self, notification_id: u64) -> Result<u64> {
        self.backend.mark_as_read(notification_id)?;
        self.refresh()
    }

    /// Zero the count immediately, then confirm with the server.
    ///
    /// If the server write fails the local count stays at zero; the next
    /// successful [`refresh`](Self::refresh) corrects it.
    pub fn mark_all_as_read(&mut self) -> Result<u64> {
        self.set_unread(0);
        self.backend.mark_all_as_read()?;
        self.refresh()
    }

    /// Re-read the unread count from the server.
    pub fn refresh(&mut self) -> Result<u64> {
        let count = self.backend.unread_count()?;
        self.set_unread(count);
        Ok(count)
    }

    /// Call `callback` whenever the unread count changes.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&UnreadCount) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn set_unread(&mut self, count: u64) {
        if count != self.unread {
            self.unread = count;
            self.subscribers.publish(&UnreadCount { count });
        }
    }
}
