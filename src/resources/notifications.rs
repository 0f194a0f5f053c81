use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{Notification, UnreadCount};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Unread notification badge, shared between the REST client and the realtime channel
#[derive(Debug, Clone)]
pub struct UnreadCounter {
    count: Arc<watch::Sender<u64>>,
}

impl Default for UnreadCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadCounter {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    pub fn get(&self) -> u64 {
        *self.count.borrow()
    }

    pub fn set(&self, value: u64) {
        self.count.send_replace(value);
    }

    pub fn increment(&self) {
        self.count.send_modify(|c| *c = c.saturating_add(1));
    }

    /// Never goes below zero
    pub fn decrement(&self) {
        self.count.send_modify(|c| *c = c.saturating_sub(1));
    }

    pub fn reset(&self) {
        self.set(0);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count.subscribe()
    }
}

#[derive(Debug, Clone)]
pub struct NotificationsClient {
    api: ApiClient,
    unread: UnreadCounter,
}

impl NotificationsClient {
    pub fn new(api: ApiClient, unread: UnreadCounter) -> Self {
        Self { api, unread }
    }

    pub fn unread(&self) -> &UnreadCounter {
        &self.unread
    }

    /// One page of notifications, newest first; `None` uses page 0 / size 20
    pub async fn list(&self, page: Option<u32>, size: Option<u32>) -> Result<Envelope<Vec<Notification>>, ClientError> {
        let query = vec![
            ("page".to_string(), page.unwrap_or(0).to_string()),
            ("size".to_string(), size.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        self.api.get_with_query("/notifications", query).await
    }

    /// Fetch the unread count and publish it to the shared counter
    pub async fn unread_count(&self) -> Result<Envelope<UnreadCount>, ClientError> {
        let envelope: Envelope<UnreadCount> = self.api.get("/notifications/unread-count").await?;
        if let Some(unread) = envelope.data() {
            self.unread.set(unread.count);
        }
        Ok(envelope)
    }

    pub async fn mark_as_read(&self, notification_id: i64) -> Result<Envelope<Value>, ClientError> {
        let envelope = self
            .api
            .patch_empty(&format!("/notifications/{}/read", notification_id))
            .await?;
        self.unread.decrement();
        Ok(envelope)
    }

    pub async fn mark_all_as_read(&self) -> Result<Envelope<Value>, ClientError> {
        let envelope = self.api.patch_empty("/notifications/read-all").await?;
        self.unread.reset();
        Ok(envelope)
    }
}
