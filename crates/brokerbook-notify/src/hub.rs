//! # Notification Hub
//!
//! In-process publish/subscribe for notifications. Created once by the
//! application and passed to whoever needs it; clones share state.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       NotificationHub                                   │
//! │                                                                         │
//! │  publish(n) ──▶ dedup_key already held? ──yes──▶ dropped (None)        │
//! │                        │ no                                             │
//! │                        ▼                                                │
//! │              ┌───────────────────┐                                      │
//! │              │ history (VecDeque)│  bounded, oldest evicted            │
//! │              │ keys (HashMap)    │  held until clear()                 │
//! │              └─────────┬─────────┘                                      │
//! │                        ▼                                                │
//! │              broadcast::Sender ──▶ subscriber 1 (log)                  │
//! │                                ──▶ subscriber 2 (dashboard push)       │
//! │                                                                         │
//! │  A lagging subscriber skips messages; publishers never wait.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::HubSettings;
use crate::error::{NotifyError, NotifyResult};
use crate::notification::Notification;

#[derive(Default)]
struct HubState {
    history: VecDeque<Notification>,
    /// dedup key -> recipient. Outlives history eviction.
    keys: HashMap<String, String>,
}

struct HubInner {
    state: RwLock<HubState>,
    history_limit: usize,
    sender: broadcast::Sender<Notification>,
}

/// Shared notification store with live fan-out.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    pub fn new(settings: &HubSettings) -> Self {
        let (sender, _) = broadcast::channel(settings.channel_capacity.max(1));
        NotificationHub {
            inner: Arc::new(HubInner {
                state: RwLock::new(HubState::default()),
                history_limit: settings.history_limit.max(1),
                sender,
            }),
        }
    }

    /// Stores and broadcasts `notification`.
    ///
    /// Returns `None` when a notification with the same dedup key is
    /// already held, read or not. Keys stay held after the notification
    /// itself is evicted from history; only [`clear`](Self::clear) releases them.
    pub async fn publish(&self, notification: Notification) -> Option<Uuid> {
        let mut state = self.inner.state.write().await;

        if state.keys.contains_key(&notification.dedup_key) {
            trace!(dedup_key = %notification.dedup_key, "Duplicate notification dropped");
            return None;
        }

        while state.history.len() >= self.inner.history_limit {
            state.history.pop_front();
        }

        let id = notification.id;
        debug!(
            id = %id,
            kind = %notification.kind,
            sale_id = %notification.sale_id,
            recipient = %notification.recipient_id,
            "Publishing notification"
        );
        state
            .keys
            .insert(notification.dedup_key.clone(), notification.recipient_id.clone());
        state.history.push_back(notification.clone());
        drop(state);

        // no receivers is fine
        let _ = self.inner.sender.send(notification);
        Some(id)
    }

    /// Live feed of newly published notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.sender.subscribe()
    }

    /// Notifications for `recipient`, newest first.
    pub async fn list(&self, recipient: &str) -> Vec<Notification> {
        self.inner
            .state
            .read()
            .await
            .history
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient)
            .cloned()
            .collect()
    }

    pub async fn unread_count(&self, recipient: &str) -> usize {
        self.inner
            .state
            .read()
            .await
            .history
            .iter()
            .filter(|n| n.recipient_id == recipient && !n.read)
            .count()
    }

    pub async fn mark_read(&self, id: Uuid) -> NotifyResult<()> {
        let mut state = self.inner.state.write().await;
        let notification = state
            .history
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(NotifyError::NotFound(id))?;
        notification.read = true;
        Ok(())
    }

    /// Marks every notification for `recipient` read. Returns how many changed.
    pub async fn mark_all_read(&self, recipient: &str) -> usize {
        let mut state = self.inner.state.write().await;
        let mut changed = 0;
        for n in state.history.iter_mut().filter(|n| n.recipient_id == recipient && !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }

    /// Removes every notification for `recipient`. Returns how many were removed.
    ///
    /// Every dedup key published for `recipient` is released, including
    /// keys whose notifications were already evicted.
    pub async fn clear(&self, recipient: &str) -> usize {
        let mut state = self.inner.state.write().await;
        let before = state.history.len();
        state.history.retain(|n| n.recipient_id != recipient);
        state.keys.retain(|_, owner| owner.as_str() != recipient);
        before - state.history.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.read().await.history.is_empty()
    }
}
