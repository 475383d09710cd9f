//! In-process registry routing job snapshots to WebSocket subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, Mutex, RwLock};

use reviewhub_core::snapshot::JobSnapshot;
use reviewhub_core::types::DbId;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Handle identifying one registration, returned by [`JobHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    job_id: DbId,
    id: u64,
}

/// Subscribers of one job. Guarded by its own mutex so traffic on one job
/// never blocks another.
#[derive(Default)]
struct Topic {
    next_id: u64,
    subscribers: Vec<(u64, WsSender)>,
}

/// Routes job snapshots to the connections subscribed to each job.
///
/// Delivery is best-effort: a subscriber whose channel has closed is
/// dropped during publish without affecting the others. Per-job publish
/// order is preserved (publishes hold the topic lock; each subscriber
/// channel is FIFO). Designed to be wrapped in `Arc` and shared across
/// the application.
pub struct JobHub {
    topics: RwLock<HashMap<DbId, Arc<Mutex<Topic>>>>,
}

impl JobHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new subscriber for a job.
    ///
    /// Returns the subscription handle and the receiver half of the
    /// message channel so the caller can forward messages to the
    /// WebSocket sink. Multiple connections may subscribe to the same
    /// job (e.g. multiple tabs).
    pub async fn subscribe(
        &self,
        job_id: DbId,
    ) -> (Subscription, mpsc::UnboundedReceiver<Message>) {
        let topic = {
            let mut topics = self.topics.write().await;
            Arc::clone(topics.entry(job_id).or_default())
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let mut topic = topic.lock().await;
        let id = topic.next_id;
        topic.next_id += 1;
        topic.subscribers.push((id, tx));

        (Subscription { job_id, id }, rx)
    }

    /// Remove a registration. Safe to call multiple times.
    pub async fn unsubscribe(&self, subscription: Subscription) {
        let topic = {
            let topics = self.topics.read().await;
            topics.get(&subscription.job_id).cloned()
        };
        if let Some(topic) = topic {
            topic
                .lock()
                .await
                .subscribers
                .retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Deliver a snapshot to every subscriber of a job.
    ///
    /// Subscribers whose channels have closed are deregistered. If the
    /// snapshot is terminal, all subscribers receive a Close frame after
    /// it and the topic is dropped — no further updates are expected.
    ///
    /// Returns the number of subscribers the snapshot was sent to.
    pub async fn publish(&self, job_id: DbId, snapshot: &JobSnapshot) -> usize {
        let topic = {
            let topics = self.topics.read().await;
            topics.get(&job_id).cloned()
        };
        let Some(topic) = topic else {
            return 0;
        };

        let payload = match serde_json::to_string(snapshot) {
            Ok(json) => Message::Text(json.into()),
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to serialize job snapshot");
                return 0;
            }
        };

        let mut guard = topic.lock().await;
        guard
            .subscribers
            .retain(|(_, sender)| sender.send(payload.clone()).is_ok());
        let delivered = guard.subscribers.len();

        if snapshot.status.is_terminal() {
            for (_, sender) in guard.subscribers.drain(..) {
                let _ = sender.send(Message::Close(None));
            }
            drop(guard);
            self.topics.write().await.remove(&job_id);
        }

        delivered
    }

    /// Current number of subscribers for a job.
    pub async fn subscriber_count(&self, job_id: DbId) -> usize {
        let topic = {
            let topics = self.topics.read().await;
            topics.get(&job_id).cloned()
        };
        match topic {
            Some(topic) => topic.lock().await.subscribers.len(),
            None => 0,
        }
    }

    /// Send a Ping frame to every subscriber of every job.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let topics: Vec<_> = self.topics.read().await.values().cloned().collect();
        for topic in topics {
            let guard = topic.lock().await;
            for (_, sender) in &guard.subscribers {
                let _ = sender.send(Message::Ping(Bytes::new()));
            }
        }
    }

    /// Send a Close frame to every subscriber, then clear the registry.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut topics = self.topics.write().await;
        let mut count = 0;
        for topic in topics.values() {
            let mut guard = topic.lock().await;
            for (_, sender) in guard.subscribers.drain(..) {
                let _ = sender.send(Message::Close(None));
                count += 1;
            }
        }
        topics.clear();
        tracing::info!(count, "Closed all WebSocket subscriptions");
    }
}

impl Default for JobHub {
    fn default() -> Self {
        Self::new()
    }
}
