//! Transport seam and the in-process implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::error::ChannelError;

/// Capacity of each per-topic broadcast buffer.
const TOPIC_BUFFER: usize = 256;

/// Publish/subscribe transport the gate channel runs over.
///
/// Implementations must be safe for concurrent publishers; the channel is a
/// single shared resource across all in-flight access attempts and does not
/// serialize callers itself.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Hand a payload to the transport. Returns on hand-off, not delivery.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError>;

    /// Subscribe to a topic, receiving payloads published after this call.
    async fn subscribe(&self, topic: &str) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError>;
}

/// In-process transport over tokio broadcast channels.
///
/// One sender per topic; publishing with no subscribers succeeds and drops
/// the message, matching broker semantics for an unwatched topic.
#[derive(Clone, Default)]
pub struct InProcessTransport {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>>,
    closed: Arc<AtomicBool>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the transport; further publishes fail with `Unavailable`.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    async fn sender_for(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        if let Some(sender) = self.topics.read().await.get(topic) {
            return sender.clone();
        }
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_BUFFER).0)
            .clone()
    }
}

#[async_trait]
impl CommandTransport for InProcessTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Unavailable("transport closed".into()));
        }
        let sender = self.sender_for(topic).await;
        // No receivers is not a failure; the message is simply dropped.
        let _ = sender.send(payload);
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Unavailable("transport closed".into()));
        }
        Ok(self.sender_for(topic).await.subscribe())
    }
}
