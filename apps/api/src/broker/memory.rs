use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{BrokerError, MessageBroker};

/// In-process broker with the same contract as the Redis implementation:
/// every subscriber of a topic receives its own copy of each published
/// payload. Used by tests and single-process wiring.
#[derive(Default)]
pub struct InMemoryBroker {
    topics: Mutex<HashMap<String, Vec<UnboundedSender<Vec<u8>>>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(senders) = topics.get_mut(topic) {
            // Drop subscribers whose receiver side is gone.
            senders.retain(|tx| tx.send(payload.clone()).is_ok());
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<UnboundedReceiver<Vec<u8>>, BrokerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics.entry(topic.to_string()).or_default().push(tx);
        Ok(rx)
    }
}
