//! Message channel abstraction for the embedding pipeline.
//!
//! Fire-and-forget publish and at-least-once subscribe over named topics.
//! No ordering guarantee, no delivery confirmation, no transactional
//! coupling with the database: a record is committed first and its request
//! published after, so a crash between the two can lose a request (the
//! optional pending reaper in `jobs::consumer` covers that gap).
//!
//! Consumers must be idempotent; every write they trigger is a keyed
//! field-set, so redelivery and duplicates are safe.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Topic carrying `EmbeddingRequestMessage` payloads to the model service.
pub const TOPIC_JOB_PROCESS: &str = "job.process";
/// Topic carrying `EmbeddingResultMessage` payloads back from the model service.
pub const TOPIC_JOB_PROCESSED: &str = "job.processed";
/// Topic carrying `ResumeEmbeddingMessage` payloads for user profiles.
pub const TOPIC_RESUME_PROCESSED: &str = "resume.processed";

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// Named pub/sub channel. Implementations must be safe to share across
/// tasks; the pipeline only ever holds this trait object, never a concrete
/// broker handle.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publishes a payload to a topic without waiting for any consumer.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError>;

    /// Registers a subscription and returns the stream of delivered
    /// payloads. Each subscriber gets its own copy of every message.
    async fn subscribe(&self, topic: &str) -> Result<UnboundedReceiver<Vec<u8>>, BrokerError>;
}
