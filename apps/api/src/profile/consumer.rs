use std::sync::Arc;

use tracing::{error, info, warn};

use crate::broker::{MessageBroker, TOPIC_RESUME_PROCESSED};
use crate::errors::AppError;
use crate::jobs::messages::ResumeEmbeddingMessage;
use crate::profile::store::ProfileStore;

/// Consumes `resume.processed` results. Same idempotent-update contract as
/// the job embedding consumer, applied to the user's resume profile.
pub async fn run_resume_embedding_consumer(
    broker: Arc<dyn MessageBroker>,
    store: Arc<dyn ProfileStore>,
) -> Result<(), AppError> {
    let mut rx = broker.subscribe(TOPIC_RESUME_PROCESSED).await?;
    info!("Resume embedding consumer listening on '{TOPIC_RESUME_PROCESSED}'");

    while let Some(payload) = rx.recv().await {
        handle_resume_message(store.as_ref(), &payload).await;
    }

    warn!("Resume embedding stream closed");
    Ok(())
}

pub async fn handle_resume_message(store: &dyn ProfileStore, payload: &[u8]) {
    let message: ResumeEmbeddingMessage = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!("Discarding malformed resume embedding message: {e}");
            return;
        }
    };

    match store
        .set_resume_embedding(message.user_id, &message.embedding)
        .await
    {
        Ok(()) => info!("Stored resume embedding for user {}", message.user_id),
        Err(AppError::NotFound(_)) => {
            warn!(
                "Resume embedding for unknown user {}, ignoring",
                message.user_id
            );
        }
        Err(e) => {
            // No terminal state to record on a profile; log and move on.
            error!(
                "Failed to store resume embedding for user {}: {e}",
                message.user_id
            );
        }
    }
}
