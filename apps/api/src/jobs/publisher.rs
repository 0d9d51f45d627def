use tracing::{error, warn};

use crate::broker::{MessageBroker, TOPIC_JOB_PROCESS};
use crate::jobs::messages::EmbeddingRequestMessage;
use crate::models::job::JobRow;

/// Text handed to the embedding model: title and description joined with a
/// sentence separator.
pub fn embedding_input(title: &str, description: &str) -> String {
    format!("{title}. {description}")
}

/// Publishes an embedding request for a freshly stored job. Fire-and-forget:
/// the caller never learns whether or when the embedding will complete, and
/// a publish failure must not fail the creation flow. It leaves the job
/// `pending`, which the optional staleness reaper will eventually surface.
pub async fn request_embedding(broker: &dyn MessageBroker, job: &JobRow) {
    let message = EmbeddingRequestMessage {
        job_id: job.id,
        text: embedding_input(&job.title, &job.description),
    };
    let payload = match serde_json::to_vec(&message) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to encode embedding request for job {}: {e}", job.id);
            return;
        }
    };
    if let Err(e) = broker.publish(TOPIC_JOB_PROCESS, payload).await {
        warn!(
            "Failed to publish embedding request for job {}: {e}; job stays pending",
            job.id
        );
    }
}
