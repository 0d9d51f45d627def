use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::broker::{MessageBroker, TOPIC_JOB_PROCESSED};
use crate::errors::AppError;
use crate::jobs::messages::EmbeddingResultMessage;
use crate::jobs::store::JobStore;

/// Consumes `job.processed` results for the life of the process. This is
/// the single writer of terminal job state; every write it performs is an
/// idempotent keyed field-set, so any number of instances may run
/// concurrently against the same store.
pub async fn run_embedding_result_consumer(
    broker: Arc<dyn MessageBroker>,
    store: Arc<dyn JobStore>,
) -> Result<(), AppError> {
    let mut rx = broker.subscribe(TOPIC_JOB_PROCESSED).await?;
    info!("Embedding result consumer listening on '{TOPIC_JOB_PROCESSED}'");

    while let Some(payload) = rx.recv().await {
        handle_result_message(store.as_ref(), &payload).await;
    }

    warn!("Embedding result stream closed");
    Ok(())
}

/// Applies one delivered result. A message is handled at most once from the
/// consumer's perspective: failures are converted to terminal job state and
/// logged, never re-raised for redelivery.
pub async fn handle_result_message(store: &dyn JobStore, payload: &[u8]) {
    let message: EmbeddingResultMessage = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!("Discarding malformed embedding result: {e}");
            return;
        }
    };
    let job_id = message.job_id;

    match (message.error, message.embedding) {
        (Some(reason), _) => fail_job(store, job_id, &reason).await,
        (None, Some(embedding)) => match store.apply_embedding_result(job_id, &embedding).await {
            Ok(()) => info!("Stored embedding for job {job_id}"),
            Err(AppError::NotFound(_)) => {
                warn!("Embedding result for unknown job {job_id}, ignoring");
            }
            Err(e) => {
                error!("Failed to store embedding for job {job_id}: {e}");
                fail_job(store, job_id, &e.to_string()).await;
            }
        },
        (None, None) => {
            fail_job(store, job_id, "result carried neither embedding nor error").await;
        }
    }
}

async fn fail_job(store: &dyn JobStore, job_id: Uuid, reason: &str) {
    match store.mark_failed(job_id, reason).await {
        Ok(()) => warn!("Marked job {job_id} as failed: {reason}"),
        // The message still counts as handled; the record stays as-is until
        // a retried delivery or the reaper reaches it.
        Err(e) => error!("Failed to mark job {job_id} as failed: {e}"),
    }
}

/// Optional staleness reaper, a hardening extension. The pipeline defines
/// no timeout for a request whose result never arrives, so a lost message
/// leaves its job `pending` forever; when `PENDING_JOB_TIMEOUT_SECS` is set
/// this task periodically moves such jobs to `failed` so they end in a
/// terminal, inspectable state.
pub async fn run_pending_reaper(store: Arc<dyn JobStore>, timeout: Duration) {
    let period = timeout.min(Duration::from_secs(60));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let cutoff = chrono::Utc::now()
            - chrono::Duration::seconds(timeout.as_secs().min(i64::MAX as u64) as i64);
        match store.fail_stale_pending(cutoff).await {
            Ok(0) => {}
            Ok(n) => warn!("Reaped {n} jobs stuck pending past {timeout:?}"),
            Err(e) => error!("Pending reaper sweep failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::memory::InMemoryBroker;
    use crate::models::job::JobStatus;
    use crate::testutil::InMemoryJobStore;

    fn result_payload(job_id: Uuid, embedding: &[f64]) -> Vec<u8> {
        serde_json::to_vec(&EmbeddingResultMessage {
            job_id,
            embedding: Some(embedding.to_vec()),
            error: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_result_transitions_pending_to_completed() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);

        handle_result_message(&store, &result_payload(job.id, &[0.1, 0.2])).await;

        let updated = store.get(job.id);
        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(updated.embedding, vec![0.1, 0.2]);
        assert!(updated.error.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_result_is_idempotent() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);
        let payload = result_payload(job.id, &[0.5, 0.5]);

        handle_result_message(&store, &payload).await;
        let once = store.get(job.id);
        handle_result_message(&store, &payload).await;
        let twice = store.get(job.id);

        assert_eq!(once.status, twice.status);
        assert_eq!(once.embedding, twice.embedding);
    }

    #[tokio::test]
    async fn test_late_result_overwrites_failed_state() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);
        store.mark_failed(job.id, "model unavailable").await.unwrap();

        handle_result_message(&store, &result_payload(job.id, &[1.0])).await;

        let updated = store.get(job.id);
        assert_eq!(updated.status, JobStatus::Completed);
        assert!(updated.error.is_none());
    }

    #[tokio::test]
    async fn test_error_result_marks_job_failed() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);

        let payload = serde_json::to_vec(&EmbeddingResultMessage {
            job_id: job.id,
            embedding: None,
            error: Some("model exploded".to_string()),
        })
        .unwrap();
        handle_result_message(&store, &payload).await;

        let updated = store.get(job.id);
        assert_eq!(updated.status, JobStatus::Failed);
        assert_eq!(updated.error.as_deref(), Some("model exploded"));
    }

    #[tokio::test]
    async fn test_mark_failed_overwrites_completed_job() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);
        store.apply_embedding_result(job.id, &[0.3]).await.unwrap();

        let payload = serde_json::to_vec(&EmbeddingResultMessage {
            job_id: job.id,
            embedding: None,
            error: Some("late failure".to_string()),
        })
        .unwrap();
        handle_result_message(&store, &payload).await;

        let updated = store.get(job.id);
        assert_eq!(updated.status, JobStatus::Failed);
        assert_eq!(updated.error.as_deref(), Some("late failure"));
    }

    #[tokio::test]
    async fn test_unknown_job_and_malformed_payload_do_not_panic() {
        let store = InMemoryJobStore::new();

        handle_result_message(&store, &result_payload(Uuid::new_v4(), &[0.1])).await;
        handle_result_message(&store, b"not json at all").await;

        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_message_marks_job_failed() {
        let store = InMemoryJobStore::new();
        let job = store.seed("Backend Developer", vec![]);

        let payload = serde_json::to_vec(&EmbeddingResultMessage {
            job_id: job.id,
            embedding: None,
            error: None,
        })
        .unwrap();
        handle_result_message(&store, &payload).await;

        assert_eq!(store.get(job.id).status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_consumer_loop_drains_subscription() {
        let broker = Arc::new(InMemoryBroker::new());
        let store = Arc::new(InMemoryJobStore::new());
        let job = store.seed("Backend Developer", vec![]);

        let consumer = tokio::spawn(run_embedding_result_consumer(
            broker.clone() as Arc<dyn MessageBroker>,
            store.clone() as Arc<dyn JobStore>,
        ));

        // Give the consumer a moment to subscribe before publishing.
        tokio::task::yield_now().await;
        broker
            .publish(TOPIC_JOB_PROCESSED, result_payload(job.id, &[0.9]))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if store.get(job.id).status == JobStatus::Completed {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("consumer should process the published result");

        consumer.abort();
    }
}
