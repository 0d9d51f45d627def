use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, JobStatus, NewJob};

/// Error text written by the pending reaper so operators can tell a
/// timed-out job from one the model service rejected.
pub const STALE_PENDING_ERROR: &str = "embedding request timed out while pending";

/// Durable store for job postings. All mutations past creation are keyed
/// field-sets with last-write-wins semantics, so the result consumer can
/// run multiple instances and replay at-least-once deliveries safely.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a record with `status=pending` and an empty embedding.
    /// Must have committed before any embedding request is published.
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError>;

    /// Inserts a batch atomically: one transaction, any failure rolls the
    /// whole batch back so no request is ever published for a half-inserted
    /// batch.
    async fn create_bulk(&self, jobs: Vec<NewJob>) -> Result<Vec<JobRow>, AppError>;

    async fn find_all(&self) -> Result<Vec<JobRow>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobRow>, AppError>;

    /// Exact-match lookup on the stored embedding vector.
    async fn find_by_embedding(&self, embedding: &[f64]) -> Result<Vec<JobRow>, AppError>;

    /// Removes the record, returning it if it existed. Deletion is an
    /// administrative operation; the pipeline never calls this.
    async fn delete(&self, id: Uuid) -> Result<Option<JobRow>, AppError>;

    /// Ranking candidates: completed jobs with a non-empty embedding,
    /// ordered by creation time so equal scores rank deterministically.
    async fn completed_with_embedding(&self) -> Result<Vec<JobRow>, AppError>;

    /// Transitions the record to `completed` with the given embedding.
    /// Idempotent: duplicate or late results simply overwrite, whatever
    /// state the record is in. An unknown id is a reported `NotFound`.
    async fn apply_embedding_result(&self, id: Uuid, embedding: &[f64]) -> Result<(), AppError>;

    /// Transitions the record to `failed`, storing the error. Overwrites
    /// terminal states; an unknown id is logged and swallowed.
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError>;

    /// Fails every job still `pending` that was created before `cutoff`.
    /// Returns the number of records reaped. Only the optional staleness
    /// reaper calls this.
    async fn fail_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (title, description, company, apply_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.apply_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_bulk(&self, jobs: Vec<NewJob>) -> Result<Vec<JobRow>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let row = sqlx::query_as::<_, JobRow>(
                r#"
                INSERT INTO jobs (title, description, company, apply_url)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.company)
            .bind(&job.apply_url)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn find_all(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_embedding(&self, embedding: &[f64]) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE embedding = $1")
                .bind(embedding)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn delete(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("DELETE FROM jobs WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn completed_with_embedding(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE status = $1 AND cardinality(embedding) > 0
            ORDER BY created_at ASC
            "#,
        )
        .bind(JobStatus::Completed)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn apply_embedding_result(&self, id: Uuid, embedding: &[f64]) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET embedding = $2, status = $3, error = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(embedding)
        .bind(JobStatus::Completed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {id} not found")));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2, error = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Failed)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("mark_failed: job {id} not found, nothing to update");
        }
        Ok(())
    }

    async fn fail_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2, error = $3, updated_at = now()
            WHERE status = $1 AND created_at < $4
            "#,
        )
        .bind(JobStatus::Pending)
        .bind(JobStatus::Failed)
        .bind(STALE_PENDING_ERROR)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
