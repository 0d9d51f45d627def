use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a job posting's embedding.
///
/// The pipeline only ever commits `Pending -> Completed` or
/// `Pending -> Failed`. `Processing` is reserved for a future
/// publish-acknowledged intermediate state; downstream consumers must not
/// depend on observing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub apply_url: Option<String>,
    /// Model-defined length; empty until the embedding pipeline completes.
    pub embedding: Vec<f64>,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted at job creation. Everything else (id, status, embedding,
/// timestamps) is store-assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub company: String,
    pub apply_url: Option<String>,
}
