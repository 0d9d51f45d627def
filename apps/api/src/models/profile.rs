use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Resume profile for a user. `resume_embedding` stays NULL until the
/// resume processing pipeline delivers a vector; ranking refuses to run
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfileRow {
    pub user_id: Uuid,
    pub job_title: String,
    pub resume_embedding: Option<Vec<f64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
