use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::{JobRow, JobStatus};
use crate::profile::store::ProfileStore;
use crate::recommend::scoring::rank;
use crate::recommend::titles::related_titles;

/// A recommendation as callers see it: the posting fields without the
/// embedding vector or any ranking internals.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedJob {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub apply_url: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for RecommendedJob {
    fn from(job: JobRow) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            company: job.company,
            apply_url: job.apply_url,
            status: job.status,
            created_at: job.created_at,
        }
    }
}

/// Ranks completed, embedded jobs against the user's resume embedding.
///
/// Precondition failures (missing profile, missing or empty resume
/// embedding) are typed errors for the caller, never panics.
pub async fn recommend(
    jobs: &dyn JobStore,
    profiles: &dyn ProfileStore,
    user_id: Uuid,
    limit: usize,
) -> Result<Vec<RecommendedJob>, AppError> {
    let profile = profiles
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id} not found")))?;

    let resume_embedding = match &profile.resume_embedding {
        Some(e) if !e.is_empty() => e.clone(),
        _ => {
            return Err(AppError::UnprocessableEntity(format!(
                "No resume embedding available for user {user_id}"
            )))
        }
    };

    // The expansion is informational for now; scoring keys off the raw
    // title only. TODO: fold the related-title set into candidate
    // filtering once the scoring formula settles.
    let related = related_titles(&profile.job_title);
    debug!("Recommending for user {user_id}, related titles: {related:?}");

    let candidates = jobs.completed_with_embedding().await?;
    let ranked = rank(candidates, &resume_embedding, &profile.job_title, limit);

    Ok(ranked.into_iter().map(|s| RecommendedJob::from(s.job)).collect())
}
