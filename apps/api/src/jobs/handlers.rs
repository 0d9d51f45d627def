use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::publisher::request_embedding;
use crate::models::job::{JobRow, NewJob};
use crate::recommend::engine::{recommend, RecommendedJob};
use crate::recommend::scoring::effective_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company: String,
    pub apply_url: Option<String>,
}

impl CreateJobRequest {
    /// Intake validation. Invalid postings are rejected here with a 400
    /// and never reach the pipeline.
    fn validate(&self) -> Result<(), AppError> {
        let title_len = self.title.trim().chars().count();
        if !(3..=100).contains(&title_len) {
            return Err(AppError::Validation(
                "title must be between 3 and 100 characters".to_string(),
            ));
        }
        let description_len = self.description.trim().chars().count();
        if !(10..=2000).contains(&description_len) {
            return Err(AppError::Validation(
                "description must be between 10 and 2000 characters".to_string(),
            ));
        }
        if self.company.trim().is_empty() {
            return Err(AppError::Validation("company must not be empty".to_string()));
        }
        Ok(())
    }

    fn into_new_job(self) -> NewJob {
        NewJob {
            title: self.title,
            description: self.description,
            company: self.company,
            apply_url: self.apply_url,
        }
    }
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    req.validate()?;
    let job = state.jobs.create(req.into_new_job()).await?;
    // Publish strictly after the durable commit. A publish failure is
    // logged inside and leaves the job pending rather than failing the
    // request.
    request_embedding(state.broker.as_ref(), &job).await;
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize)]
pub struct CreateJobsBulkRequest {
    pub jobs: Vec<CreateJobRequest>,
}

/// POST /api/v1/jobs/bulk
///
/// The whole batch is validated up front and inserted atomically; requests
/// are published once per record only after the transaction commits.
pub async fn handle_create_jobs_bulk(
    State(state): State<AppState>,
    Json(req): Json<CreateJobsBulkRequest>,
) -> Result<(StatusCode, Json<Vec<JobRow>>), AppError> {
    if req.jobs.is_empty() {
        return Err(AppError::Validation("jobs must not be empty".to_string()));
    }
    for (i, job) in req.jobs.iter().enumerate() {
        job.validate().map_err(|e| match e {
            AppError::Validation(msg) => AppError::Validation(format!("jobs[{i}]: {msg}")),
            other => other,
        })?;
    }

    let new_jobs = req.jobs.into_iter().map(CreateJobRequest::into_new_job).collect();
    let jobs = state.jobs.create_bulk(new_jobs).await?;
    for job in &jobs {
        request_embedding(state.broker.as_ref(), job).await;
    }
    Ok((StatusCode::CREATED, Json(jobs)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.jobs.find_all().await?))
}

#[derive(Debug, Deserialize)]
pub struct RecommendedQuery {
    pub user_id: Uuid,
    /// Parsed leniently; anything that is not a positive integer falls
    /// back to the default.
    pub limit: Option<String>,
}

/// GET /api/v1/jobs/recommended
pub async fn handle_recommended(
    State(state): State<AppState>,
    Query(params): Query<RecommendedQuery>,
) -> Result<Json<Vec<RecommendedJob>>, AppError> {
    let limit = effective_limit(params.limit.as_deref());
    let recommended = recommend(
        state.jobs.as_ref(),
        state.profiles.as_ref(),
        params.user_id,
        limit,
    )
    .await?;
    Ok(Json(recommended))
}

#[derive(Debug, Deserialize)]
pub struct SearchByEmbeddingRequest {
    pub embedding: Vec<f64>,
}

/// POST /api/v1/jobs/search/embedding
pub async fn handle_search_by_embedding(
    State(state): State<AppState>,
    Json(req): Json<SearchByEmbeddingRequest>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    if req.embedding.is_empty() {
        return Err(AppError::Validation("embedding must not be empty".to_string()));
    }
    Ok(Json(state.jobs.find_by_embedding(&req.embedding).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = state
        .jobs
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = state
        .jobs
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}
