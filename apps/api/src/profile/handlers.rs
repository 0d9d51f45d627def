use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::UserProfileRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: Uuid,
    pub job_title: String,
}

/// PUT /api/v1/profiles
///
/// Minimal profile intake: user identity and registration belong to an
/// external collaborator, but ranking needs a profile with a target job
/// title to resolve.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<UserProfileRow>, AppError> {
    let job_title = req.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("job_title must not be empty".to_string()));
    }
    Ok(Json(state.profiles.upsert(req.user_id, job_title).await?))
}

/// GET /api/v1/profiles/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfileRow>, AppError> {
    let profile = state
        .profiles
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id} not found")))?;
    Ok(Json(profile))
}
