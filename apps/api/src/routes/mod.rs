pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::jobs::handlers as job_handlers;
use crate::profile::handlers as profile_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job intake and accessors
        .route(
            "/api/v1/jobs",
            post(job_handlers::handle_create_job).get(job_handlers::handle_list_jobs),
        )
        .route("/api/v1/jobs/bulk", post(job_handlers::handle_create_jobs_bulk))
        .route(
            "/api/v1/jobs/recommended",
            get(job_handlers::handle_recommended),
        )
        .route(
            "/api/v1/jobs/search/embedding",
            post(job_handlers::handle_search_by_embedding),
        )
        .route(
            "/api/v1/jobs/:id",
            get(job_handlers::handle_get_job).delete(job_handlers::handle_delete_job),
        )
        // Resume profiles
        .route(
            "/api/v1/profiles",
            put(profile_handlers::handle_upsert_profile),
        )
        .route(
            "/api/v1/profiles/:user_id",
            get(profile_handlers::handle_get_profile),
        )
        .with_state(state)
}
