use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::UserProfileRow;

/// Store for user resume profiles. The resume embedding follows the same
/// consumer pattern as job embeddings: written only by the resume result
/// consumer, idempotently, last write wins.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfileRow>, AppError>;

    /// Creates the profile or updates its target job title.
    async fn upsert(&self, user_id: Uuid, job_title: &str) -> Result<UserProfileRow, AppError>;

    /// Keyed overwrite of the resume embedding. An unknown user is a
    /// reported `NotFound`, never a crash.
    async fn set_resume_embedding(&self, user_id: Uuid, embedding: &[f64])
        -> Result<(), AppError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfileRow>, AppError> {
        Ok(
            sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert(&self, user_id: Uuid, job_title: &str) -> Result<UserProfileRow, AppError> {
        Ok(sqlx::query_as::<_, UserProfileRow>(
            r#"
            INSERT INTO user_profiles (user_id, job_title)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET job_title = EXCLUDED.job_title, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(job_title)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn set_resume_embedding(
        &self,
        user_id: Uuid,
        embedding: &[f64],
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET resume_embedding = $2, updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(embedding)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Profile for user {user_id} not found"
            )));
        }
        Ok(())
    }
}
