//! In-memory doubles for the store traits plus row fixtures. Test-only;
//! the production stores live in `jobs::store` and `profile::store`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::{JobStore, STALE_PENDING_ERROR};
use crate::models::job::{JobRow, JobStatus, NewJob};
use crate::models::profile::UserProfileRow;
use crate::profile::store::ProfileStore;

pub fn job_row(title: &str, embedding: Vec<f64>) -> JobRow {
    let now = Utc::now();
    JobRow {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: "Design and build the services behind the product".to_string(),
        company: "Acme".to_string(),
        apply_url: None,
        embedding,
        status: JobStatus::Pending,
        error: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryJobStore {
    rows: Mutex<Vec<JobRow>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pending row directly, with a creation time strictly after
    /// every previously seeded row so ordering is deterministic.
    pub fn seed(&self, title: &str, embedding: Vec<f64>) -> JobRow {
        let mut rows = self.rows.lock().unwrap();
        let mut row = job_row(title, embedding);
        row.created_at = row.created_at + Duration::seconds(rows.len() as i64);
        row.updated_at = row.created_at;
        rows.push(row.clone());
        row
    }

    pub fn get(&self, id: Uuid) -> JobRow {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .expect("job not seeded")
    }

    pub fn all(&self) -> Vec<JobRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError> {
        let mut row = job_row(&job.title, vec![]);
        row.description = job.description;
        row.company = job.company;
        row.apply_url = job.apply_url;
        let mut rows = self.rows.lock().unwrap();
        row.created_at = row.created_at + Duration::seconds(rows.len() as i64);
        rows.push(row.clone());
        Ok(row)
    }

    async fn create_bulk(&self, jobs: Vec<NewJob>) -> Result<Vec<JobRow>, AppError> {
        let mut created = Vec::with_capacity(jobs.len());
        for job in jobs {
            created.push(self.create(job).await?);
        }
        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(self.all())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_embedding(&self, embedding: &[f64]) -> Result<Vec<JobRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.embedding == embedding)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let position = rows.iter().position(|r| r.id == id);
        Ok(position.map(|i| rows.remove(i)))
    }

    async fn completed_with_embedding(&self) -> Result<Vec<JobRow>, AppError> {
        let mut rows: Vec<JobRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == JobStatus::Completed && !r.embedding.is_empty())
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn apply_embedding_result(&self, id: Uuid, embedding: &[f64]) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
        row.embedding = embedding.to_vec();
        row.status = JobStatus::Completed;
        row.error = None;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = JobStatus::Failed;
            row.error = Some(error.to_string());
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn fail_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut reaped = 0;
        for row in rows
            .iter_mut()
            .filter(|r| r.status == JobStatus::Pending && r.created_at < cutoff)
        {
            row.status = JobStatus::Failed;
            row.error = Some(STALE_PENDING_ERROR.to_string());
            reaped += 1;
        }
        Ok(reaped)
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, UserProfileRow>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, job_title: &str, resume_embedding: Option<Vec<f64>>) -> Uuid {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        self.profiles.lock().unwrap().insert(
            user_id,
            UserProfileRow {
                user_id,
                job_title: job_title.to_string(),
                resume_embedding,
                created_at: now,
                updated_at: now,
            },
        );
        user_id
    }

    pub fn get(&self, user_id: Uuid) -> UserProfileRow {
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .expect("profile not seeded")
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfileRow>, AppError> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert(&self, user_id: Uuid, job_title: &str) -> Result<UserProfileRow, AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        let now = Utc::now();
        let profile = profiles
            .entry(user_id)
            .and_modify(|p| {
                p.job_title = job_title.to_string();
                p.updated_at = now;
            })
            .or_insert_with(|| UserProfileRow {
                user_id,
                job_title: job_title.to_string(),
                resume_embedding: None,
                created_at: now,
                updated_at: now,
            });
        Ok(profile.clone())
    }

    async fn set_resume_embedding(
        &self,
        user_id: Uuid,
        embedding: &[f64],
    ) -> Result<(), AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.get_mut(&user_id).ok_or_else(|| {
            AppError::NotFound(format!("Profile for user {user_id} not found"))
        })?;
        profile.resume_embedding = Some(embedding.to_vec());
        profile.updated_at = Utc::now();
        Ok(())
    }
}
