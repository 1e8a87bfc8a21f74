use std::sync::Arc;
use uuid::Uuid;

use crate::database::store::PipelineStore;
use crate::error::{Error, Result};
use crate::models::{experience::Experience, job::Job};
use crate::services::identity_service::{IdKind, IdentityService};
use crate::utils::{time, validation};

#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub task_link: Option<String>,
}

/// Job postings and the experience catalogue applicants pick from.
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn PipelineStore>,
    identity: IdentityService,
}

impl JobService {
    pub fn new(store: Arc<dyn PipelineStore>, identity: IdentityService) -> Self {
        Self { store, identity }
    }

    pub async fn create_job(&self, payload: NewJob) -> Result<Job> {
        let title = payload.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("Job title is required".into()));
        }
        let task_link = payload
            .task_link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        if let Some(link) = &task_link {
            validation::parse_web_url(link).map_err(Error::InvalidInput)?;
        }

        let store = self.store.clone();
        let job_id = self
            .identity
            .allocate(IdKind::Job, move |value| {
                let store = store.clone();
                async move { Ok::<bool, Error>(store.get_job(&value).await?.is_some()) }
            })
            .await?;

        let now = time::now();
        let job = self
            .store
            .create_job(&Job {
                id: Uuid::new_v4(),
                job_id,
                title,
                description: payload.description,
                location: payload.location,
                task_link,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(job_id = %job.job_id, title = %job.title, "job created");
        Ok(job)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.store
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", job_id)))
    }

    pub async fn list_active_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.store.list_active_jobs().await?)
    }

    pub async fn list_experiences(&self) -> Result<Vec<Experience>> {
        Ok(self.store.list_experiences().await?)
    }

    pub async fn create_experience(&self, name: &str) -> Result<Experience> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Experience name is required".into()));
        }
        let experience = self
            .store
            .create_experience(&Experience {
                id: Uuid::new_v4(),
                name: name.to_string(),
                is_active: true,
                created_at: time::now(),
            })
            .await?;
        Ok(experience)
    }
}
