use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job::Job;
use crate::services::job_service::NewJob;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(url)]
    pub task_link: Option<String>,
}

impl From<CreateJobPayload> for NewJob {
    fn from(p: CreateJobPayload) -> Self {
        Self {
            title: p.title,
            description: p.description,
            location: p.location,
            task_link: p.task_link,
        }
    }
}

/// Job as listed to applicants. The task link is only sent after applying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicJobSummary {
    pub job_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for PublicJobSummary {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            title: job.title,
            description: job.description,
            location: job.location,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicJobListResponse {
    pub items: Vec<PublicJobSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExperiencePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}
