use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::{Applicant, Candidate, CandidateStatus, TaskLink};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub cv_ref: String,
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: Option<i32>,
    pub expected_salary: Option<Decimal>,
    pub notice_period: Option<String>,
    pub referred_by: Option<Uuid>,
    #[serde(default)]
    pub core_experience: Vec<Uuid>,
}

impl ApplyPayload {
    pub fn into_parts(self) -> (Applicant, String) {
        let applicant = Applicant {
            name: self.name,
            email: self.email,
            phone: self.phone,
            years_of_experience: self.years_of_experience,
            expected_salary: self.expected_salary,
            notice_period: self.notice_period,
            referred_by: self.referred_by,
            core_experience: self.core_experience,
        };
        (applicant, self.cv_ref)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitTaskPayload {
    #[validate(length(min = 1, max = 10))]
    pub links: Vec<TaskLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluatePayload {
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    #[validate(length(max = 5000))]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SelectionPayload {
    pub selected: bool,
    #[validate(length(min = 1, max = 500))]
    pub offer_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateListQuery {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateListResponse {
    pub items: Vec<Candidate>,
    pub total: usize,
}

impl From<Vec<Candidate>> for CandidateListResponse {
    fn from(items: Vec<Candidate>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// What an applicant may see about their own application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusResponse {
    pub application_id: String,
    pub job_id: String,
    pub name: String,
    pub status: CandidateStatus,
    pub task_submitted_at: Option<DateTime<Utc>>,
    pub interview_at: Option<DateTime<Utc>>,
    pub interview_location: Option<String>,
    pub meeting_link: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Candidate> for ApplicationStatusResponse {
    fn from(c: Candidate) -> Self {
        let interview = c.interview.filter(|i| i.completed_at.is_none());
        Self {
            application_id: c.application_id,
            job_id: c.job_id,
            name: c.name,
            status: c.status,
            task_submitted_at: c.task_submission.map(|t| t.submitted_at),
            interview_at: interview.as_ref().map(|i| i.scheduled_at),
            interview_location: interview.as_ref().and_then(|i| i.location.clone()),
            meeting_link: interview.and_then(|i| i.meeting_link),
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub application_id: String,
    pub status: CandidateStatus,
}

impl From<Candidate> for ApplyResponse {
    fn from(c: Candidate) -> Self {
        Self {
            application_id: c.application_id,
            status: c.status,
        }
    }
}
