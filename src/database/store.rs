//! Persistence contracts used by the pipeline engine.
//!
//! Implementations live in [`super::memory`] and [`super::postgres`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    audit_log::AuditLog,
    candidate::Candidate,
    experience::Experience,
    interview::Interview,
    job::Job,
    user::User,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    /// The candidate was written by someone else since it was read.
    #[error("stale version for candidate {0}")]
    StaleVersion(Uuid),

    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>>;

    async fn get_by_application_id(&self, application_id: &str)
        -> StoreResult<Option<Candidate>>;

    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: &str,
    ) -> StoreResult<Option<Candidate>>;

    /// Inserts a new candidate.
    ///
    /// Returns [`StoreError::Duplicate`] when the application id or the
    /// (email, job) pair is already taken.
    async fn create_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate>;

    /// Writes `candidate` if the stored version still equals
    /// `candidate.version`, and returns it with the version bumped.
    async fn update_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate>;

    /// Removes the candidate. `closed_interview`, when given, is written in
    /// the same unit so no interview is left open for a missing candidate.
    async fn delete_candidate(
        &self,
        id: Uuid,
        closed_interview: Option<&Interview>,
    ) -> StoreResult<()>;

    async fn list_candidates_by_job(&self, job_id: &str) -> StoreResult<Vec<Candidate>>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get_interview(&self, id: Uuid) -> StoreResult<Option<Interview>>;

    async fn find_open_by_candidate(&self, candidate_id: Uuid) -> StoreResult<Option<Interview>>;

    async fn list_interviews_by_candidate(&self, candidate_id: Uuid)
        -> StoreResult<Vec<Interview>>;

    /// Upserts `interview` and applies the versioned candidate update as one
    /// unit. Either both writes land or neither does.
    async fn commit_interview(
        &self,
        candidate: &Candidate,
        interview: &Interview,
    ) -> StoreResult<Candidate>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, job_id: &str) -> StoreResult<Option<Job>>;

    async fn create_job(&self, job: &Job) -> StoreResult<Job>;

    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>>;

    async fn list_experiences(&self) -> StoreResult<Vec<Experience>>;

    async fn create_experience(&self, experience: &Experience) -> StoreResult<Experience>;
}

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn find_staff(&self, id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, entry: &AuditLog) -> StoreResult<()>;
}

/// Everything the pipeline needs from storage, behind one handle.
pub trait PipelineStore:
    CandidateStore + InterviewStore + JobStore + StaffDirectory + AuditStore
{
}

impl<T> PipelineStore for T where
    T: CandidateStore + InterviewStore + JobStore + StaffDirectory + AuditStore
{
}
