//! In-memory store used for tests and database-less runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::database::store::{
    AuditStore, CandidateStore, InterviewStore, JobStore, StaffDirectory, StoreError, StoreResult,
};
use crate::models::{
    audit_log::AuditLog, candidate::Candidate, experience::Experience, interview::Interview,
    job::Job, user::User,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    candidates: HashMap<Uuid, Candidate>,
    application_index: HashMap<String, Uuid>,
    interviews: HashMap<Uuid, Interview>,
    jobs: HashMap<String, Job>,
    experiences: Vec<Experience>,
    staff: HashMap<Uuid, User>,
    audit: Vec<AuditLog>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    /// Seeds a staff member; staff management lives outside this service.
    pub fn insert_staff(&self, user: User) -> StoreResult<()> {
        self.write()?.staff.insert(user.id, user);
        Ok(())
    }

    pub fn audit_entries(&self) -> StoreResult<Vec<AuditLog>> {
        Ok(self.read()?.audit.clone())
    }
}

fn bump(candidate: &Candidate, stored: &Candidate) -> StoreResult<Candidate> {
    if stored.version != candidate.version {
        return Err(StoreError::StaleVersion(candidate.id));
    }
    let mut next = candidate.clone();
    next.version = stored.version + 1;
    Ok(next)
}

#[async_trait]
impl CandidateStore for InMemoryStore {
    async fn get_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>> {
        Ok(self.read()?.candidates.get(&id).cloned())
    }

    async fn get_by_application_id(
        &self,
        application_id: &str,
    ) -> StoreResult<Option<Candidate>> {
        let state = self.read()?;
        Ok(state
            .application_index
            .get(application_id)
            .and_then(|id| state.candidates.get(id))
            .cloned())
    }

    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: &str,
    ) -> StoreResult<Option<Candidate>> {
        Ok(self
            .read()?
            .candidates
            .values()
            .find(|c| c.email == email && c.job_id == job_id)
            .cloned())
    }

    async fn create_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate> {
        let mut state = self.write()?;
        if state.application_index.contains_key(&candidate.application_id) {
            return Err(StoreError::Duplicate(format!(
                "application id {} already exists",
                candidate.application_id
            )));
        }
        if state
            .candidates
            .values()
            .any(|c| c.email == candidate.email && c.job_id == candidate.job_id)
        {
            return Err(StoreError::Duplicate(format!(
                "{} has already applied to job {}",
                candidate.email, candidate.job_id
            )));
        }
        state
            .application_index
            .insert(candidate.application_id.clone(), candidate.id);
        state.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn update_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate> {
        let mut state = self.write()?;
        let stored = state
            .candidates
            .get(&candidate.id)
            .ok_or_else(|| StoreError::NotFound(format!("candidate {}", candidate.id)))?;
        let next = bump(candidate, stored)?;
        state.candidates.insert(next.id, next.clone());
        Ok(next)
    }

    async fn delete_candidate(
        &self,
        id: Uuid,
        closed_interview: Option<&Interview>,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        let removed = state
            .candidates
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("candidate {}", id)))?;
        state.application_index.remove(&removed.application_id);
        if let Some(interview) = closed_interview {
            state.interviews.insert(interview.id, interview.clone());
        }
        Ok(())
    }

    async fn list_candidates_by_job(&self, job_id: &str) -> StoreResult<Vec<Candidate>> {
        let mut candidates: Vec<Candidate> = self
            .read()?
            .candidates
            .values()
            .filter(|c| c.job_id == job_id)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(candidates)
    }
}

#[async_trait]
impl InterviewStore for InMemoryStore {
    async fn get_interview(&self, id: Uuid) -> StoreResult<Option<Interview>> {
        Ok(self.read()?.interviews.get(&id).cloned())
    }

    async fn find_open_by_candidate(&self, candidate_id: Uuid) -> StoreResult<Option<Interview>> {
        Ok(self
            .read()?
            .interviews
            .values()
            .find(|i| i.candidate_id == candidate_id && i.is_open())
            .cloned())
    }

    async fn list_interviews_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> StoreResult<Vec<Interview>> {
        let mut interviews: Vec<Interview> = self
            .read()?
            .interviews
            .values()
            .filter(|i| i.candidate_id == candidate_id)
            .cloned()
            .collect();
        interviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(interviews)
    }

    async fn commit_interview(
        &self,
        candidate: &Candidate,
        interview: &Interview,
    ) -> StoreResult<Candidate> {
        let mut state = self.write()?;
        let stored = state
            .candidates
            .get(&candidate.id)
            .ok_or_else(|| StoreError::NotFound(format!("candidate {}", candidate.id)))?;
        let next = bump(candidate, stored)?;

        if interview.is_open()
            && state.interviews.values().any(|i| {
                i.candidate_id == interview.candidate_id && i.id != interview.id && i.is_open()
            })
        {
            return Err(StoreError::Duplicate(format!(
                "candidate {} already has an open interview",
                interview.candidate_id
            )));
        }

        state.interviews.insert(interview.id, interview.clone());
        state.candidates.insert(next.id, next.clone());
        Ok(next)
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn get_job(&self, job_id: &str) -> StoreResult<Option<Job>> {
        Ok(self.read()?.jobs.get(job_id).cloned())
    }

    async fn create_job(&self, job: &Job) -> StoreResult<Job> {
        let mut state = self.write()?;
        if state.jobs.contains_key(&job.job_id) {
            return Err(StoreError::Duplicate(format!(
                "job id {} already exists",
                job.job_id
            )));
        }
        state.jobs.insert(job.job_id.clone(), job.clone());
        Ok(job.clone())
    }

    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .read()?
            .jobs
            .values()
            .filter(|j| j.is_active)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn list_experiences(&self) -> StoreResult<Vec<Experience>> {
        let mut experiences = self.read()?.experiences.clone();
        experiences.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(experiences)
    }

    async fn create_experience(&self, experience: &Experience) -> StoreResult<Experience> {
        let mut state = self.write()?;
        if state
            .experiences
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(&experience.name))
        {
            return Err(StoreError::Duplicate(format!(
                "experience {} already exists",
                experience.name
            )));
        }
        state.experiences.push(experience.clone());
        Ok(experience.clone())
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStore {
    async fn find_staff(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.staff.get(&id).cloned())
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn record(&self, entry: &AuditLog) -> StoreResult<()> {
        self.write()?.audit.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateStatus;

    fn candidate() -> Candidate {
        let now = crate::utils::time::now();
        Candidate {
            id: Uuid::new_v4(),
            application_id: "APP-1-aaaaaaaaa".into(),
            job_id: "JOB00001".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            phone: None,
            cv_ref: "cv.pdf".into(),
            years_of_experience: None,
            expected_salary: None,
            notice_period: None,
            referred_by: None,
            core_experience: vec![],
            task_submission: None,
            evaluation: None,
            interview: None,
            final_selection: None,
            status: CandidateStatus::Applied,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn stale_write_is_rejected() {
        let store = InMemoryStore::new();
        let original = store.create_candidate(&candidate()).await.unwrap();

        let mut first = original.clone();
        first.status = CandidateStatus::TaskPending;
        let first = store.update_candidate(&first).await.unwrap();
        assert_eq!(first.version, 1);

        let mut stale = original;
        stale.status = CandidateStatus::Rejected;
        let err = store.update_candidate(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleVersion(_)));

        let stored = store.get_candidate(first.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CandidateStatus::TaskPending);
    }

    #[tokio::test]
    async fn duplicate_application_is_rejected() {
        let store = InMemoryStore::new();
        let first = candidate();
        store.create_candidate(&first).await.unwrap();

        let mut same_person = candidate();
        same_person.application_id = "APP-2-bbbbbbbbb".into();
        assert!(matches!(
            store.create_candidate(&same_person).await,
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.list_candidates_by_job("JOB00001").await.unwrap().len(), 1);
    }
}
