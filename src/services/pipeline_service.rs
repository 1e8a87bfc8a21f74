use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::store::PipelineStore;
use crate::error::{Error, Result};
use crate::models::candidate::{
    normalize_email, Applicant, Candidate, CandidateStatus, Evaluation, FinalSelection,
    TaskLink, TaskSubmission,
};
use crate::models::interview::InterviewStatus;
use crate::services::audit_service::AuditService;
use crate::services::grading_service::GradingService;
use crate::services::identity_service::{IdKind, IdentityService};
use crate::services::lock_service::CandidateLocks;
use crate::services::notification_service::{NotificationEvent, NotificationService};
use crate::utils::{time, validation};

pub const MAX_TASK_LINKS: usize = 10;

/// Owns every state change of a candidate application. Each operation takes
/// the candidate lock, re-reads the record, checks the transition and
/// commits before any notification goes out.
#[derive(Clone)]
pub struct PipelineService {
    pub(crate) store: Arc<dyn PipelineStore>,
    pub(crate) notifications: NotificationService,
    pub(crate) identity: IdentityService,
    pub(crate) audit: AuditService,
    pub(crate) locks: CandidateLocks,
}

impl PipelineService {
    pub fn new(
        store: Arc<dyn PipelineStore>,
        notifications: NotificationService,
        identity: IdentityService,
    ) -> Self {
        Self {
            audit: AuditService::new(store.clone()),
            store,
            notifications,
            identity,
            locks: CandidateLocks::new(),
        }
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub(crate) async fn load(&self, candidate_id: Uuid) -> Result<Candidate> {
        self.store
            .get_candidate(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", candidate_id)))
    }

    pub async fn get_candidate(&self, candidate_id: Uuid) -> Result<Candidate> {
        self.load(candidate_id).await
    }

    pub async fn get_by_application_id(&self, application_id: &str) -> Result<Candidate> {
        self.store
            .get_by_application_id(application_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))
    }

    pub async fn list_by_job(&self, job_id: &str) -> Result<Vec<Candidate>> {
        Ok(self.store.list_candidates_by_job(job_id).await?)
    }

    pub async fn intake(
        &self,
        job_id: &str,
        applicant: Applicant,
        cv_ref: Option<String>,
    ) -> Result<Candidate> {
        let cv_ref = cv_ref
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("A CV is required".into()))?;
        let name = applicant.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Name is required".into()));
        }
        let email = normalize_email(&applicant.email);
        if !validation::is_valid_email(&email) {
            return Err(Error::InvalidInput(format!(
                "Invalid email address: {}",
                applicant.email
            )));
        }
        if applicant.years_of_experience.is_some_and(|y| y < 0) {
            return Err(Error::InvalidInput(
                "Years of experience cannot be negative".into(),
            ));
        }
        if applicant.expected_salary.is_some_and(|s| s.is_sign_negative()) {
            return Err(Error::InvalidInput(
                "Expected salary cannot be negative".into(),
            ));
        }

        let job = self
            .store
            .get_job(job_id)
            .await?
            .filter(|job| job.is_active)
            .ok_or_else(|| Error::NotFound(format!("Job {} not found or inactive", job_id)))?;

        if self
            .store
            .find_by_email_and_job(&email, &job.job_id)
            .await?
            .is_some()
        {
            tracing::warn!(job_id = %job.job_id, "duplicate application rejected");
            return Err(Error::Conflict(format!(
                "{} has already applied to job {}",
                email, job.job_id
            )));
        }

        let store = self.store.clone();
        let application_id = self
            .identity
            .allocate(IdKind::Application, move |value| {
                let store = store.clone();
                async move {
                    Ok::<bool, Error>(
                        store
                            .get_by_application_id(&value)
                            .await?
                            .is_some(),
                    )
                }
            })
            .await?;

        let now = time::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            application_id,
            job_id: job.job_id.clone(),
            name,
            email,
            phone: applicant.phone.filter(|p| !p.trim().is_empty()),
            cv_ref,
            years_of_experience: applicant.years_of_experience,
            expected_salary: applicant.expected_salary,
            notice_period: applicant.notice_period,
            referred_by: applicant.referred_by,
            core_experience: applicant.core_experience,
            task_submission: None,
            evaluation: None,
            interview: None,
            final_selection: None,
            status: CandidateStatus::Applied,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let candidate = self.store.create_candidate(&candidate).await?;

        tracing::info!(
            candidate_id = %candidate.id,
            application_id = %candidate.application_id,
            job_id = %candidate.job_id,
            "application received"
        );
        self.notifications.dispatch(
            NotificationEvent::ApplicationReceived,
            &candidate,
            json!({
                "application_id": candidate.application_id,
                "job_id": job.job_id,
                "job_title": job.title,
                "task_link": job.task_link,
            }),
        );
        Ok(candidate)
    }

    pub async fn submit_task(&self, application_id: &str, links: Vec<TaskLink>) -> Result<Candidate> {
        if links.is_empty() {
            return Err(Error::InvalidInput("At least one link is required".into()));
        }
        if links.len() > MAX_TASK_LINKS {
            return Err(Error::InvalidInput(format!(
                "At most {} links may be submitted",
                MAX_TASK_LINKS
            )));
        }
        let links = links
            .into_iter()
            .map(|link| {
                validation::parse_web_url(&link.url)
                    .map(|_| TaskLink {
                        kind: link.kind,
                        url: link.url.trim().to_string(),
                    })
                    .map_err(Error::InvalidInput)
            })
            .collect::<Result<Vec<_>>>()?;

        let candidate_id = self.get_by_application_id(application_id).await?.id;
        let _guard = self.locks.acquire(candidate_id).await?;
        let mut candidate = self.load(candidate_id).await?;

        if !candidate.status.accepts_task_submission() {
            tracing::warn!(%candidate_id, status = %candidate.status, "task submission rejected");
            return Err(Error::InvalidState(format!(
                "Task cannot be submitted while the application is {}",
                candidate.status
            )));
        }

        let now = time::now();
        let link_count = links.len();
        candidate.task_submission = Some(TaskSubmission {
            links,
            submitted_at: now,
        });
        candidate.status = CandidateStatus::TaskSubmitted;
        candidate.updated_at = now;
        let candidate = self.store.update_candidate(&candidate).await?;

        tracing::info!(%candidate_id, link_count, "task submitted");
        self.notifications.dispatch(
            NotificationEvent::TaskSubmitted,
            &candidate,
            json!({
                "application_id": candidate.application_id,
                "link_count": link_count,
                "submitted_at": now,
            }),
        );
        Ok(candidate)
    }

    pub async fn evaluate(
        &self,
        candidate_id: Uuid,
        score: i32,
        comments: Option<String>,
        evaluator_id: Uuid,
    ) -> Result<Candidate> {
        let score = GradingService::check_score(score).ok_or_else(|| {
            Error::InvalidInput(format!("Score must be between 0 and 100, got {}", score))
        })?;

        let _guard = self.locks.acquire(candidate_id).await?;
        let mut candidate = self.load(candidate_id).await?;
        if candidate.status != CandidateStatus::TaskSubmitted {
            tracing::warn!(%candidate_id, status = %candidate.status, "evaluation rejected");
            return Err(Error::InvalidState(format!(
                "Only submitted tasks can be evaluated; candidate is {}",
                candidate.status
            )));
        }

        let now = time::now();
        candidate.evaluation = Some(Evaluation {
            score,
            evaluated_by: evaluator_id,
            evaluated_at: now,
            comments: comments.filter(|c| !c.trim().is_empty()),
        });
        candidate.status = GradingService::derive_status(score);
        candidate.updated_at = now;
        let candidate = self.store.update_candidate(&candidate).await?;

        tracing::info!(
            %candidate_id,
            score,
            evaluator = %evaluator_id,
            status = %candidate.status,
            "candidate evaluated"
        );
        Ok(candidate)
    }

    /// Administrative override: no transition guard, always audited.
    pub async fn set_status(
        &self,
        candidate_id: Uuid,
        new_status: &str,
        actor_id: Uuid,
    ) -> Result<Candidate> {
        let status: CandidateStatus = new_status
            .parse()
            .map_err(|e: crate::models::candidate::ParseStatusError| {
                Error::InvalidInput(e.to_string())
            })?;

        let _guard = self.locks.acquire(candidate_id).await?;
        let mut candidate = self.load(candidate_id).await?;
        let previous = candidate.status;
        candidate.status = status;
        candidate.updated_at = time::now();
        let candidate = self.store.update_candidate(&candidate).await?;

        self.audit
            .log_committed(
                actor_id,
                "candidate.status_override",
                candidate_id,
                json!({ "from": previous, "to": status }),
            )
            .await;
        Ok(candidate)
    }

    pub async fn finalize_selection(
        &self,
        candidate_id: Uuid,
        selected: bool,
        offer_letter: Option<String>,
        actor_id: Uuid,
    ) -> Result<Candidate> {
        let _guard = self.locks.acquire(candidate_id).await?;
        let mut candidate = self.load(candidate_id).await?;
        if candidate.status.is_terminal() {
            tracing::warn!(%candidate_id, status = %candidate.status, "selection rejected");
            return Err(Error::InvalidState(format!(
                "Candidate has already been {}",
                candidate.status
            )));
        }

        let now = time::now();
        let offer_letter = offer_letter.filter(|o| !o.trim().is_empty());
        candidate.final_selection = Some(FinalSelection {
            selected,
            offer_letter: offer_letter.clone(),
            selected_by: actor_id,
            selected_at: now,
        });
        candidate.status = if selected {
            CandidateStatus::Selected
        } else {
            CandidateStatus::Rejected
        };
        candidate.updated_at = now;

        // A decision closes any interview still on the calendar.
        let candidate = match self.store.find_open_by_candidate(candidate_id).await? {
            Some(mut interview) => {
                interview.status = InterviewStatus::Cancelled;
                interview.cancelled_at = Some(now);
                interview.cancelled_by = Some(actor_id);
                interview.cancellation_reason =
                    Some(format!("candidate {}", candidate.status));
                interview.updated_at = now;
                candidate.interview = None;
                tracing::info!(%candidate_id, interview_id = %interview.id, "open interview closed by final decision");
                self.store.commit_interview(&candidate, &interview).await?
            }
            None => self.store.update_candidate(&candidate).await?,
        };

        self.audit
            .log_committed(
                actor_id,
                "candidate.final_selection",
                candidate_id,
                json!({ "selected": selected, "offer_letter": offer_letter }),
            )
            .await;

        let event = if selected {
            NotificationEvent::Selected
        } else {
            NotificationEvent::Rejected
        };
        self.notifications.dispatch(
            event,
            &candidate,
            json!({
                "application_id": candidate.application_id,
                "offer_letter": offer_letter,
            }),
        );
        Ok(candidate)
    }

    /// Hard delete outside the state machine. Interviews are kept; an open
    /// one is cancelled along with the delete.
    pub async fn delete_candidate(&self, candidate_id: Uuid, actor_id: Uuid) -> Result<()> {
        let _guard = self.locks.acquire(candidate_id).await?;
        let candidate = self.load(candidate_id).await?;

        let closed = self
            .store
            .find_open_by_candidate(candidate_id)
            .await?
            .map(|mut interview| {
                let now = time::now();
                interview.status = InterviewStatus::Cancelled;
                interview.cancelled_at = Some(now);
                interview.cancelled_by = Some(actor_id);
                interview.cancellation_reason = Some("candidate deleted".into());
                interview.updated_at = now;
                interview
            });
        self.store
            .delete_candidate(candidate_id, closed.as_ref())
            .await?;
        if let Some(interview) = &closed {
            tracing::info!(%candidate_id, interview_id = %interview.id, "open interview closed by delete");
        }

        self.audit
            .log_committed(
                actor_id,
                "candidate.delete",
                candidate_id,
                json!({
                    "application_id": candidate.application_id,
                    "status": candidate.status,
                    "cancelled_interview": closed.as_ref().map(|i| i.id),
                }),
            )
            .await;
        Ok(())
    }
}
