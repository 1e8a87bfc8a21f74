use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus, InterviewSummary};
use crate::models::interview::{
    Interview, InterviewResult, InterviewStatus, InterviewType, ParseInterviewFieldError,
};
use crate::services::grading_service::GradingService;
use crate::services::notification_service::NotificationEvent;
use crate::services::pipeline_service::PipelineService;
use crate::utils::{time, validation};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
const MAX_DURATION_MINUTES: i32 = 8 * 60;

#[derive(Debug, Clone)]
pub struct ScheduleInterview {
    pub candidate_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer_id: Uuid,
    pub interview_type: InterviewType,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub duration_minutes: Option<i32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_future(at: DateTime<Utc>) -> Result<()> {
    if at <= time::now() {
        return Err(Error::InvalidInput(
            "Interview date must be in the future".into(),
        ));
    }
    Ok(())
}

fn ensure_pending(interview: &Interview, action: &str) -> Result<()> {
    if !interview.is_open() || interview.result != InterviewResult::Pending {
        tracing::warn!(
            interview_id = %interview.id,
            status = interview.status.as_str(),
            result = %interview.result,
            action,
            "interview transition rejected"
        );
        return Err(Error::InvalidState(format!(
            "Cannot {} an interview that is {} with result {}",
            action,
            interview.status.as_str(),
            interview.result
        )));
    }
    Ok(())
}

/// Interview sub-machine. Every change is committed together with the
/// candidate's mirrored summary and status.
impl PipelineService {
    pub async fn get_interview(&self, interview_id: Uuid) -> Result<Interview> {
        self.store
            .get_interview(interview_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", interview_id)))
    }

    pub async fn list_interviews(&self, candidate_id: Uuid) -> Result<Vec<Interview>> {
        Ok(self.store.list_interviews_by_candidate(candidate_id).await?)
    }

    async fn interviewer_name(&self, interview: &Interview, candidate: &Candidate) -> Result<Option<String>> {
        if let Some(summary) = candidate
            .interview
            .as_ref()
            .filter(|s| s.interview_id == interview.id && s.interviewer_id == interview.interviewer_id)
        {
            return Ok(summary.interviewer_name.clone());
        }
        Ok(self
            .store
            .find_staff(interview.interviewer_id)
            .await?
            .map(|staff| staff.name))
    }

    pub async fn schedule_interview(
        &self,
        request: ScheduleInterview,
        scheduler_id: Uuid,
    ) -> Result<Interview> {
        ensure_future(request.scheduled_at)?;
        let duration_minutes = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(Error::InvalidInput(format!(
                "Duration must be between 1 and {} minutes",
                MAX_DURATION_MINUTES
            )));
        }
        let meeting_link = non_blank(request.meeting_link);
        if let Some(link) = &meeting_link {
            validation::parse_web_url(link).map_err(Error::InvalidInput)?;
        }

        let candidate_id = request.candidate_id;
        let _guard = self.locks.acquire(candidate_id).await?;
        let mut candidate = self.load(candidate_id).await?;

        // An open interview wins over the status guard: a second schedule reports conflict.
        if let Some(open) = self.store.find_open_by_candidate(candidate_id).await? {
            tracing::warn!(%candidate_id, interview_id = %open.id, "candidate already has an open interview");
            return Err(Error::Conflict(format!(
                "Candidate already has an open interview ({})",
                open.id
            )));
        }
        if !candidate.status.accepts_interview() {
            tracing::warn!(%candidate_id, status = %candidate.status, "interview scheduling rejected");
            return Err(Error::InvalidState(format!(
                "Interviews can only be scheduled for eligible or shortlisted candidates; candidate is {}",
                candidate.status
            )));
        }
        let interviewer = self
            .store
            .find_staff(request.interviewer_id)
            .await?
            .filter(|staff| staff.is_active)
            .ok_or_else(|| {
                Error::NotFound(format!("Interviewer {} not found", request.interviewer_id))
            })?;

        let now = time::now();
        let interview = Interview {
            id: Uuid::new_v4(),
            candidate_id,
            job_id: candidate.job_id.clone(),
            scheduled_at: request.scheduled_at,
            duration_minutes,
            interviewer_id: interviewer.id,
            scheduled_by: scheduler_id,
            interview_type: request.interview_type,
            location: non_blank(request.location),
            meeting_link,
            status: InterviewStatus::Scheduled,
            result: InterviewResult::Pending,
            feedback: None,
            score: None,
            completed_at: None,
            completed_by: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            rescheduled_at: None,
            rescheduled_by: None,
            reschedule_notes: None,
            previous_scheduled_at: None,
            rescheduled_from: None,
            created_at: now,
            updated_at: now,
        };

        candidate.interview = Some(InterviewSummary::project(
            &interview,
            Some(interviewer.name.clone()),
        ));
        candidate.status = CandidateStatus::InterviewScheduled;
        candidate.updated_at = now;
        let candidate = self.store.commit_interview(&candidate, &interview).await?;

        tracing::info!(
            %candidate_id,
            interview_id = %interview.id,
            interviewer = %interviewer.id,
            scheduled_at = %interview.scheduled_at,
            "interview scheduled"
        );
        self.notifications.dispatch(
            NotificationEvent::InterviewScheduled,
            &candidate,
            json!({
                "application_id": candidate.application_id,
                "interview_id": interview.id,
                "scheduled_at": interview.scheduled_at,
                "duration_minutes": interview.duration_minutes,
                "interviewer_name": interviewer.name,
                "interview_type": interview.interview_type,
                "location": interview.location,
                "meeting_link": interview.meeting_link,
                "rescheduled": false,
            }),
        );
        Ok(interview)
    }

    /// Loads the interview, then re-reads it under its candidate's lock.
    async fn lock_interview(
        &self,
        interview_id: Uuid,
    ) -> Result<(tokio::sync::OwnedMutexGuard<()>, Interview, Candidate)> {
        let candidate_id = self.get_interview(interview_id).await?.candidate_id;
        let guard = self.locks.acquire(candidate_id).await?;
        let interview = self.get_interview(interview_id).await?;
        let candidate = self.load(candidate_id).await?;
        Ok((guard, interview, candidate))
    }

    pub async fn reschedule_interview(
        &self,
        interview_id: Uuid,
        new_date: DateTime<Utc>,
        notes: Option<String>,
        actor_id: Uuid,
    ) -> Result<Interview> {
        ensure_future(new_date)?;

        let (_guard, mut interview, mut candidate) = self.lock_interview(interview_id).await?;
        ensure_pending(&interview, "reschedule")?;
        if candidate.status.is_terminal() {
            tracing::warn!(%interview_id, status = %candidate.status, "reschedule rejected");
            return Err(Error::InvalidState(format!(
                "Cannot reschedule an interview for a candidate who is {}",
                candidate.status
            )));
        }

        let now = time::now();
        interview.previous_scheduled_at = Some(interview.scheduled_at);
        interview.scheduled_at = new_date;
        interview.status = InterviewStatus::Rescheduled;
        interview.rescheduled_at = Some(now);
        interview.rescheduled_by = Some(actor_id);
        interview.reschedule_notes = non_blank(notes);
        interview.updated_at = now;

        let interviewer_name = self.interviewer_name(&interview, &candidate).await?;
        candidate.interview = Some(InterviewSummary::project(
            &interview,
            interviewer_name.clone(),
        ));
        candidate.updated_at = now;
        let candidate = self.store.commit_interview(&candidate, &interview).await?;

        tracing::info!(
            candidate_id = %candidate.id,
            %interview_id,
            scheduled_at = %new_date,
            "interview rescheduled"
        );
        self.notifications.dispatch(
            NotificationEvent::InterviewScheduled,
            &candidate,
            json!({
                "application_id": candidate.application_id,
                "interview_id": interview.id,
                "scheduled_at": interview.scheduled_at,
                "previous_scheduled_at": interview.previous_scheduled_at,
                "duration_minutes": interview.duration_minutes,
                "interviewer_name": interviewer_name,
                "interview_type": interview.interview_type,
                "location": interview.location,
                "meeting_link": interview.meeting_link,
                "rescheduled": true,
            }),
        );
        Ok(interview)
    }

    pub async fn cancel_interview(
        &self,
        interview_id: Uuid,
        reason: Option<String>,
        actor_id: Uuid,
    ) -> Result<Interview> {
        let (_guard, mut interview, mut candidate) = self.lock_interview(interview_id).await?;
        ensure_pending(&interview, "cancel")?;

        let now = time::now();
        interview.status = InterviewStatus::Cancelled;
        interview.cancelled_at = Some(now);
        interview.cancelled_by = Some(actor_id);
        interview.cancellation_reason = non_blank(reason);
        interview.updated_at = now;

        candidate.interview = None;
        if !candidate.status.is_terminal() {
            candidate.status = CandidateStatus::InterviewEligible;
        }
        candidate.updated_at = now;
        let candidate = self.store.commit_interview(&candidate, &interview).await?;

        tracing::info!(
            candidate_id = %candidate.id,
            %interview_id,
            actor = %actor_id,
            status = %candidate.status,
            "interview cancelled"
        );
        Ok(interview)
    }

    pub async fn complete_interview(
        &self,
        interview_id: Uuid,
        result: &str,
        feedback: Option<String>,
        score: Option<i32>,
        actor_id: Uuid,
    ) -> Result<Interview> {
        let result: InterviewResult = result
            .parse()
            .map_err(|e: ParseInterviewFieldError| Error::InvalidInput(e.to_string()))?;
        if result == InterviewResult::Pending {
            return Err(Error::InvalidInput(
                "An interview cannot be completed with a pending result".into(),
            ));
        }
        let score = score
            .map(|s| {
                GradingService::check_score(s).ok_or_else(|| {
                    Error::InvalidInput(format!("Score must be between 0 and 100, got {}", s))
                })
            })
            .transpose()?;

        let (_guard, mut interview, mut candidate) = self.lock_interview(interview_id).await?;
        if !interview.is_open() {
            tracing::warn!(%interview_id, status = interview.status.as_str(), "completion rejected");
            return Err(Error::InvalidState(format!(
                "Cannot complete an interview that is {}",
                interview.status.as_str()
            )));
        }

        let now = time::now();
        interview.status = InterviewStatus::Completed;
        interview.result = result;
        interview.feedback = non_blank(feedback);
        interview.score = score;
        interview.completed_at = Some(now);
        interview.completed_by = Some(actor_id);
        interview.updated_at = now;

        let interviewer_name = self.interviewer_name(&interview, &candidate).await?;
        candidate.interview = Some(InterviewSummary::project(&interview, interviewer_name));
        // Selected and rejected stick; the interview still gets its outcome.
        if !candidate.status.is_terminal() {
            candidate.status = GradingService::status_after_interview(result);
        }
        candidate.updated_at = now;
        let candidate = self.store.commit_interview(&candidate, &interview).await?;

        tracing::info!(
            candidate_id = %candidate.id,
            %interview_id,
            result = %result,
            status = %candidate.status,
            "interview completed"
        );
        Ok(interview)
    }
}
