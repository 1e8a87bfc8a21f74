use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::store::{
    AuditStore, CandidateStore, InterviewStore, JobStore, StaffDirectory, StoreError, StoreResult,
};
use crate::models::{
    audit_log::AuditLog,
    candidate::{Candidate, Evaluation, FinalSelection, InterviewSummary, TaskSubmission},
    experience::Experience,
    interview::Interview,
    job::Job,
    user::User,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

const CANDIDATE_COLUMNS: &str = r#"
    id, application_id, job_id, name, email, phone, cv_ref, years_of_experience,
    expected_salary, notice_period, referred_by, core_experience, task_submission,
    evaluation, interview, final_selection, status, version, created_at, updated_at
"#;

#[derive(FromRow)]
struct CandidateRow {
    id: Uuid,
    application_id: String,
    job_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    cv_ref: String,
    years_of_experience: Option<i32>,
    expected_salary: Option<Decimal>,
    notice_period: Option<String>,
    referred_by: Option<Uuid>,
    core_experience: Vec<Uuid>,
    task_submission: Option<Json<TaskSubmission>>,
    evaluation: Option<Json<Evaluation>>,
    interview: Option<Json<InterviewSummary>>,
    final_selection: Option<Json<FinalSelection>>,
    status: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = StoreError;

    fn try_from(row: CandidateRow) -> StoreResult<Self> {
        Ok(Self {
            status: row
                .status
                .parse()
                .map_err(|e: crate::models::candidate::ParseStatusError| {
                    StoreError::Backend(e.to_string())
                })?,
            id: row.id,
            application_id: row.application_id,
            job_id: row.job_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            cv_ref: row.cv_ref,
            years_of_experience: row.years_of_experience,
            expected_salary: row.expected_salary,
            notice_period: row.notice_period,
            referred_by: row.referred_by,
            core_experience: row.core_experience,
            task_submission: row.task_submission.map(|j| j.0),
            evaluation: row.evaluation.map(|j| j.0),
            interview: row.interview.map(|j| j.0),
            final_selection: row.final_selection.map(|j| j.0),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const INTERVIEW_COLUMNS: &str = r#"
    id, candidate_id, job_id, scheduled_at, duration_minutes, interviewer_id, scheduled_by,
    interview_type, location, meeting_link, status, result, feedback, score, completed_at,
    completed_by, cancelled_at, cancelled_by, cancellation_reason, rescheduled_at,
    rescheduled_by, reschedule_notes, previous_scheduled_at, rescheduled_from, created_at,
    updated_at
"#;

#[derive(FromRow)]
struct InterviewRow {
    id: Uuid,
    candidate_id: Uuid,
    job_id: String,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    interviewer_id: Uuid,
    scheduled_by: Uuid,
    interview_type: String,
    location: Option<String>,
    meeting_link: Option<String>,
    status: String,
    result: String,
    feedback: Option<String>,
    score: Option<i16>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<Uuid>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<Uuid>,
    cancellation_reason: Option<String>,
    rescheduled_at: Option<DateTime<Utc>>,
    rescheduled_by: Option<Uuid>,
    reschedule_notes: Option<String>,
    previous_scheduled_at: Option<DateTime<Utc>>,
    rescheduled_from: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = StoreError;

    fn try_from(row: InterviewRow) -> StoreResult<Self> {
        let backend = |e: crate::models::interview::ParseInterviewFieldError| {
            StoreError::Backend(e.to_string())
        };
        Ok(Self {
            interview_type: row.interview_type.parse().map_err(backend)?,
            status: row.status.parse().map_err(backend)?,
            result: row.result.parse().map_err(backend)?,
            score: row.score.and_then(|s| u8::try_from(s).ok()),
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            interviewer_id: row.interviewer_id,
            scheduled_by: row.scheduled_by,
            location: row.location,
            meeting_link: row.meeting_link,
            feedback: row.feedback,
            completed_at: row.completed_at,
            completed_by: row.completed_by,
            cancelled_at: row.cancelled_at,
            cancelled_by: row.cancelled_by,
            cancellation_reason: row.cancellation_reason,
            rescheduled_at: row.rescheduled_at,
            rescheduled_by: row.rescheduled_by,
            reschedule_notes: row.reschedule_notes,
            previous_scheduled_at: row.previous_scheduled_at,
            rescheduled_from: row.rescheduled_from,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

async fn upsert_interview<'e, E: PgExecutor<'e>>(
    executor: E,
    interview: &Interview,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO interviews (
            id, candidate_id, job_id, scheduled_at, duration_minutes, interviewer_id,
            scheduled_by, interview_type, location, meeting_link, status, result, feedback,
            score, completed_at, completed_by, cancelled_at, cancelled_by,
            cancellation_reason, rescheduled_at, rescheduled_by, reschedule_notes,
            previous_scheduled_at, rescheduled_from, created_at, updated_at
        ) VALUES (
            $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,
            $14,$15,$16,$17,$18,$19,$20,$21,$22,$23,$24,$25,$26
        )
        ON CONFLICT (id) DO UPDATE SET
            scheduled_at = EXCLUDED.scheduled_at,
            duration_minutes = EXCLUDED.duration_minutes,
            interviewer_id = EXCLUDED.interviewer_id,
            location = EXCLUDED.location,
            meeting_link = EXCLUDED.meeting_link,
            status = EXCLUDED.status,
            result = EXCLUDED.result,
            feedback = EXCLUDED.feedback,
            score = EXCLUDED.score,
            completed_at = EXCLUDED.completed_at,
            completed_by = EXCLUDED.completed_by,
            cancelled_at = EXCLUDED.cancelled_at,
            cancelled_by = EXCLUDED.cancelled_by,
            cancellation_reason = EXCLUDED.cancellation_reason,
            rescheduled_at = EXCLUDED.rescheduled_at,
            rescheduled_by = EXCLUDED.rescheduled_by,
            reschedule_notes = EXCLUDED.reschedule_notes,
            previous_scheduled_at = EXCLUDED.previous_scheduled_at,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(interview.id)
    .bind(interview.candidate_id)
    .bind(&interview.job_id)
    .bind(interview.scheduled_at)
    .bind(interview.duration_minutes)
    .bind(interview.interviewer_id)
    .bind(interview.scheduled_by)
    .bind(interview.interview_type.as_str())
    .bind(&interview.location)
    .bind(&interview.meeting_link)
    .bind(interview.status.as_str())
    .bind(interview.result.as_str())
    .bind(&interview.feedback)
    .bind(interview.score.map(i16::from))
    .bind(interview.completed_at)
    .bind(interview.completed_by)
    .bind(interview.cancelled_at)
    .bind(interview.cancelled_by)
    .bind(&interview.cancellation_reason)
    .bind(interview.rescheduled_at)
    .bind(interview.rescheduled_by)
    .bind(&interview.reschedule_notes)
    .bind(interview.previous_scheduled_at)
    .bind(interview.rescheduled_from)
    .bind(interview.created_at)
    .bind(interview.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn write_candidate<'e, E: PgExecutor<'e>>(
    executor: E,
    candidate: &Candidate,
) -> StoreResult<Option<Candidate>> {
    let row = sqlx::query_as::<_, CandidateRow>(&format!(
        r#"
        UPDATE candidates
        SET name = $3, email = $4, phone = $5, cv_ref = $6, years_of_experience = $7,
            expected_salary = $8, notice_period = $9, referred_by = $10, core_experience = $11,
            task_submission = $12, evaluation = $13, interview = $14, final_selection = $15,
            status = $16, version = version + 1, updated_at = $17
        WHERE id = $1 AND version = $2
        RETURNING {}
        "#,
        CANDIDATE_COLUMNS
    ))
    .bind(candidate.id)
    .bind(candidate.version)
    .bind(&candidate.name)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .bind(&candidate.cv_ref)
    .bind(candidate.years_of_experience)
    .bind(candidate.expected_salary)
    .bind(&candidate.notice_period)
    .bind(candidate.referred_by)
    .bind(&candidate.core_experience)
    .bind(candidate.task_submission.as_ref().map(Json))
    .bind(candidate.evaluation.as_ref().map(Json))
    .bind(candidate.interview.as_ref().map(Json))
    .bind(candidate.final_selection.as_ref().map(Json))
    .bind(candidate.status.as_str())
    .bind(candidate.updated_at)
    .fetch_optional(executor)
    .await?;

    row.map(Candidate::try_from).transpose()
}

impl PgStore {
    /// Distinguishes a missing candidate from a lost version race after a
    /// guarded update matched no rows.
    async fn explain_missed_update(&self, id: Uuid) -> StoreError {
        match self.get_candidate(id).await {
            Ok(Some(_)) => StoreError::StaleVersion(id),
            Ok(None) => StoreError::NotFound(format!("candidate {}", id)),
            Err(err) => err,
        }
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn get_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE id = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn get_by_application_id(
        &self,
        application_id: &str,
    ) -> StoreResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE application_id = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn find_by_email_and_job(
        &self,
        email: &str,
        job_id: &str,
    ) -> StoreResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE email = $1 AND job_id = $2",
            CANDIDATE_COLUMNS
        ))
        .bind(email)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn create_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            r#"
            INSERT INTO candidates (
                id, application_id, job_id, name, email, phone, cv_ref, years_of_experience,
                expected_salary, notice_period, referred_by, core_experience, status, version,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        ))
        .bind(candidate.id)
        .bind(&candidate.application_id)
        .bind(&candidate.job_id)
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.cv_ref)
        .bind(candidate.years_of_experience)
        .bind(candidate.expected_salary)
        .bind(&candidate.notice_period)
        .bind(candidate.referred_by)
        .bind(&candidate.core_experience)
        .bind(candidate.status.as_str())
        .bind(candidate.version)
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Candidate::try_from(row)
    }

    async fn update_candidate(&self, candidate: &Candidate) -> StoreResult<Candidate> {
        match write_candidate(&self.pool, candidate).await? {
            Some(updated) => Ok(updated),
            None => Err(self.explain_missed_update(candidate.id).await),
        }
    }

    async fn delete_candidate(
        &self,
        id: Uuid,
        closed_interview: Option<&Interview>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound(format!("candidate {}", id)));
        }
        if let Some(interview) = closed_interview {
            upsert_interview(&mut *tx, interview).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_candidates_by_job(&self, job_id: &str) -> StoreResult<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {} FROM candidates WHERE job_id = $1 ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Candidate::try_from).collect()
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn get_interview(&self, id: Uuid) -> StoreResult<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE id = $1",
            INTERVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Interview::try_from).transpose()
    }

    async fn find_open_by_candidate(&self, candidate_id: Uuid) -> StoreResult<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            r#"SELECT {} FROM interviews
               WHERE candidate_id = $1 AND status IN ('scheduled', 'rescheduled')
               LIMIT 1"#,
            INTERVIEW_COLUMNS
        ))
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Interview::try_from).transpose()
    }

    async fn list_interviews_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> StoreResult<Vec<Interview>> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE candidate_id = $1 ORDER BY created_at ASC",
            INTERVIEW_COLUMNS
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Interview::try_from).collect()
    }

    async fn commit_interview(
        &self,
        candidate: &Candidate,
        interview: &Interview,
    ) -> StoreResult<Candidate> {
        let mut tx = self.pool.begin().await?;

        upsert_interview(&mut *tx, interview).await?;

        let updated = write_candidate(&mut *tx, candidate).await?;
        match updated {
            Some(updated) => {
                tx.commit().await?;
                Ok(updated)
            }
            None => {
                tx.rollback().await?;
                Err(self.explain_missed_update(candidate.id).await)
            }
        }
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn get_job(&self, job_id: &str) -> StoreResult<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"SELECT id, job_id, title, description, location, task_link, is_active, created_at, updated_at
               FROM jobs WHERE job_id = $1"#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn create_job(&self, job: &Job) -> StoreResult<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, job_id, title, description, location, task_link, is_active, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            RETURNING id, job_id, title, description, location, task_link, is_active, created_at, updated_at
            "#,
        )
        .bind(job.id)
        .bind(&job.job_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.task_link)
        .bind(job.is_active)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"SELECT id, job_id, title, description, location, task_link, is_active, created_at, updated_at
               FROM jobs WHERE is_active = TRUE ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn list_experiences(&self) -> StoreResult<Vec<Experience>> {
        let experiences = sqlx::query_as::<_, Experience>(
            "SELECT id, name, is_active, created_at FROM experiences ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(experiences)
    }

    async fn create_experience(&self, experience: &Experience) -> StoreResult<Experience> {
        let experience = sqlx::query_as::<_, Experience>(
            r#"INSERT INTO experiences (id, name, is_active, created_at) VALUES ($1, $2, $3, $4)
               RETURNING id, name, is_active, created_at"#,
        )
        .bind(experience.id)
        .bind(&experience.name)
        .bind(experience.is_active)
        .bind(experience.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(experience)
    }
}

#[async_trait]
impl StaffDirectory for PgStore {
    async fn find_staff(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(User {
                role: row.role.parse().map_err(StoreError::Backend)?,
                id: row.id,
                name: row.name,
                email: row.email,
                is_active: row.is_active,
                created_at: row.created_at,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn record(&self, entry: &AuditLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, changes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.changes)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
