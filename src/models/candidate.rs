use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::interview::{Interview, InterviewResult};

/// Where a candidate currently sits in the hiring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Applied,
    TaskPending,
    TaskSubmitted,
    UnderReview,
    InterviewEligible,
    InterviewScheduled,
    InterviewCompleted,
    Shortlisted,
    Selected,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 10] = [
        CandidateStatus::Applied,
        CandidateStatus::TaskPending,
        CandidateStatus::TaskSubmitted,
        CandidateStatus::UnderReview,
        CandidateStatus::InterviewEligible,
        CandidateStatus::InterviewScheduled,
        CandidateStatus::InterviewCompleted,
        CandidateStatus::Shortlisted,
        CandidateStatus::Selected,
        CandidateStatus::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::TaskPending => "task_pending",
            Self::TaskSubmitted => "task_submitted",
            Self::UnderReview => "under_review",
            Self::InterviewEligible => "interview_eligible",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::Shortlisted => "shortlisted",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Selected | Self::Rejected)
    }

    pub const fn accepts_task_submission(self) -> bool {
        matches!(self, Self::Applied | Self::TaskPending)
    }

    pub const fn accepts_interview(self) -> bool {
        matches!(self, Self::InterviewEligible | Self::Shortlisted)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown candidate status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for CandidateStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Github,
    Live,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLink {
    pub kind: LinkKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubmission {
    pub links: Vec<TaskLink>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u8,
    pub evaluated_by: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub comments: Option<String>,
}

/// Read-side copy of the candidate's current interview. Only ever produced
/// from an [`Interview`] in the same commit that writes the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub interview_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer_id: Uuid,
    pub interviewer_name: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub result: InterviewResult,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewSummary {
    pub fn project(interview: &Interview, interviewer_name: Option<String>) -> Self {
        Self {
            interview_id: interview.id,
            scheduled_at: interview.scheduled_at,
            interviewer_id: interview.interviewer_id,
            interviewer_name,
            location: interview.location.clone(),
            meeting_link: interview.meeting_link.clone(),
            result: interview.result,
            feedback: interview.feedback.clone(),
            completed_at: interview.completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSelection {
    pub selected: bool,
    pub offer_letter: Option<String>,
    pub selected_by: Uuid,
    pub selected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub application_id: String,
    pub job_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cv_ref: String,
    pub years_of_experience: Option<i32>,
    pub expected_salary: Option<Decimal>,
    pub notice_period: Option<String>,
    pub referred_by: Option<Uuid>,
    pub core_experience: Vec<Uuid>,
    pub task_submission: Option<TaskSubmission>,
    pub evaluation: Option<Evaluation>,
    pub interview: Option<InterviewSummary>,
    pub final_selection: Option<FinalSelection>,
    pub status: CandidateStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applicant-supplied fields accepted at intake.
#[derive(Debug, Clone, Default)]
pub struct Applicant {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub years_of_experience: Option<i32>,
    pub expected_salary: Option<Decimal>,
    pub notice_period: Option<String>,
    pub referred_by: Option<Uuid>,
    pub core_experience: Vec<Uuid>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in CandidateStatus::ALL {
            assert_eq!(status.as_str().parse::<CandidateStatus>(), Ok(status));
        }
    }

    #[test]
    fn status_parsing_accepts_display_spelling() {
        assert_eq!(
            "Interview Eligible".parse::<CandidateStatus>(),
            Ok(CandidateStatus::InterviewEligible)
        );
        assert_eq!(
            "task-pending".parse::<CandidateStatus>(),
            Ok(CandidateStatus::TaskPending)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("hired".parse::<CandidateStatus>().is_err());
        assert!("".parse::<CandidateStatus>().is_err());
    }

    #[test]
    fn only_selected_and_rejected_are_terminal() {
        let terminal: Vec<_> = CandidateStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![CandidateStatus::Selected, CandidateStatus::Rejected]
        );
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
