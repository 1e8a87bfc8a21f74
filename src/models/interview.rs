use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Technical,
    Hr,
    Final,
    Panel,
}

impl InterviewType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Hr => "hr",
            Self::Final => "final",
            Self::Panel => "panel",
        }
    }
}

/// Lifecycle of the interview record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl InterviewStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Scheduled | Self::Rescheduled)
    }
}

/// Outcome axis, independent of [`InterviewStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewResult {
    Pending,
    Taken,
    Passed,
    Failed,
    NoShow,
    Cancelled,
}

impl InterviewResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Taken => "taken",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InterviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interview {field}: {value}")]
pub struct ParseInterviewFieldError {
    pub field: &'static str,
    pub value: String,
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

impl FromStr for InterviewType {
    type Err = ParseInterviewFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "technical" => Ok(Self::Technical),
            "hr" => Ok(Self::Hr),
            "final" => Ok(Self::Final),
            "panel" => Ok(Self::Panel),
            _ => Err(ParseInterviewFieldError {
                field: "type",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for InterviewStatus {
    type Err = ParseInterviewFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "rescheduled" => Ok(Self::Rescheduled),
            _ => Err(ParseInterviewFieldError {
                field: "status",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for InterviewResult {
    type Err = ParseInterviewFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "pending" => Ok(Self::Pending),
            "taken" => Ok(Self::Taken),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "no_show" | "noshow" => Ok(Self::NoShow),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseInterviewFieldError {
                field: "result",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub interviewer_id: Uuid,
    pub scheduled_by: Uuid,
    pub interview_type: InterviewType,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub status: InterviewStatus,
    pub result: InterviewResult,
    pub feedback: Option<String>,
    pub score: Option<u8>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancellation_reason: Option<String>,
    pub rescheduled_at: Option<DateTime<Utc>>,
    pub rescheduled_by: Option<Uuid>,
    pub reschedule_notes: Option<String>,
    pub previous_scheduled_at: Option<DateTime<Utc>>,
    pub rescheduled_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
