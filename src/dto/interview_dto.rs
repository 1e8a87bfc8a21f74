use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::{Interview, InterviewType};
use crate::services::interview_service::ScheduleInterview;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulePayload {
    pub candidate_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer_id: Uuid,
    #[serde(default = "default_interview_type")]
    pub interview_type: InterviewType,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
}

fn default_interview_type() -> InterviewType {
    InterviewType::Technical
}

impl From<SchedulePayload> for ScheduleInterview {
    fn from(p: SchedulePayload) -> Self {
        Self {
            candidate_id: p.candidate_id,
            scheduled_at: p.scheduled_at,
            interviewer_id: p.interviewer_id,
            interview_type: p.interview_type,
            location: p.location,
            meeting_link: p.meeting_link,
            duration_minutes: p.duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReschedulePayload {
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CancelPayload {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompletePayload {
    #[validate(length(min = 1))]
    pub result: String,
    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewListResponse {
    pub items: Vec<Interview>,
    pub total: usize,
}

impl From<Vec<Interview>> for InterviewListResponse {
    fn from(items: Vec<Interview>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
