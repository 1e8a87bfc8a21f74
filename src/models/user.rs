use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    SuperAdmin,
    Hr,
    Md,
    Evaluator,
}

impl StaffRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Hr => "hr",
            Self::Md => "md",
            Self::Evaluator => "evaluator",
        }
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "super_admin" | "superadmin" | "admin" => Ok(Self::SuperAdmin),
            "hr" => Ok(Self::Hr),
            "md" => Ok(Self::Md),
            "evaluator" => Ok(Self::Evaluator),
            _ => Err(format!("unknown staff role: {}", value)),
        }
    }
}

/// Staff member who can evaluate, interview or decide on candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
