use crate::models::candidate::CandidateStatus;
use crate::models::interview::InterviewResult;

/// Lowest evaluation score that makes a candidate interview eligible.
pub const PASSING_SCORE: u8 = 60;

pub struct GradingService;

impl GradingService {
    pub fn derive_status(score: u8) -> CandidateStatus {
        if score >= PASSING_SCORE {
            CandidateStatus::InterviewEligible
        } else {
            CandidateStatus::UnderReview
        }
    }

    /// Candidate status implied by a recorded interview result.
    pub fn status_after_interview(result: InterviewResult) -> CandidateStatus {
        match result {
            InterviewResult::Passed => CandidateStatus::Shortlisted,
            InterviewResult::Failed | InterviewResult::NoShow => CandidateStatus::Rejected,
            InterviewResult::Taken | InterviewResult::Cancelled | InterviewResult::Pending => {
                CandidateStatus::InterviewCompleted
            }
        }
    }

    pub fn check_score(score: i32) -> Option<u8> {
        u8::try_from(score).ok().filter(|s| *s <= 100)
    }
}
