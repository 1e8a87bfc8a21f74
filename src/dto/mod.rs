pub mod candidate_dto;
pub mod interview_dto;
pub mod job_dto;
