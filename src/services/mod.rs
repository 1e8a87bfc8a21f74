pub mod audit_service;
pub mod grading_service;
pub mod identity_service;
pub mod interview_service;
pub mod job_service;
pub mod lock_service;
pub mod notification_service;
pub mod pipeline_service;
