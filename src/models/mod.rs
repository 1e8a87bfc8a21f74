pub mod audit_log;
pub mod candidate;
pub mod experience;
pub mod interview;
pub mod job;
pub mod user;
