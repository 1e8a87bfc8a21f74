use std::future::Future;

use crate::error::{Error, Result};
use crate::utils::{time, token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Application,
    Job,
    TalentPool,
}

impl IdKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Job => "job",
            Self::TalentPool => "talent_pool",
        }
    }
}

/// Produces human-readable identifiers. Uniqueness comes from probing the
/// owning store, not from coordination between generators.
#[derive(Debug, Clone)]
pub struct IdentityService {
    max_attempts: u32,
}

impl IdentityService {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn next(&self, kind: IdKind) -> String {
        match kind {
            IdKind::Application => format!(
                "APP-{}-{}",
                time::unix_millis(time::now()),
                token::random_base36(9)
            ),
            IdKind::Job => token::random_upper_alphanumeric(8),
            IdKind::TalentPool => format!("TP-{}", token::random_upper_alphanumeric(8)),
        }
    }

    /// Generates values until `is_taken` reports a free one.
    pub async fn allocate<F, Fut>(&self, kind: IdKind, is_taken: F) -> Result<String>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        for attempt in 1..=self.max_attempts {
            let value = self.next(kind);
            if !is_taken(value.clone()).await? {
                return Ok(value);
            }
            tracing::warn!(kind = kind.as_str(), attempt, "generated identifier collided, retrying");
        }
        Err(Error::Conflict(format!(
            "could not allocate a unique {} identifier after {} attempts",
            kind.as_str(),
            self.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn application_id_format() {
        let id = IdentityService::new(3).next(IdKind::Application);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "APP");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn job_id_is_eight_alphanumerics() {
        let id = IdentityService::new(3).next(IdKind::Job);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn talent_pool_id_has_prefix() {
        assert!(IdentityService::new(3)
            .next(IdKind::TalentPool)
            .starts_with("TP-"));
    }

    #[test]
    fn allocate_retries_until_free() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = IdentityService::new(5);
        let probe_calls = calls.clone();
        let id = tokio_test::block_on(service.allocate(IdKind::Job, move |_| {
            let n = probe_calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n < 2) }
        }))
        .unwrap();
        assert_eq!(id.len(), 8);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn allocate_gives_up_after_max_attempts() {
        let service = IdentityService::new(2);
        let err = tokio_test::block_on(
            service.allocate(IdKind::Application, |_| async { Ok(true) }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }
}
