use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Per-candidate mutual exclusion around read-validate-write sequences.
#[derive(Clone, Default)]
pub struct CandidateLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl CandidateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, candidate_id: Uuid) -> Result<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| Error::Internal(format!("candidate lock table poisoned: {}", e)))?;
            // Entries referenced only by the table are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(candidate_id).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }
}
