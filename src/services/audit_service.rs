use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::store::PipelineStore;
use crate::error::Result;
use crate::models::audit_log::AuditLog;

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn PipelineStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn PipelineStore>) -> Self {
        Self { store }
    }

    pub async fn log(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<JsonValue>,
    ) -> Result<AuditLog> {
        let entry = AuditLog::new(user_id, action, entity_type, entity_id, changes);
        self.store.record(&entry).await?;
        tracing::info!(
            actor = ?user_id,
            action,
            entity_type,
            %entity_id,
            at = %entry.created_at,
            "audit"
        );
        Ok(entry)
    }

    /// Audit after a committed change: the change stands even if the audit
    /// write fails, so the failure is only logged.
    pub async fn log_committed(
        &self,
        user_id: Uuid,
        action: &str,
        entity_id: Uuid,
        changes: JsonValue,
    ) {
        if let Err(err) = self
            .log(Some(user_id), action, "candidate", entity_id, Some(changes))
            .await
        {
            tracing::error!(action, %entity_id, error = %err, "failed to write audit entry");
        }
    }
}
