/// Audit trail for security relevant events
///
/// Registration, login, refresh, logout and account deletion each emit one
/// structured record on the `audit` tracing target. Records never carry
/// passwords, hashes or raw tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    Success,
    Failure,
}

/// One audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    /// LOGIN, LOGOUT, REFRESH, REGISTER, DELETE
    pub action: &'static str,
    /// user, token
    pub resource_type: &'static str,
    pub resource_id: Option<String>,
    /// Acting user, when known
    pub subject: Option<String>,
    pub status: AuditStatus,
    pub message: String,
}

impl AuditEvent {
    fn new(
        action: &'static str,
        resource_type: &'static str,
        status: AuditStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            resource_type,
            resource_id: None,
            subject: None,
            status,
            message: message.into(),
        }
    }

    pub fn success(action: &'static str, resource_type: &'static str, message: impl Into<String>) -> Self {
        Self::new(action, resource_type, AuditStatus::Success, message)
    }

    pub fn failure(action: &'static str, resource_type: &'static str, message: impl Into<String>) -> Self {
        Self::new(action, resource_type, AuditStatus::Failure, message)
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_subject(mut self, user_id: Uuid) -> Self {
        self.subject = Some(user_id.to_string());
        self
    }

    pub fn emit(&self) {
        match self.status {
            AuditStatus::Failure => tracing::warn!(
                target: "audit",
                event_id = %self.event_id,
                action = self.action,
                resource_type = self.resource_type,
                resource_id = ?self.resource_id,
                subject = ?self.subject,
                status = "FAILURE",
                detail = %self.message,
                "Audit log entry"
            ),
            AuditStatus::Success => tracing::info!(
                target: "audit",
                event_id = %self.event_id,
                action = self.action,
                resource_type = self.resource_type,
                resource_id = ?self.resource_id,
                subject = ?self.subject,
                status = "SUCCESS",
                detail = %self.message,
                "Audit log entry"
            ),
        }
    }
}
