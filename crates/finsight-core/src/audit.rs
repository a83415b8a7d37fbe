//! Audit sink
//!
//! Core operations report what they changed through [`AuditSink`]. Recording
//! is best-effort: a sink failure is logged and never fails the operation
//! that produced the event.

use serde_json::Value;
use tracing::warn;

use crate::db::Database;

/// What kind of change an audit event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Upload,
    Compute,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Upload => "upload",
            AuditAction::Compute => "compute",
        }
    }
}

/// A single audit event
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub user_id: i64,
    pub action: AuditAction,
    pub resource: &'static str,
    pub resource_id: Option<i64>,
    pub details: Option<Value>,
}

impl AuditEvent {
    pub fn new(user_id: i64, action: AuditAction, resource: &'static str) -> Self {
        Self {
            user_id,
            action,
            resource,
            resource_id: None,
            details: None,
        }
    }

    pub fn with_resource_id(mut self, id: i64) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

impl AuditSink for Database {
    fn record(&self, event: AuditEvent) {
        if let Err(e) = self.log_audit(
            event.user_id,
            event.action.as_str(),
            event.resource,
            event.resource_id,
            event.details.as_ref(),
        ) {
            warn!(
                user_id = event.user_id,
                action = event.action.as_str(),
                resource = event.resource,
                "Failed to write audit event: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_database_sink_writes_entry() {
        let db = Database::in_memory().unwrap();

        db.record(
            AuditEvent::new(7, AuditAction::Compute, "insight")
                .with_resource_id(3)
                .with_details(json!({"statement_id": 1})),
        );

        let entries = db.list_audit_log(7, 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "compute");
        assert_eq!(entries[0].resource, "insight");
        assert_eq!(entries[0].resource_id, Some(3));
        assert_eq!(entries[0].details, Some(json!({"statement_id": 1})));
    }

    #[test]
    fn test_entries_are_scoped_to_user() {
        let db = Database::in_memory().unwrap();

        db.record(AuditEvent::new(1, AuditAction::Upload, "statement"));
        db.record(AuditEvent::new(2, AuditAction::Upload, "statement"));

        assert_eq!(db.list_audit_log(1, 10).unwrap().len(), 1);
        assert_eq!(db.list_audit_log(3, 10).unwrap().len(), 0);
    }
}
