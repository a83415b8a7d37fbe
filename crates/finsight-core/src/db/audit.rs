//! Audit log operations

use rusqlite::params;

use super::{parse_datetime, AuditEntry, Database};
use crate::error::Result;

impl Database {
    /// Append an audit log entry
    pub fn log_audit(
        &self,
        user_id: i64,
        action: &str,
        resource: &str,
        resource_id: Option<i64>,
        details: Option<&serde_json::Value>,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let details_json = details.map(serde_json::to_string).transpose()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (user_id, action, resource, resource_id, details)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![user_id, action, resource, resource_id, details_json],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List a user's audit log entries, newest first
    pub fn list_audit_log(&self, user_id: i64, limit: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, user_id, action, resource, resource_id, details
            FROM audit_log
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let entries = stmt
            .query_map(params![user_id, limit], |row| {
                let timestamp_str: String = row.get(1)?;
                let details_str: Option<String> = row.get(6)?;
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: parse_datetime(&timestamp_str),
                    user_id: row.get(2)?,
                    action: row.get(3)?,
                    resource: row.get(4)?,
                    resource_id: row.get(5)?,
                    details: details_str.and_then(|s| serde_json::from_str(&s).ok()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
