//! Statement ingestion
//!
//! Parsing bank files is done upstream; this module stores already
//! normalized transactions and records the upload.

use serde_json::json;
use tracing::info;

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Statement};

/// Store a statement with its transactions and audit the upload
pub fn ingest_statement(
    db: &Database,
    audit: &dyn AuditSink,
    user_id: i64,
    filename: &str,
    transactions: &[NewTransaction],
) -> Result<Statement> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(Error::InvalidData("Statement filename is required".to_string()));
    }

    let id = db.create_statement(user_id, filename, transactions)?;
    let statement = db
        .get_statement(id, user_id)?
        .ok_or_else(|| Error::NotFound(format!("Statement {}", id)))?;

    info!(
        user_id,
        statement_id = id,
        transactions = transactions.len(),
        "Statement ingested"
    );

    audit.record(
        AuditEvent::new(user_id, AuditAction::Upload, "statement")
            .with_resource_id(id)
            .with_details(json!({
                "filename": statement.filename,
                "total_transactions": statement.total_transactions,
            })),
    );

    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ingest_stores_and_audits() {
        let db = Database::in_memory().unwrap();
        let statement = ingest_statement(
            &db,
            &db,
            5,
            "jan.csv",
            &[NewTransaction::new(
                "Salary",
                dec!(100),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )],
        )
        .unwrap();

        assert_eq!(statement.user_id, 5);
        assert_eq!(statement.total_transactions, 1);

        let audit = db.list_audit_log(5, 10).unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "upload");
        assert_eq!(audit[0].resource, "statement");
        assert_eq!(audit[0].resource_id, Some(statement.id));
    }

    #[test]
    fn test_blank_filename_rejected() {
        let db = Database::in_memory().unwrap();
        let err = ingest_statement(&db, &db, 5, "  ", &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(db.list_statements(5).unwrap().is_empty());
    }
}
