//! Insight Engine - persistence and audit around the pure analysis

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::db::Database;
use crate::error::{Error, Result};

use super::analysis::summarize;
use super::types::Insight;

/// Computes and serves statement insights
#[derive(Clone)]
pub struct InsightEngine {
    db: Database,
    audit: Arc<dyn AuditSink>,
}

impl InsightEngine {
    pub fn new(db: Database, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Compute the insight for a statement, or return the one already stored
    ///
    /// An existing insight is never recomputed or overwritten, and only a
    /// newly created insight emits an audit event.
    pub fn compute_insights(&self, statement_id: i64, user_id: i64) -> Result<Insight> {
        if self.db.get_statement(statement_id, user_id)?.is_none() {
            return Err(Error::NotFound(format!("Statement {}", statement_id)));
        }

        if let Some(existing) = self.db.find_insight_for_statement(statement_id, user_id)? {
            debug!(statement_id, user_id, "Insight already computed");
            return Ok(existing);
        }

        let transactions = self.db.list_statement_transactions(statement_id)?;
        let summary = summarize(&transactions)?;

        let Some(id) = self.db.insert_insight(statement_id, user_id, &summary)? else {
            // Lost a race with a concurrent compute; the winner's row stands
            debug!(statement_id, user_id, "Insight inserted concurrently");
            return self
                .db
                .find_insight_for_statement(statement_id, user_id)?
                .ok_or_else(|| Error::NotFound(format!("Insight for statement {}", statement_id)));
        };

        let insight = self
            .db
            .get_insight(id, user_id)?
            .ok_or_else(|| Error::NotFound(format!("Insight {}", id)))?;

        info!(
            statement_id,
            user_id,
            insight_id = id,
            transactions = transactions.len(),
            "Computed insight"
        );

        self.audit.record(
            AuditEvent::new(user_id, AuditAction::Compute, "insight")
                .with_resource_id(id)
                .with_details(json!({
                    "statement_id": statement_id,
                    "avg_income": insight.three_month_avg_income,
                    "total_inflow": insight.total_inflow,
                    "total_outflow": insight.total_outflow,
                    "net_amount": insight.net_amount,
                })),
        );

        Ok(insight)
    }

    /// Get an insight owned by the user
    pub fn get_insight(&self, id: i64, user_id: i64) -> Result<Insight> {
        self.db
            .get_insight(id, user_id)?
            .ok_or_else(|| Error::NotFound(format!("Insight {}", id)))
    }

    /// A user's insights, newest first
    pub fn list_insights(&self, user_id: i64) -> Result<Vec<Insight>> {
        self.db.list_insights(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (Database, InsightEngine) {
        let db = Database::in_memory().unwrap();
        let engine = InsightEngine::new(db.clone(), Arc::new(db.clone()));
        (db, engine)
    }

    fn sample_statement(db: &Database, user_id: i64) -> i64 {
        db.create_statement(
            user_id,
            "jan.csv",
            &[
                NewTransaction::new("Salary", dec!(1000), date("2024-01-01")),
                NewTransaction::new("Grocery Store", dec!(-100), date("2024-01-02")),
                NewTransaction::new("Uber", dec!(-20), date("2024-01-03")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_compute_persists_and_audits() {
        let (db, engine) = setup();
        let statement_id = sample_statement(&db, 1);

        let insight = engine.compute_insights(statement_id, 1).unwrap();
        assert_eq!(insight.statement_id, statement_id);
        assert_eq!(insight.total_inflow, dec!(1000));
        assert_eq!(insight.total_outflow, dec!(120));
        assert_eq!(insight.net_amount, dec!(880));
        assert_eq!(insight.three_month_avg_income, dec!(1000));
        assert_eq!(insight.spend_buckets["Food & Dining"], dec!(100));
        assert_eq!(insight.spend_buckets["Transportation"], dec!(20));
        assert!(insight.risk_flags.is_empty());

        let audit = db.list_audit_log(1, 10).unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].resource, "insight");
        assert_eq!(audit[0].resource_id, Some(insight.id));
        let details = audit[0].details.as_ref().unwrap();
        assert_eq!(details["statement_id"], statement_id);
        assert_eq!(details["net_amount"], "880");
    }

    #[test]
    fn test_compute_is_idempotent() {
        let (db, engine) = setup();
        let statement_id = sample_statement(&db, 1);

        let first = engine.compute_insights(statement_id, 1).unwrap();
        let second = engine.compute_insights(statement_id, 1).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.list_insights(1).unwrap().len(), 1);
        // Only the creation is audited
        assert_eq!(db.list_audit_log(1, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_statement_is_not_found() {
        let (db, engine) = setup();
        let statement_id = sample_statement(&db, 1);

        let err = engine.compute_insights(statement_id + 100, 1).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        // Another user's statement looks absent
        let err = engine.compute_insights(statement_id, 2).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(db.list_audit_log(2, 10).unwrap().is_empty());
    }

    #[test]
    fn test_empty_statement_yields_zero_insight() {
        let (db, engine) = setup();
        let statement_id = db.create_statement(1, "empty.csv", &[]).unwrap();

        let insight = engine.compute_insights(statement_id, 1).unwrap();
        assert_eq!(insight.net_amount, dec!(0));
        assert!(insight.spend_buckets.is_empty());
        assert!(insight.risk_flags.is_empty());
    }

    #[test]
    fn test_get_insight_is_scoped_to_user() {
        let (db, engine) = setup();
        let statement_id = sample_statement(&db, 1);
        let insight = engine.compute_insights(statement_id, 1).unwrap();

        assert_eq!(engine.get_insight(insight.id, 1).unwrap().id, insight.id);
        assert!(matches!(
            engine.get_insight(insight.id, 2),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_risk_flags_are_stored_as_labels() {
        let (db, engine) = setup();
        let statement_id = db
            .create_statement(
                1,
                "overspent.csv",
                &[
                    NewTransaction::new("Salary", dec!(1000), date("2024-01-01")),
                    NewTransaction::new("Rent", dec!(-950), date("2024-01-02")),
                ],
            )
            .unwrap();

        let insight = engine.compute_insights(statement_id, 1).unwrap();
        assert_eq!(
            insight.risk_flags,
            vec!["High spending relative to income".to_string()]
        );
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        let (db, engine) = setup();
        let statement_id = db
            .create_statement(
                1,
                "huge.csv",
                &[
                    NewTransaction::new("Salary", Decimal::MAX, date("2024-01-01")),
                    NewTransaction::new("Salary", Decimal::MAX, date("2024-01-02")),
                ],
            )
            .unwrap();

        let err = engine.compute_insights(statement_id, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(err.is_client_error());
        assert!(engine.list_insights(1).unwrap().is_empty());
        assert!(db.list_audit_log(1, 10).unwrap().is_empty());
    }
}
