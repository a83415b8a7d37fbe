//! Database tests

use super::*;
use crate::bureau::BureauScore;
use crate::insights::{InsightSummary, RiskFlag};
use crate::models::*;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn score() -> BureauScore {
    BureauScore {
        score: 680,
        risk_band: "MEDIUM".to_string(),
        enquiries_6m: 3,
        defaults: 1,
        open_loans: 2,
        trade_lines: 7,
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_statements(1).unwrap().is_empty());
    db.ping().unwrap();
}

#[test]
fn test_schema_has_unique_insight_key() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let sql: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'insights'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(sql.contains("UNIQUE(statement_id, user_id)"));
}

#[test]
fn test_statement_roundtrip_preserves_decimals() {
    let db = Database::in_memory().unwrap();

    let id = db
        .create_statement(
            1,
            "march.csv",
            &[
                NewTransaction::new("Salary", dec!(2500.10), date("2024-03-01"))
                    .with_balance(dec!(2600.10)),
                NewTransaction::new("Coffee", dec!(-3.45), date("2024-03-02")),
            ],
        )
        .unwrap();

    let statement = db.get_statement(id, 1).unwrap().unwrap();
    assert_eq!(statement.filename, "march.csv");
    assert_eq!(statement.total_transactions, 2);

    let transactions = db.list_statement_transactions(id).unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].amount, dec!(2500.10));
    assert_eq!(transactions[0].balance, Some(dec!(2600.10)));
    assert_eq!(transactions[1].amount, dec!(-3.45));
    assert_eq!(transactions[1].balance, None);
}

#[test]
fn test_transactions_ordered_by_date_then_insertion() {
    let db = Database::in_memory().unwrap();

    let id = db
        .create_statement(
            1,
            "unordered.csv",
            &[
                NewTransaction::new("Third", dec!(-1), date("2024-03-05")),
                NewTransaction::new("First", dec!(-1), date("2024-03-01")),
                NewTransaction::new("Second", dec!(-1), date("2024-03-01")),
            ],
        )
        .unwrap();

    let names: Vec<String> = db
        .list_statement_transactions(id)
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[test]
fn test_statement_is_scoped_to_user() {
    let db = Database::in_memory().unwrap();
    let id = db.create_statement(1, "a.csv", &[]).unwrap();

    assert!(db.get_statement(id, 2).unwrap().is_none());
    assert!(db.list_statements(2).unwrap().is_empty());
    assert_eq!(db.list_statements(1).unwrap().len(), 1);
}

#[test]
fn test_insert_insight_conflict_returns_none() {
    let db = Database::in_memory().unwrap();
    let statement_id = db.create_statement(1, "a.csv", &[]).unwrap();

    let summary = InsightSummary {
        net_amount: dec!(10),
        risk_flags: vec![RiskFlag::HighSpending],
        ..InsightSummary::default()
    };
    let first = db.insert_insight(statement_id, 1, &summary).unwrap();
    assert!(first.is_some());

    let other = InsightSummary {
        net_amount: dec!(99),
        ..InsightSummary::default()
    };
    assert_eq!(db.insert_insight(statement_id, 1, &other).unwrap(), None);

    let stored = db.find_insight_for_statement(statement_id, 1).unwrap().unwrap();
    assert_eq!(Some(stored.id), first);
    assert_eq!(stored.net_amount, dec!(10));
    assert_eq!(stored.risk_flags, vec!["High spending relative to income"]);
}

#[test]
fn test_bureau_report_lifecycle() {
    let db = Database::in_memory().unwrap();

    let id = db.create_pending_bureau_report(1).unwrap();
    let pending = db.get_bureau_report(id, 1).unwrap().unwrap();
    assert_eq!(pending.status, BureauReportStatus::Pending);
    assert!(pending.completed_at.is_none());

    db.complete_bureau_report(id, &score()).unwrap();
    let done = db.get_bureau_report(id, 1).unwrap().unwrap();
    assert_eq!(done.status, BureauReportStatus::Completed);
    assert_eq!(done.credit_score, Some(680));
    assert_eq!(done.defaults_count, Some(1));
    assert_eq!(done.trade_lines, Some(7));
    assert!(done.completed_at.is_some());

    // Terminal rows are never rewritten
    assert!(db.fail_bureau_report(id, "late failure").is_err());
    assert!(db.complete_bureau_report(id, &score()).is_err());
    let still = db.get_bureau_report(id, 1).unwrap().unwrap();
    assert_eq!(still.status, BureauReportStatus::Completed);
    assert!(still.error_message.is_none());
}

#[test]
fn test_fresh_report_lookup_ignores_failed_and_old() {
    let db = Database::in_memory().unwrap();
    let since = Utc::now() - chrono::Duration::hours(24);

    let failed = db.create_pending_bureau_report(1).unwrap();
    db.fail_bureau_report(failed, "boom").unwrap();
    assert!(db.find_fresh_bureau_report(1, since).unwrap().is_none());

    let old = db.create_pending_bureau_report(1).unwrap();
    db.complete_bureau_report(old, &score()).unwrap();
    db.conn()
        .unwrap()
        .execute(
            "UPDATE bureau_reports SET requested_at = '2001-01-01 00:00:00' WHERE id = ?",
            [old],
        )
        .unwrap();
    assert!(db.find_fresh_bureau_report(1, since).unwrap().is_none());

    let fresh = db.create_pending_bureau_report(1).unwrap();
    db.complete_bureau_report(fresh, &score()).unwrap();
    assert_eq!(
        db.find_fresh_bureau_report(1, since).unwrap().map(|r| r.id),
        Some(fresh)
    );
    assert!(db.find_fresh_bureau_report(2, since).unwrap().is_none());
}

#[test]
fn test_recover_stuck_bureau_reports() {
    let db = Database::in_memory().unwrap();

    let stuck = db.create_pending_bureau_report(1).unwrap();
    let done = db.create_pending_bureau_report(1).unwrap();
    db.complete_bureau_report(done, &score()).unwrap();

    assert_eq!(db.recover_stuck_bureau_reports().unwrap(), 1);

    let recovered = db.get_bureau_report(stuck, 1).unwrap().unwrap();
    assert_eq!(recovered.status, BureauReportStatus::Failed);
    assert!(recovered.error_message.is_some());
    assert_eq!(
        db.get_bureau_report(done, 1).unwrap().unwrap().status,
        BureauReportStatus::Completed
    );
    assert_eq!(db.recover_stuck_bureau_reports().unwrap(), 0);
}

#[test]
fn test_bureau_reports_newest_first() {
    let db = Database::in_memory().unwrap();
    let first = db.create_pending_bureau_report(1).unwrap();
    let second = db.create_pending_bureau_report(1).unwrap();

    let ids: Vec<i64> = db
        .list_bureau_reports(1)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn test_audit_log_limit_and_order() {
    let db = Database::in_memory().unwrap();
    for i in 0..5 {
        db.log_audit(1, "upload", "statement", Some(i), None).unwrap();
    }

    let entries = db.list_audit_log(1, 3).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].resource_id, Some(4));
    assert!(entries[0].details.is_none());
}
