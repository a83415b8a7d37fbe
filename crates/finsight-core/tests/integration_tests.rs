//! Integration tests for finsight-core
//!
//! These tests exercise the upload -> insights -> credit check workflow
//! through the public API only.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use finsight_core::{
    db::Database,
    models::{BureauReportStatus, NewTransaction},
    BureauConfig, BureauOrchestrator, Error, InsightEngine, MockBureauClient, RecordingSleeper,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Three months of salary plus a realistic mix of spending
fn quarter_of_transactions() -> Vec<NewTransaction> {
    vec![
        NewTransaction::new("ACME PAYROLL", dec!(5000), date("2024-01-31")),
        NewTransaction::new("Monthly Rent", dec!(-1500), date("2024-01-02")),
        NewTransaction::new("Whole Foods Grocery", dec!(-220.45), date("2024-01-09")),
        NewTransaction::new("ACME PAYROLL", dec!(5000), date("2024-02-29")),
        NewTransaction::new("Monthly Rent", dec!(-1500), date("2024-02-02")),
        NewTransaction::new("Shell Gas", dec!(-60.10), date("2024-02-11")),
        NewTransaction::new("NETFLIX.COM", dec!(-15.49), date("2024-02-15")),
        NewTransaction::new("ACME PAYROLL", dec!(6000), date("2024-03-29")),
        NewTransaction::new("Monthly Rent", dec!(-1500), date("2024-03-02")),
        NewTransaction::new("AMAZON MKTPLACE", dec!(-89.99), date("2024-03-12")),
        NewTransaction::new("ATM Withdrawal", dec!(-100), date("2024-03-20")),
    ]
}

// =============================================================================
// Insight Workflow
// =============================================================================

#[test]
fn test_statement_to_insight_workflow() {
    let db = Database::in_memory().expect("Failed to create database");
    let engine = InsightEngine::new(db.clone(), Arc::new(db.clone()));

    let statement_id = db
        .create_statement(42, "q1.csv", &quarter_of_transactions())
        .expect("Failed to store statement");

    let insight = engine
        .compute_insights(statement_id, 42)
        .expect("Failed to compute insight");

    assert_eq!(insight.three_month_avg_income, dec!(5333));
    assert_eq!(insight.total_inflow, dec!(16000));
    assert_eq!(insight.total_outflow, dec!(4986.03));
    assert_eq!(insight.net_amount, insight.total_inflow - insight.total_outflow);
    assert_eq!(insight.spend_buckets["Housing"], dec!(4500));
    assert_eq!(insight.spend_buckets["Food & Dining"], dec!(220.45));
    assert_eq!(insight.spend_buckets["Transportation"], dec!(60.10));
    assert_eq!(insight.spend_buckets["Entertainment"], dec!(15.49));
    assert_eq!(insight.spend_buckets["Shopping"], dec!(89.99));
    assert_eq!(insight.spend_buckets["Other"], dec!(100));

    let bucket_total: Decimal = insight.spend_buckets.values().sum();
    assert_eq!(bucket_total, insight.total_outflow);

    // Rent lands before January's salary, so the replayed balance is negative
    // twice; that is not enough to flag
    assert!(insight.risk_flags.is_empty());

    let again = engine.compute_insights(statement_id, 42).unwrap();
    assert_eq!(again.id, insight.id);
    assert_eq!(engine.list_insights(42).unwrap().len(), 1);
}

#[test]
fn test_insight_for_unknown_statement() {
    let db = Database::in_memory().unwrap();
    let engine = InsightEngine::new(db.clone(), Arc::new(db.clone()));

    let result = engine.compute_insights(999, 1);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// =============================================================================
// Credit Check Workflow
// =============================================================================

#[tokio::test]
async fn test_credit_check_workflow_with_retries() {
    let db = Database::in_memory().unwrap();
    let client = Arc::new(MockBureauClient::failing_with(&[500, 500]));
    let sleeper = Arc::new(RecordingSleeper::new());
    let orchestrator = BureauOrchestrator::with_client(
        db.clone(),
        BureauConfig::for_endpoint("http://bureau.test/v1/credit/check", "key"),
        client.clone(),
        Arc::new(db.clone()),
    )
    .with_sleeper(sleeper.clone());

    let report = orchestrator.check_credit(42).await.unwrap();
    assert_eq!(report.status, BureauReportStatus::Completed);
    assert_eq!(client.calls(), 3);
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );

    // Cached on the second call
    let cached = orchestrator.check_credit(42).await.unwrap();
    assert_eq!(cached.id, report.id);
    assert_eq!(client.calls(), 3);

    let listed = orchestrator.list_bureau_reports(42).unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_audit_trail_covers_both_pipelines() {
    let db = Database::in_memory().unwrap();
    let engine = InsightEngine::new(db.clone(), Arc::new(db.clone()));
    let orchestrator = BureauOrchestrator::with_client(
        db.clone(),
        BureauConfig::for_endpoint("http://bureau.test/v1/credit/check", "key"),
        Arc::new(MockBureauClient::new()),
        Arc::new(db.clone()),
    )
    .with_sleeper(Arc::new(RecordingSleeper::new()));

    let statement_id = db
        .create_statement(7, "jan.csv", &quarter_of_transactions())
        .unwrap();
    engine.compute_insights(statement_id, 7).unwrap();
    orchestrator.check_credit(7).await.unwrap();

    let entries = db.list_audit_log(7, 50).unwrap();
    let mut resources: Vec<&str> = entries.iter().map(|e| e.resource.as_str()).collect();
    resources.sort();
    assert_eq!(resources, vec!["bureau_report", "insight"]);
    assert!(entries.iter().all(|e| e.action == "compute"));
}
