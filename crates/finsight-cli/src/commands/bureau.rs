//! Credit bureau commands: check, reports, show

use std::sync::Arc;

use anyhow::{Context, Result};
use finsight_core::models::BureauReport;
use finsight_core::{BureauConfig, BureauOrchestrator, Database, Error};

pub async fn cmd_bureau_check(db: &Database, config: BureauConfig, user_id: i64) -> Result<()> {
    println!("🏦 Requesting credit bureau check for user {}...", user_id);

    let orchestrator = BureauOrchestrator::new(db.clone(), config, Arc::new(db.clone()))
        .context("Failed to create bureau client")?;
    run_check(&orchestrator, user_id).await
}

/// Run a check through an existing orchestrator and print the result
pub async fn run_check(orchestrator: &BureauOrchestrator, user_id: i64) -> Result<()> {
    let report = orchestrator.check_credit(user_id).await?;
    println!();
    print_report(&report);
    Ok(())
}

pub fn cmd_bureau_reports(db: &Database, user_id: i64) -> Result<()> {
    let reports = db.list_bureau_reports(user_id)?;

    if reports.is_empty() {
        println!("No bureau reports for user {}.", user_id);
        return Ok(());
    }

    println!("🏦 Bureau reports for user {}", user_id);
    println!();
    println!(
        "{:>6}  {:<10}  {:>5}  {:<8}  Requested",
        "ID", "Status", "Score", "Band"
    );
    println!("{}", "-".repeat(60));
    for r in reports {
        println!(
            "{:>6}  {:<10}  {:>5}  {:<8}  {}",
            r.id,
            r.status.as_str(),
            r.credit_score.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            r.risk_band.as_deref().unwrap_or("-"),
            r.requested_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn cmd_bureau_show(db: &Database, id: i64, user_id: i64) -> Result<()> {
    let report = db
        .get_bureau_report(id, user_id)?
        .ok_or_else(|| Error::NotFound(format!("Bureau report {}", id)))?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BureauReport) {
    println!("🏦 Bureau report #{} ({})", report.id, report.status);
    println!("   ─────────────────────────────");
    if let Some(score) = report.credit_score {
        println!("   Credit score:   {}", score);
    }
    if let Some(band) = &report.risk_band {
        println!("   Risk band:      {}", band);
    }
    if let Some(n) = report.enquiries_6m {
        println!("   Enquiries (6m): {}", n);
    }
    if let Some(n) = report.defaults_count {
        println!("   Defaults:       {}", n);
    }
    if let Some(n) = report.open_loans {
        println!("   Open loans:     {}", n);
    }
    if let Some(n) = report.trade_lines {
        println!("   Trade lines:    {}", n);
    }
    if let Some(msg) = &report.error_message {
        println!("   ❌ {}", msg);
    }
    println!(
        "   Requested:      {}",
        report.requested_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(done) = report.completed_at {
        println!("   Completed:      {}", done.format("%Y-%m-%d %H:%M:%S"));
    }
}
