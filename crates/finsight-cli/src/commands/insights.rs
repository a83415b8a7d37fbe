//! Insight commands: run, list, show

use std::sync::Arc;

use anyhow::Result;
use finsight_core::{Database, Insight, InsightEngine};

fn engine(db: &Database) -> InsightEngine {
    InsightEngine::new(db.clone(), Arc::new(db.clone()))
}

pub fn cmd_insights_run(db: &Database, statement_id: i64, user_id: i64) -> Result<()> {
    println!("🧮 Computing insights for statement #{}...", statement_id);

    let insight = engine(db).compute_insights(statement_id, user_id)?;
    println!();
    print_insight(&insight);

    Ok(())
}

pub fn cmd_insights_list(db: &Database, user_id: i64) -> Result<()> {
    let insights = engine(db).list_insights(user_id)?;

    if insights.is_empty() {
        println!("No insights for user {}.", user_id);
        return Ok(());
    }

    println!("📊 Insights for user {}", user_id);
    println!();
    println!(
        "{:>6}  {:>9}  {:>12}  {:>12}  {:>12}  Flags",
        "ID", "Statement", "Inflow", "Outflow", "Net"
    );
    println!("{}", "-".repeat(72));
    for i in insights {
        println!(
            "{:>6}  {:>9}  {:>12}  {:>12}  {:>12}  {}",
            i.id,
            i.statement_id,
            i.total_inflow,
            i.total_outflow,
            i.net_amount,
            i.risk_flags.len()
        );
    }

    Ok(())
}

pub fn cmd_insights_show(db: &Database, id: i64, user_id: i64) -> Result<()> {
    let insight = engine(db).get_insight(id, user_id)?;
    print_insight(&insight);
    Ok(())
}

fn print_insight(insight: &Insight) {
    println!(
        "📊 Insight #{} (statement #{})",
        insight.id, insight.statement_id
    );
    println!("   ─────────────────────────────");
    println!("   3-month avg income: {}", insight.three_month_avg_income);
    println!("   Total inflow:       {}", insight.total_inflow);
    println!("   Total outflow:      {}", insight.total_outflow);
    println!("   Net:                {}", insight.net_amount);

    if !insight.spend_buckets.is_empty() {
        println!();
        println!("   Spending by category:");
        for (category, amount) in &insight.spend_buckets {
            println!("     {:<16} {:>12}", category, amount);
        }
    }

    println!();
    if insight.risk_flags.is_empty() {
        println!("   ✅ No risk flags");
    } else {
        for flag in &insight.risk_flags {
            println!("   ⚠️  {}", flag);
        }
    }
}
