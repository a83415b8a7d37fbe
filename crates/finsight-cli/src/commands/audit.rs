//! Audit log command

use anyhow::Result;
use finsight_core::Database;

use super::truncate;

pub fn cmd_audit(db: &Database, user_id: i64, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(user_id, limit.max(1))?;

    if entries.is_empty() {
        println!("No audit entries for user {}.", user_id);
        return Ok(());
    }

    println!("📜 Audit log for user {}", user_id);
    println!();
    for e in entries {
        let target = match e.resource_id {
            Some(id) => format!("{} #{}", e.resource, id),
            None => e.resource.clone(),
        };
        let details = e
            .details
            .as_ref()
            .map(|d| truncate(&d.to_string(), 60))
            .unwrap_or_default();
        println!(
            "{}  {:<8}  {:<20}  {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.action,
            target,
            details
        );
    }

    Ok(())
}
