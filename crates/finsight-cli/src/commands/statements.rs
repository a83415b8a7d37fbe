//! Statement commands: import, list

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::models::NewTransaction;
use finsight_core::{ingest_statement, Database};
use serde::Deserialize;

use super::truncate;

/// Accepted layouts for a statement file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatementFile {
    Wrapped {
        filename: Option<String>,
        transactions: Vec<NewTransaction>,
    },
    Bare(Vec<NewTransaction>),
}

/// Read a statement file, returning the embedded filename (if any) and its transactions
pub fn read_statement_file(path: &Path) -> Result<(Option<String>, Vec<NewTransaction>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read statement file {}", path.display()))?;
    let parsed: StatementFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid statement file {}", path.display()))?;

    Ok(match parsed {
        StatementFile::Wrapped {
            filename,
            transactions,
        } => (filename, transactions),
        StatementFile::Bare(transactions) => (None, transactions),
    })
}

pub fn cmd_statements_import(
    db: &Database,
    user_id: i64,
    file: &Path,
    name: Option<&str>,
) -> Result<()> {
    println!("📥 Importing statement from {}...", file.display());

    let (embedded, transactions) = read_statement_file(file)?;
    let filename = name
        .map(str::to_string)
        .or(embedded)
        .or_else(|| {
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let statement = ingest_statement(db, db, user_id, &filename, &transactions)?;

    println!("✅ Stored statement #{} ({})", statement.id, statement.filename);
    println!("   Transactions: {}", statement.total_transactions);
    println!();
    println!(
        "Next: finsight insights run --statement {} --user {}",
        statement.id, user_id
    );

    Ok(())
}

pub fn cmd_statements_list(db: &Database, user_id: i64) -> Result<()> {
    let statements = db.list_statements(user_id)?;

    if statements.is_empty() {
        println!("No statements for user {}.", user_id);
        return Ok(());
    }

    println!("📄 Statements for user {}", user_id);
    println!();
    println!("{:>6}  {:<32}  {:>6}  Uploaded", "ID", "Filename", "Txns");
    println!("{}", "-".repeat(70));
    for s in statements {
        println!(
            "{:>6}  {:<32}  {:>6}  {}",
            s.id,
            truncate(&s.filename, 32),
            s.total_transactions,
            s.uploaded_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
