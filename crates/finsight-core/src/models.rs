//! Data models for Finsight

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An uploaded bank statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub total_transactions: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// A statement together with its transactions in analytics order
#[derive(Debug, Clone, Serialize)]
pub struct StatementDetail {
    #[serde(flatten)]
    pub statement: Statement,
    pub transactions: Vec<Transaction>,
}

/// A single statement line. Positive amounts are inflows, negative are outflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub statement_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    /// Running balance as printed on the statement, if the bank supplied one
    pub balance: Option<Decimal>,
}

/// A transaction that has been parsed but not yet stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

impl NewTransaction {
    pub fn new(description: impl Into<String>, amount: Decimal, transaction_date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            amount,
            transaction_date,
            balance: None,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }
}

/// Lifecycle of a credit bureau report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BureauReportStatus {
    /// Row written, external call in flight
    Pending,
    Completed,
    Failed,
}

impl BureauReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BureauReportStatus::Pending => "pending",
            BureauReportStatus::Completed => "completed",
            BureauReportStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BureauReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BureauReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BureauReportStatus::Pending),
            "completed" => Ok(BureauReportStatus::Completed),
            "failed" => Ok(BureauReportStatus::Failed),
            _ => Err(format!("Unknown bureau report status: {}", s)),
        }
    }
}

/// A persisted credit bureau check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauReport {
    pub id: i64,
    pub user_id: i64,
    pub status: BureauReportStatus,
    pub credit_score: Option<i64>,
    pub risk_band: Option<String>,
    pub enquiries_6m: Option<i64>,
    #[serde(rename = "defaults")]
    pub defaults_count: Option<i64>,
    pub open_loans: Option<i64>,
    pub trade_lines: Option<i64>,
    pub error_message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
