//! Core types for the Insight Engine

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Qualitative warning raised by the analysis
///
/// Variants are declared in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskFlag {
    /// Outflow above 80% of income
    HighSpending,
    /// More than 10 outflows under 50
    FrequentSmallTransactions,
    /// Replayed balance went negative more than twice
    RepeatedNegativeBalance,
}

impl RiskFlag {
    pub fn label(&self) -> &'static str {
        match self {
            RiskFlag::HighSpending => "High spending relative to income",
            RiskFlag::FrequentSmallTransactions => {
                "Frequent small transactions (potential impulse spending)"
            }
            RiskFlag::RepeatedNegativeBalance => "Multiple negative balance occurrences",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of analysing a statement, before it is persisted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsightSummary {
    pub three_month_avg_income: Decimal,
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub net_amount: Decimal,
    /// Category label -> absolute outflow
    pub spend_buckets: BTreeMap<String, Decimal>,
    pub risk_flags: Vec<RiskFlag>,
}

/// A persisted insight for one statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    pub statement_id: i64,
    pub user_id: i64,
    pub three_month_avg_income: Decimal,
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub net_amount: Decimal,
    pub spend_buckets: BTreeMap<String, Decimal>,
    pub risk_flags: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
