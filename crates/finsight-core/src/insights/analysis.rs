//! Pure statement analysis
//!
//! Every function here takes transactions and returns numbers; nothing
//! touches the database. Inputs are re-sorted by date (stable, so ties keep
//! their given order) wherever order matters. Sums use checked arithmetic:
//! amounts whose totals leave the decimal range yield `Error::InvalidData`.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::categorize::categorize;
use super::types::{InsightSummary, RiskFlag};
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Number of most recent income months averaged
pub const INCOME_WINDOW_MONTHS: usize = 3;
/// Outflow above this share of income raises [`RiskFlag::HighSpending`]
pub const HIGH_SPENDING_RATIO: Decimal = dec!(0.8);
/// Outflows strictly below this magnitude count as small
pub const SMALL_TRANSACTION_LIMIT: Decimal = dec!(50);
/// More small outflows than this raises [`RiskFlag::FrequentSmallTransactions`]
pub const SMALL_TRANSACTION_COUNT: usize = 10;
/// More negative balances than this raises [`RiskFlag::RepeatedNegativeBalance`]
pub const NEGATIVE_BALANCE_COUNT: usize = 2;

/// Inflow, outflow and net for a set of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub inflow: Decimal,
    /// Magnitude of all outflows
    pub outflow: Decimal,
    pub net: Decimal,
}

fn out_of_range() -> Error {
    Error::InvalidData("Statement amounts exceed the supported range".to_string())
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn totals(transactions: &[Transaction]) -> Result<Totals> {
    let mut inflow = Decimal::ZERO;
    let mut spent = Decimal::ZERO;
    for t in transactions {
        if t.amount > Decimal::ZERO {
            inflow = add(inflow, t.amount)?;
        } else if t.amount < Decimal::ZERO {
            spent = add(spent, t.amount)?;
        }
    }
    Ok(Totals {
        inflow,
        outflow: spent.abs(),
        net: add(inflow, spent)?,
    })
}

/// Average monthly income over the most recent months that had income
///
/// Months without any positive amount are skipped rather than counted as
/// zero. The result is rounded to a whole unit, halves away from zero.
pub fn trailing_income_average(transactions: &[Transaction]) -> Result<Decimal> {
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.amount > Decimal::ZERO) {
        let key = (t.transaction_date.year(), t.transaction_date.month());
        let month = by_month.entry(key).or_default();
        *month = add(*month, t.amount)?;
    }

    let recent: Vec<Decimal> = by_month
        .values()
        .rev()
        .take(INCOME_WINDOW_MONTHS)
        .copied()
        .collect();
    if recent.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let sum = recent
        .iter()
        .try_fold(Decimal::ZERO, |acc, month| add(acc, *month))?;
    let average = sum
        .checked_div(Decimal::from(recent.len()))
        .ok_or_else(out_of_range)?;
    Ok(average.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Absolute outflow per category label
pub fn spend_buckets(transactions: &[Transaction]) -> Result<BTreeMap<String, Decimal>> {
    let mut buckets: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.amount < Decimal::ZERO) {
        let category = categorize(&t.description);
        let bucket = buckets.entry(category.label().to_string()).or_default();
        *bucket = add(*bucket, t.amount.abs())?;
    }
    Ok(buckets)
}

/// Risk flags in reporting order
pub fn risk_flags(transactions: &[Transaction]) -> Result<Vec<RiskFlag>> {
    let mut flags = Vec::new();
    let t = totals(transactions)?;

    let spending_limit = t
        .inflow
        .checked_mul(HIGH_SPENDING_RATIO)
        .ok_or_else(out_of_range)?;
    if t.outflow > spending_limit {
        flags.push(RiskFlag::HighSpending);
    }

    let small = transactions
        .iter()
        .filter(|t| t.amount < Decimal::ZERO && t.amount.abs() < SMALL_TRANSACTION_LIMIT)
        .count();
    if small > SMALL_TRANSACTION_COUNT {
        flags.push(RiskFlag::FrequentSmallTransactions);
    }

    if negative_balance_count(transactions)? > NEGATIVE_BALANCE_COUNT {
        flags.push(RiskFlag::RepeatedNegativeBalance);
    }

    Ok(flags)
}

/// Replay amounts chronologically from zero and count negative balances
///
/// The statement's own `balance` column is ignored. A balance of exactly
/// zero is not negative.
pub fn negative_balance_count(transactions: &[Transaction]) -> Result<usize> {
    let mut running = Decimal::ZERO;
    let mut count = 0;
    for t in chronological(transactions) {
        running = add(running, t.amount)?;
        if running < Decimal::ZERO {
            count += 1;
        }
    }
    Ok(count)
}

/// Full analysis of one statement
pub fn summarize(transactions: &[Transaction]) -> Result<InsightSummary> {
    let t = totals(transactions)?;
    Ok(InsightSummary {
        three_month_avg_income: trailing_income_average(transactions)?,
        total_inflow: t.inflow,
        total_outflow: t.outflow,
        net_amount: t.net,
        spend_buckets: spend_buckets(transactions)?,
        risk_flags: risk_flags(transactions)?,
    })
}

fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.transaction_date);
    sorted
}
