//! Insight persistence

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{decimal_column, format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::insights::{Insight, InsightSummary};

const INSIGHT_COLUMNS: &str = "id, statement_id, user_id, three_month_avg_income, total_inflow, \
     total_outflow, net_amount, spend_buckets, risk_flags, generated_at";

impl Database {
    /// Find the insight already computed for (statement, user)
    pub fn find_insight_for_statement(
        &self,
        statement_id: i64,
        user_id: i64,
    ) -> Result<Option<Insight>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM insights WHERE statement_id = ? AND user_id = ?",
            INSIGHT_COLUMNS
        );
        let insight = conn
            .query_row(&sql, params![statement_id, user_id], Self::row_to_insight)
            .optional()?;

        Ok(insight)
    }

    /// Insert a computed insight
    ///
    /// Returns `None` when an insight for (statement, user) already exists;
    /// the existing row is left untouched.
    pub fn insert_insight(
        &self,
        statement_id: i64,
        user_id: i64,
        summary: &InsightSummary,
    ) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let buckets_json = serde_json::to_string(&summary.spend_buckets)?;
        let flags: Vec<&str> = summary.risk_flags.iter().map(|f| f.label()).collect();
        let flags_json = serde_json::to_string(&flags)?;

        let inserted = conn.execute(
            r#"
            INSERT INTO insights (
                statement_id, user_id, three_month_avg_income, total_inflow, total_outflow,
                net_amount, spend_buckets, risk_flags, generated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(statement_id, user_id) DO NOTHING
            "#,
            params![
                statement_id,
                user_id,
                summary.three_month_avg_income.to_string(),
                summary.total_inflow.to_string(),
                summary.total_outflow.to_string(),
                summary.net_amount.to_string(),
                buckets_json,
                flags_json,
                format_datetime(Utc::now()),
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get an insight owned by the given user
    pub fn get_insight(&self, id: i64, user_id: i64) -> Result<Option<Insight>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM insights WHERE id = ? AND user_id = ?",
            INSIGHT_COLUMNS
        );
        let insight = conn
            .query_row(&sql, params![id, user_id], Self::row_to_insight)
            .optional()?;

        Ok(insight)
    }

    /// List a user's insights, newest first
    pub fn list_insights(&self, user_id: i64) -> Result<Vec<Insight>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM insights WHERE user_id = ? ORDER BY generated_at DESC, id DESC",
            INSIGHT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], Self::row_to_insight)?;

        let insights: std::result::Result<Vec<_>, _> = rows.collect();
        Ok(insights?)
    }

    fn row_to_insight(row: &rusqlite::Row) -> rusqlite::Result<Insight> {
        let buckets_json: String = row.get(7)?;
        let flags_json: String = row.get(8)?;
        let generated_at: String = row.get(9)?;

        let spend_buckets: BTreeMap<String, rust_decimal::Decimal> =
            serde_json::from_str(&buckets_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
            })?;
        let risk_flags: Vec<String> = serde_json::from_str(&flags_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Insight {
            id: row.get(0)?,
            statement_id: row.get(1)?,
            user_id: row.get(2)?,
            three_month_avg_income: decimal_column(row, 3)?,
            total_inflow: decimal_column(row, 4)?,
            total_outflow: decimal_column(row, 5)?,
            net_amount: decimal_column(row, 6)?,
            spend_buckets,
            risk_flags,
            generated_at: parse_datetime(&generated_at),
        })
    }
}
