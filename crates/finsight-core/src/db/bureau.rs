//! Credit bureau report lifecycle
//!
//! Rows are created `pending` before the external call and move exactly once
//! to `completed` or `failed`. Every transition is guarded on the current
//! status so a terminal row is never rewritten.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, Database};
use crate::bureau::BureauScore;
use crate::error::{Error, Result};
use crate::models::{BureauReport, BureauReportStatus};

const REPORT_COLUMNS: &str = "id, user_id, status, credit_score, risk_band, enquiries_6m, \
     defaults_count, open_loans, trade_lines, error_message, requested_at, completed_at";

impl Database {
    /// Most recent completed report for the user requested at or after `since`
    pub fn find_fresh_bureau_report(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<BureauReport>> {
        let conn = self.conn()?;

        let sql = format!(
            r#"
            SELECT {} FROM bureau_reports
            WHERE user_id = ? AND status = 'completed' AND requested_at >= ?
            ORDER BY requested_at DESC, id DESC
            LIMIT 1
            "#,
            REPORT_COLUMNS
        );
        let report = conn
            .query_row(
                &sql,
                params![user_id, format_datetime(since)],
                Self::row_to_bureau_report,
            )
            .optional()?;

        Ok(report)
    }

    /// Record the intent to call the bureau
    pub fn create_pending_bureau_report(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO bureau_reports (user_id, status, requested_at) VALUES (?, 'pending', ?)",
            params![user_id, format_datetime(Utc::now())],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Move a pending report to completed with the bureau's answer
    pub fn complete_bureau_report(&self, id: i64, score: &BureauScore) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE bureau_reports
            SET status = 'completed',
                credit_score = ?,
                risk_band = ?,
                enquiries_6m = ?,
                defaults_count = ?,
                open_loans = ?,
                trade_lines = ?,
                error_message = NULL,
                completed_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
            params![
                score.score,
                score.risk_band,
                score.enquiries_6m,
                score.defaults,
                score.open_loans,
                score.trade_lines,
                format_datetime(Utc::now()),
                id
            ],
        )?;

        if updated == 0 {
            return Err(Error::InvalidData(format!(
                "Bureau report {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// Move a pending report to failed
    pub fn fail_bureau_report(&self, id: i64, message: &str) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE bureau_reports
            SET status = 'failed', error_message = ?, completed_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
            params![message, format_datetime(Utc::now()), id],
        )?;

        if updated == 0 {
            return Err(Error::InvalidData(format!(
                "Bureau report {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// Get a report owned by the given user
    pub fn get_bureau_report(&self, id: i64, user_id: i64) -> Result<Option<BureauReport>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM bureau_reports WHERE id = ? AND user_id = ?",
            REPORT_COLUMNS
        );
        let report = conn
            .query_row(&sql, params![id, user_id], Self::row_to_bureau_report)
            .optional()?;

        Ok(report)
    }

    /// List a user's reports, newest first
    pub fn list_bureau_reports(&self, user_id: i64) -> Result<Vec<BureauReport>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM bureau_reports WHERE user_id = ? ORDER BY requested_at DESC, id DESC",
            REPORT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], Self::row_to_bureau_report)?;

        let reports: std::result::Result<Vec<_>, _> = rows.collect();
        Ok(reports?)
    }

    /// Fail reports left pending by a process that died mid-check
    ///
    /// Only safe at startup, before any check can be in flight.
    pub fn recover_stuck_bureau_reports(&self) -> Result<usize> {
        let conn = self.conn()?;

        let count = conn.execute(
            r#"
            UPDATE bureau_reports
            SET status = 'failed',
                error_message = 'Check interrupted before completion',
                completed_at = ?
            WHERE status = 'pending'
            "#,
            params![format_datetime(Utc::now())],
        )?;

        Ok(count)
    }

    fn row_to_bureau_report(row: &rusqlite::Row) -> rusqlite::Result<BureauReport> {
        let status_str: String = row.get(2)?;
        let requested_at: String = row.get(10)?;
        let completed_at: Option<String> = row.get(11)?;

        let status = status_str.parse::<BureauReportStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(Error::InvalidData(e)),
            )
        })?;

        Ok(BureauReport {
            id: row.get(0)?,
            user_id: row.get(1)?,
            status,
            credit_score: row.get(3)?,
            risk_band: row.get(4)?,
            enquiries_6m: row.get(5)?,
            defaults_count: row.get(6)?,
            open_loans: row.get(7)?,
            trade_lines: row.get(8)?,
            error_message: row.get(9)?,
            requested_at: parse_datetime(&requested_at),
            completed_at: completed_at.map(|s| parse_datetime(&s)),
        })
    }
}
