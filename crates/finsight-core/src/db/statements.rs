//! Statement and transaction operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{
    date_column, decimal_column, format_datetime, optional_decimal_column, parse_datetime,
    Database,
};
use crate::error::Result;
use crate::models::{NewTransaction, Statement, Transaction};

impl Database {
    /// Store a statement and all of its transactions atomically
    pub fn create_statement(
        &self,
        user_id: i64,
        filename: &str,
        transactions: &[NewTransaction],
    ) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO statements (user_id, filename, total_transactions, uploaded_at)
            VALUES (?, ?, ?, ?)
            "#,
            params![
                user_id,
                filename,
                transactions.len() as i64,
                format_datetime(Utc::now())
            ],
        )?;
        let statement_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (statement_id, description, amount, transaction_date, balance)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )?;
            for t in transactions {
                stmt.execute(params![
                    statement_id,
                    t.description,
                    t.amount.to_string(),
                    t.transaction_date.format("%Y-%m-%d").to_string(),
                    t.balance.map(|b| b.to_string()),
                ])?;
            }
        }

        tx.commit()?;
        Ok(statement_id)
    }

    /// Get a statement owned by the given user
    pub fn get_statement(&self, id: i64, user_id: i64) -> Result<Option<Statement>> {
        let conn = self.conn()?;

        let statement = conn
            .query_row(
                r#"
                SELECT id, user_id, filename, total_transactions, uploaded_at
                FROM statements
                WHERE id = ? AND user_id = ?
                "#,
                params![id, user_id],
                Self::row_to_statement,
            )
            .optional()?;

        Ok(statement)
    }

    /// List a user's statements, newest first
    pub fn list_statements(&self, user_id: i64) -> Result<Vec<Statement>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, filename, total_transactions, uploaded_at
            FROM statements
            WHERE user_id = ?
            ORDER BY uploaded_at DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map(params![user_id], Self::row_to_statement)?;
        let statements: std::result::Result<Vec<_>, _> = rows.collect();
        Ok(statements?)
    }

    /// Transactions of a statement in analytics order (date ascending, then insertion order)
    pub fn list_statement_transactions(&self, statement_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, statement_id, description, amount, transaction_date, balance
            FROM transactions
            WHERE statement_id = ?
            ORDER BY transaction_date ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![statement_id], Self::row_to_transaction)?;
        let transactions: std::result::Result<Vec<_>, _> = rows.collect();
        Ok(transactions?)
    }

    fn row_to_statement(row: &rusqlite::Row) -> rusqlite::Result<Statement> {
        let uploaded_at: String = row.get(4)?;
        Ok(Statement {
            id: row.get(0)?,
            user_id: row.get(1)?,
            filename: row.get(2)?,
            total_transactions: row.get(3)?,
            uploaded_at: parse_datetime(&uploaded_at),
        })
    }

    /// Column order: id, statement_id, description, amount, transaction_date, balance
    fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        Ok(Transaction {
            id: row.get(0)?,
            statement_id: row.get(1)?,
            description: row.get(2)?,
            amount: decimal_column(row, 3)?,
            transaction_date: date_column(row, 4)?,
            balance: optional_decimal_column(row, 5)?,
        })
    }
}
