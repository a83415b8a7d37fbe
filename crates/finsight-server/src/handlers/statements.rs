//! Statement handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::{get_user_id, AppError, AppState};
use finsight_core::ingest_statement;
use finsight_core::models::{NewTransaction, Statement, StatementDetail};

/// Maximum transactions accepted in one upload
pub const MAX_STATEMENT_TRANSACTIONS: usize = 50_000;

#[derive(Debug, Deserialize)]
pub struct CreateStatementRequest {
    pub filename: String,
    #[serde(default)]
    pub transactions: Vec<NewTransaction>,
}

/// POST /api/statements - Store a parsed statement
pub async fn create_statement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateStatementRequest>,
) -> Result<(StatusCode, Json<Statement>), AppError> {
    let user_id = get_user_id(&headers)?;

    if req.transactions.len() > MAX_STATEMENT_TRANSACTIONS {
        return Err(AppError::bad_request(&format!(
            "Too many transactions (max {})",
            MAX_STATEMENT_TRANSACTIONS
        )));
    }

    let statement = ingest_statement(
        &state.db,
        &state.db,
        user_id,
        &req.filename,
        &req.transactions,
    )?;

    Ok((StatusCode::CREATED, Json(statement)))
}

/// GET /api/statements - List the caller's statements
pub async fn list_statements(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Statement>>, AppError> {
    let user_id = get_user_id(&headers)?;
    Ok(Json(state.db.list_statements(user_id)?))
}

/// GET /api/statements/:id - A statement with its transactions
pub async fn get_statement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<StatementDetail>, AppError> {
    let user_id = get_user_id(&headers)?;

    let statement = state
        .db
        .get_statement(id, user_id)?
        .ok_or_else(|| AppError::not_found(&format!("Statement {} not found", id)))?;
    let transactions = state.db.list_statement_transactions(id)?;

    Ok(Json(StatementDetail {
        statement,
        transactions,
    }))
}
