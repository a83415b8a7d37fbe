//! Credit bureau handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{get_user_id, AppError, AppState};
use finsight_core::models::BureauReport;

/// POST /api/bureau/check - Run (or reuse) a credit bureau check
///
/// The check runs on its own task: if the client disconnects mid-retry the
/// report is still finalized.
pub async fn check_credit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BureauReport>, AppError> {
    let user_id = get_user_id(&headers)?;

    let bureau = state.bureau.clone();
    let report = tokio::spawn(async move { bureau.check_credit(user_id).await }).await??;

    Ok(Json(report))
}

/// GET /api/bureau/reports - List the caller's reports, newest first
pub async fn list_bureau_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BureauReport>>, AppError> {
    let user_id = get_user_id(&headers)?;
    Ok(Json(state.bureau.list_bureau_reports(user_id)?))
}

/// GET /api/bureau/reports/:id - A single report
pub async fn get_bureau_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<BureauReport>, AppError> {
    let user_id = get_user_id(&headers)?;
    Ok(Json(state.bureau.get_bureau_report(id, user_id)?))
}
