//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_user_id, AppError, AppState};
use finsight_core::Insight;

#[derive(Debug, Deserialize)]
pub struct RunInsightsRequest {
    pub statement_id: i64,
}

/// POST /api/insights/run - Compute (or fetch) the insight for a statement
pub async fn run_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RunInsightsRequest>,
) -> Result<Json<Insight>, AppError> {
    let user_id = get_user_id(&headers)?;
    let insight = state.insights.compute_insights(req.statement_id, user_id)?;
    Ok(Json(insight))
}

/// GET /api/insights - List the caller's insights, newest first
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Insight>>, AppError> {
    let user_id = get_user_id(&headers)?;
    Ok(Json(state.insights.list_insights(user_id)?))
}

/// GET /api/insights/:id - A single insight
pub async fn get_insight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Insight>, AppError> {
    let user_id = get_user_id(&headers)?;
    Ok(Json(state.insights.get_insight(id, user_id)?))
}
