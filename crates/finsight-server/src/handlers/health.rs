//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub bureau_configured: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /api/health - Service and database status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.ping().is_ok();
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        bureau_configured: state.bureau.config().validate().is_ok(),
        timestamp: chrono::Utc::now(),
    })
}
