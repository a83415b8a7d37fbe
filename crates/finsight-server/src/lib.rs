//! Finsight Web Server
//!
//! Axum-based REST API for the Finsight insights pipeline.
//!
//! - User identity comes from the `X-User-Id` header set by the upstream
//!   authentication proxy
//! - Restrictive CORS policy and security headers
//! - Sanitized error responses (infrastructure details are only logged)
//! - Credit bureau checks run on a spawned task so a dropped client does not
//!   cancel in-flight retries

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use finsight_core::{BureauConfig, BureauOrchestrator, Database, InsightEngine};

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the authenticated user's numeric id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub insights: InsightEngine,
    pub bureau: BureauOrchestrator,
}

/// Extract the caller's user id from request headers
pub fn get_user_id(headers: &HeaderMap) -> Result<i64, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::unauthorized("Missing or invalid X-User-Id header"))
}

/// Create the application router talking to the configured credit bureau
pub fn create_router(
    db: Database,
    bureau_config: BureauConfig,
    config: ServerConfig,
) -> anyhow::Result<Router> {
    let orchestrator = BureauOrchestrator::new(db.clone(), bureau_config, Arc::new(db.clone()))?;
    Ok(create_router_with_orchestrator(db, orchestrator, config))
}

/// Create the application router with an explicit orchestrator (for testing)
pub fn create_router_with_orchestrator(
    db: Database,
    bureau: BureauOrchestrator,
    config: ServerConfig,
) -> Router {
    let insights = InsightEngine::new(db.clone(), Arc::new(db.clone()));

    let state = Arc::new(AppState {
        db,
        insights,
        bureau,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Statements
        .route(
            "/statements",
            get(handlers::list_statements).post(handlers::create_statement),
        )
        .route("/statements/:id", get(handlers::get_statement))
        // Insights
        .route("/insights", get(handlers::list_insights))
        .route("/insights/run", post(handlers::run_insights))
        .route("/insights/:id", get(handlers::get_insight))
        // Credit bureau
        .route("/bureau/check", post(handlers::check_credit))
        .route("/bureau/reports", get(handlers::list_bureau_reports))
        .route("/bureau/reports/:id", get(handlers::get_bureau_report))
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    let user_header = HeaderName::from_static(USER_ID_HEADER);
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, user_header])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, user_header])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    bureau_config: BureauConfig,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, bureau_config, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    bureau_config: BureauConfig,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Finalize checks that were interrupted by a previous shutdown
    match db.recover_stuck_bureau_reports() {
        Ok(count) if count > 0 => {
            warn!(
                "Recovered {} stuck bureau report(s) from previous server session",
                count
            );
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to recover stuck bureau reports: {}", e);
        }
    }

    if let Err(e) = bureau_config.validate() {
        warn!("Credit bureau checks will be refused: {}", e);
    } else {
        info!("Credit bureau endpoint: {}", bureau_config.api_url);
    }

    let app = create_router(db, bureau_config, config)?;
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Domain errors are safe to show; everything else is logged only
        if let Some(core) = err.downcast_ref::<finsight_core::Error>() {
            match core {
                finsight_core::Error::NotFound(_) => return Self::not_found(&core.to_string()),
                e if e.is_client_error() => return Self::bad_request(&core.to_string()),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
