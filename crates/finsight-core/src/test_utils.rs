//! Test utilities for finsight-core
//!
//! Provides a mock credit bureau server for exercising the real HTTP client
//! in integration tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::bureau::MockBureauClient;

/// Route the mock bureau serves
pub const CHECK_PATH: &str = "/v1/credit/check";

/// Key the mock bureau accepts
pub const MOCK_API_KEY: &str = "mock-bureau-key";

#[derive(Default)]
struct MockState {
    /// Status codes to return before succeeding
    failures: Mutex<VecDeque<u16>>,
    calls: AtomicUsize,
}

/// Mock credit bureau server for testing
pub struct MockBureauServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBureauServer {
    /// Start a server that always succeeds
    pub async fn start() -> Self {
        Self::start_with_failures(&[]).await
    }

    /// Start a server that answers with `statuses` first, then succeeds
    pub async fn start_with_failures(statuses: &[u16]) -> Self {
        let state = Arc::new(MockState {
            failures: Mutex::new(statuses.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route(CHECK_PATH, post(handle_check))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Full URL of the check endpoint
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, CHECK_PATH)
    }

    /// Requests received so far (including rejected ones)
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBureauServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_check(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(MOCK_API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response();
    }

    let next_failure = state.failures.lock().unwrap().pop_front();
    match next_failure {
        Some(429) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"message": "Rate limit exceeded"})),
        )
            .into_response(),
        // Bare 502 without a body exercises the "Unknown error" fallback
        Some(502) => StatusCode::BAD_GATEWAY.into_response(),
        Some(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({"message": "Service temporarily unavailable"}))).into_response()
        }
        None => Json(MockBureauClient::default_score()).into_response(),
    }
}
