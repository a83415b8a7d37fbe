//! Mock bureau client for testing
//!
//! Replays a scripted sequence of outcomes and counts calls. Once the
//! script runs out every call succeeds with [`MockBureauClient::default_score`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{BureauCallError, BureauClient, BureauScore};

type Outcome = std::result::Result<BureauScore, BureauCallError>;

/// Scripted bureau client
#[derive(Debug, Default)]
pub struct MockBureauClient {
    script: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
}

impl MockBureauClient {
    /// A client that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that replays `outcomes` in order
    pub fn with_script(outcomes: Vec<Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience: fail with these HTTP statuses, then succeed
    pub fn failing_with(statuses: &[u16]) -> Self {
        Self::with_script(
            statuses
                .iter()
                .map(|&status| {
                    Err(BureauCallError::Status {
                        status,
                        message: format!("Mock failure {}", status),
                    })
                })
                .collect(),
        )
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn default_score() -> BureauScore {
        BureauScore {
            score: 720,
            risk_band: "LOW".to_string(),
            enquiries_6m: 1,
            defaults: 0,
            open_loans: 2,
            trade_lines: 5,
        }
    }
}

#[async_trait]
impl BureauClient for MockBureauClient {
    async fn fetch_score(&self) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_score()))
    }
}
