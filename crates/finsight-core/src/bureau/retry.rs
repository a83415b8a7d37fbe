//! Retry policy and the sleeper used between attempts

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::BureauCallError;

/// How many times to call the bureau and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

/// First backoff unit; attempt `n` waits `BASE_DELAY * 2^n`
const BASE_DELAY: Duration = Duration::from_secs(1);

impl RetryPolicy {
    /// Policy with exponential backoff from a one second base
    ///
    /// `max_attempts` of zero is treated as one: a check always calls at least once.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^attempt`
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        BASE_DELAY.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Network errors, 5xx and 429 are worth another attempt
    pub fn is_retryable(&self, error: &BureauCallError) -> bool {
        match error {
            BureauCallError::Network(_) => true,
            BureauCallError::Status { status, .. } => *status >= 500 || *status == 429,
            BureauCallError::Decode(_) => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Waits between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately and remembers what it was asked to wait
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested duration, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}
