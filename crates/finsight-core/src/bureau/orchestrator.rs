//! Bureau Check Orchestrator
//!
//! `check_credit` runs a durable state machine per user:
//!
//! 1. Return a completed report younger than the cache TTL, if any
//! 2. Refuse to continue without an endpoint and key
//! 3. Write a `pending` row
//! 4. Call the bureau under the retry policy
//! 5. Move the row to `completed` or `failed`
//!
//! Steps 1-5 run under a per-user lock so concurrent checks for one user
//! make a single external call. A user's lock entry is dropped once no
//! check holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use super::client::{BureauClient, BureauFailure, BureauScore, HttpBureauClient};
use super::config::BureauConfig;
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::BureauReport;

/// Runs and serves credit bureau checks
#[derive(Clone)]
pub struct BureauOrchestrator {
    db: Database,
    config: BureauConfig,
    client: Arc<dyn BureauClient>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    audit: Arc<dyn AuditSink>,
    locks: UserLocks,
}

type UserLocks = Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>;

/// Shared handle on one user's lock; removes the map entry when the last
/// handle goes away
struct UserLockLease {
    locks: UserLocks,
    user_id: i64,
    lock: Arc<AsyncMutex<()>>,
}

impl UserLockLease {
    fn acquire(locks: &UserLocks, user_id: i64) -> Self {
        let lock = locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(user_id)
            .or_default()
            .clone();
        Self {
            locks: locks.clone(),
            user_id,
            lock,
        }
    }
}

impl Drop for UserLockLease {
    fn drop(&mut self) {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Handles are only cloned under the map lock: two means the map and us
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.user_id);
        }
    }
}

impl BureauOrchestrator {
    /// Orchestrator talking to the configured HTTP endpoint
    pub fn new(db: Database, config: BureauConfig, audit: Arc<dyn AuditSink>) -> Result<Self> {
        let client = Arc::new(HttpBureauClient::new(&config)?);
        Ok(Self::with_client(db, config, client, audit))
    }

    /// Orchestrator with an explicit client (mock or real)
    pub fn with_client(
        db: Database,
        config: BureauConfig,
        client: Arc<dyn BureauClient>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let policy = RetryPolicy::new(config.max_retries);
        Self {
            db,
            config,
            client,
            policy,
            sleeper: Arc::new(TokioSleeper),
            audit,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &BureauConfig {
        &self.config
    }

    /// Return a fresh cached report or run a new bureau check
    pub async fn check_credit(&self, user_id: i64) -> Result<BureauReport> {
        let lease = UserLockLease::acquire(&self.locks, user_id);
        let _guard = lease.lock.lock().await;

        if let Some(report) = self.db.find_fresh_bureau_report(user_id, self.cache_cutoff()?)? {
            debug!(user_id, report_id = report.id, "Returning cached bureau report");
            return Ok(report);
        }

        self.config.validate()?;

        let report_id = self.db.create_pending_bureau_report(user_id)?;
        info!(user_id, report_id, "Starting credit bureau check");

        let outcome = self.call_with_retries(user_id).await;
        self.finalize(report_id, user_id, outcome)
    }

    /// Get a report owned by the user
    pub fn get_bureau_report(&self, id: i64, user_id: i64) -> Result<BureauReport> {
        self.db
            .get_bureau_report(id, user_id)?
            .ok_or_else(|| Error::NotFound(format!("Bureau report {}", id)))
    }

    /// A user's reports, newest first
    pub fn list_bureau_reports(&self, user_id: i64) -> Result<Vec<BureauReport>> {
        self.db.list_bureau_reports(user_id)
    }

    fn cache_cutoff(&self) -> Result<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.config.cache_ttl)
            .map_err(|e| Error::Config(format!("Invalid cache TTL: {}", e)))?;
        Ok(Utc::now()
            .checked_sub_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    async fn call_with_retries(&self, user_id: i64) -> std::result::Result<BureauScore, BureauFailure> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            debug!(user_id, attempt, max_attempts, "Calling credit bureau");
            match self.client.fetch_score().await {
                Ok(score) => return Ok(score),
                Err(e) if !self.policy.is_retryable(&e) => {
                    return Err(BureauFailure::Permanent(e));
                }
                Err(e) if attempt >= max_attempts => {
                    return Err(BureauFailure::Exhausted {
                        attempts: max_attempts,
                        last: e,
                    });
                }
                Err(e) => {
                    let delay = self.policy.backoff_for_attempt(attempt);
                    warn!(
                        user_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Bureau call failed, retrying: {}",
                        e
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn finalize(
        &self,
        report_id: i64,
        user_id: i64,
        outcome: std::result::Result<BureauScore, BureauFailure>,
    ) -> Result<BureauReport> {
        let score = match outcome {
            Ok(score) => score,
            Err(failure) => {
                let message = failure.to_string();
                warn!(user_id, report_id, "Credit bureau check failed: {}", message);
                if let Err(e) = self.db.fail_bureau_report(report_id, &message) {
                    error!(user_id, report_id, "Failed to mark report failed: {}", e);
                }
                return Err(Error::Bureau(message));
            }
        };

        if let Err(e) = self.db.complete_bureau_report(report_id, &score) {
            error!(user_id, report_id, "Failed to store bureau result: {}", e);
            if let Err(fail_err) = self
                .db
                .fail_bureau_report(report_id, &format!("Failed to store bureau result: {}", e))
            {
                error!(user_id, report_id, "Failed to mark report failed: {}", fail_err);
            }
            return Err(e);
        }

        let report = self.get_bureau_report(report_id, user_id)?;
        info!(
            user_id,
            report_id,
            credit_score = score.score,
            "Credit bureau check completed"
        );

        self.audit.record(
            AuditEvent::new(user_id, AuditAction::Compute, "bureau_report")
                .with_resource_id(report_id)
                .with_details(json!({
                    "credit_score": score.score,
                    "risk_band": score.risk_band,
                    "status": "completed",
                })),
        );

        Ok(report)
    }
}
