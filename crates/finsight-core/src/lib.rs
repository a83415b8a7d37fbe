//! Finsight Core Library
//!
//! Shared functionality for the Finsight insights pipeline:
//! - Database access and migrations (statements, insights, bureau reports, audit log)
//! - Insight engine: income averages, totals, spend buckets, risk flags
//! - Credit bureau orchestrator with caching, retries and a durable
//!   pending -> completed/failed state machine
//! - Statement ingestion of normalized transactions
//! - Audit sink invoked after each state-changing operation

pub mod audit;
pub mod bureau;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod statements;

/// Test utilities including a mock credit bureau server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use audit::{AuditAction, AuditEvent, AuditSink};
pub use bureau::{
    BureauCallError, BureauClient, BureauConfig, BureauFailure, BureauOrchestrator, BureauScore,
    HttpBureauClient, MockBureauClient, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper,
};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use insights::{Insight, InsightEngine, InsightSummary, RiskFlag, SpendCategory};
pub use statements::ingest_statement;
