//! Credit bureau integration
//!
//! - [`config`] - endpoint, key, timeout, retry and cache settings
//! - [`client`] - the [`BureauClient`] seam and its HTTP implementation
//! - [`retry`] - pure retry policy and the injectable [`Sleeper`]
//! - [`orchestrator`] - cache check, pending row, retried call, finalize
//! - [`mock`] - scripted client for tests

pub mod client;
pub mod config;
pub mod mock;
pub mod orchestrator;
pub mod retry;

pub use client::{BureauCallError, BureauClient, BureauFailure, BureauScore, HttpBureauClient};
pub use config::BureauConfig;
pub use mock::MockBureauClient;
pub use orchestrator::BureauOrchestrator;
pub use retry::{RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
