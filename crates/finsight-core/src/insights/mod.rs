//! Insight Engine - statement analytics
//!
//! Turns the transactions of one statement into a persisted [`Insight`]:
//!
//! - **Trailing income average** - mean of the most recent (up to) three
//!   months that had income
//! - **Totals** - inflow, outflow and net, in exact decimal arithmetic
//! - **Spend buckets** - outflows grouped by an ordered keyword rule table
//! - **Risk flags** - qualitative warnings in a fixed order
//!
//! The analysis itself lives in [`analysis`] and is pure; [`InsightEngine`]
//! adds the read-before-write persistence and the audit event.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finsight_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(db.clone(), Arc::new(db.clone()));
//! let insight = engine.compute_insights(statement_id, user_id)?;
//! ```

pub mod analysis;
pub mod categorize;
pub mod engine;
pub mod types;

pub use analysis::summarize;
pub use categorize::{categorize, SpendCategory};
pub use engine::InsightEngine;
pub use types::{Insight, InsightSummary, RiskFlag};
