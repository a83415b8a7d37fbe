//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `audit` - Audit log listing
//! - `bureau` - Credit bureau checks and report listing
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `insights` - Insight computation and listing
//! - `serve` - Web server command
//! - `statements` - Statement import and listing

pub mod audit;
pub mod bureau;
pub mod core;
pub mod insights;
pub mod serve;
pub mod statements;

// Re-export command functions for main.rs
pub use audit::*;
pub use bureau::*;
pub use core::*;
pub use insights::*;
pub use serve::*;
pub use statements::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
