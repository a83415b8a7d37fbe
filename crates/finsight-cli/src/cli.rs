//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Statement insights and credit checks
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Financial risk and insights pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "finsight.db", global = true)]
    pub db: PathBuf,

    /// Configuration file (defaults to <data dir>/finsight/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FINSIGHT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origins (comma-separated)
        #[arg(long)]
        cors_origins: Option<String>,
    },

    /// Manage uploaded statements
    Statements {
        #[command(subcommand)]
        action: StatementsAction,
    },

    /// Compute and view statement insights
    Insights {
        #[command(subcommand)]
        action: InsightsAction,
    },

    /// Run and view credit bureau checks
    Bureau {
        #[command(subcommand)]
        action: BureauAction,
    },

    /// Show a user's audit log
    Audit {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum StatementsAction {
    /// Import a statement from a JSON file of normalized transactions
    Import {
        /// JSON file: an array of transactions or {"filename", "transactions"}
        #[arg(short, long)]
        file: PathBuf,

        /// Owning user id
        #[arg(short, long)]
        user: i64,

        /// Statement name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// List a user's statements
    List {
        /// User id
        #[arg(short, long)]
        user: i64,
    },
}

#[derive(Subcommand)]
pub enum InsightsAction {
    /// Compute the insight for a statement (returns the stored one if present)
    Run {
        /// Statement id
        #[arg(short, long)]
        statement: i64,

        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// List a user's insights
    List {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// Show one insight in detail
    Show {
        /// Insight id
        id: i64,

        /// User id
        #[arg(short, long)]
        user: i64,
    },
}

#[derive(Subcommand)]
pub enum BureauAction {
    /// Run a credit bureau check (reuses a recent completed report)
    Check {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// List a user's bureau reports
    Reports {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// Show one bureau report
    Show {
        /// Report id
        id: i64,

        /// User id
        #[arg(short, long)]
        user: i64,
    },
}
