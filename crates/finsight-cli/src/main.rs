//! Finsight CLI - Statement insights and credit checks
//!
//! Usage:
//!   finsight init                                   Initialize database
//!   finsight statements import --file s.json -u 1   Store a parsed statement
//!   finsight insights run --statement 1 -u 1        Compute statement insights
//!   finsight bureau check -u 1                      Run a credit bureau check
//!   finsight serve --port 3000                      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            cors_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                cli.no_encrypt,
                cli.config.as_deref(),
                cors_origins.as_deref(),
            )
            .await
        }
        Commands::Statements { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                StatementsAction::Import { file, user, name } => {
                    commands::cmd_statements_import(&db, user, &file, name.as_deref())
                }
                StatementsAction::List { user } => commands::cmd_statements_list(&db, user),
            }
        }
        Commands::Insights { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                InsightsAction::Run { statement, user } => {
                    commands::cmd_insights_run(&db, statement, user)
                }
                InsightsAction::List { user } => commands::cmd_insights_list(&db, user),
                InsightsAction::Show { id, user } => commands::cmd_insights_show(&db, id, user),
            }
        }
        Commands::Bureau { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                BureauAction::Check { user } => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_bureau_check(&db, config, user).await
                }
                BureauAction::Reports { user } => commands::cmd_bureau_reports(&db, user),
                BureauAction::Show { id, user } => commands::cmd_bureau_show(&db, id, user),
            }
        }
        Commands::Audit { user, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, user, limit)
        }
    }
}
