//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::{load_config, open_db};

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    config_path: Option<&Path>,
    cors_origins: Option<&str>,
) -> Result<()> {
    let bureau_config = load_config(config_path)?;
    let allowed_origins = parse_origins(cors_origins.unwrap_or_default());

    println!("🚀 Starting Finsight web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Credit bureau: {}", bureau_config.api_url);
    if bureau_config.api_key.is_none() {
        println!("   ⚠️  No bureau API key configured (set FINSIGHT_BUREAU_API_KEY)");
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = finsight_server::ServerConfig { allowed_origins };
    finsight_server::serve_with_config(db, host, port, bureau_config, config).await?;

    Ok(())
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
