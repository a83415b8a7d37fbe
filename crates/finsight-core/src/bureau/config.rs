//! Credit bureau configuration
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file: explicit path, or `<data dir>/finsight/config.toml`
//! 3. Environment variables (`FINSIGHT_BUREAU_*`)

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

pub const API_URL_ENV: &str = "FINSIGHT_BUREAU_API_URL";
pub const API_KEY_ENV: &str = "FINSIGHT_BUREAU_API_KEY";
pub const TIMEOUT_MS_ENV: &str = "FINSIGHT_BUREAU_TIMEOUT_MS";
pub const MAX_RETRIES_ENV: &str = "FINSIGHT_BUREAU_MAX_RETRIES";
pub const CACHE_TTL_HOURS_ENV: &str = "FINSIGHT_BUREAU_CACHE_TTL_HOURS";

/// Settings for the credit bureau integration
#[derive(Debug, Clone, PartialEq)]
pub struct BureauConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts per check
    pub max_retries: u32,
    /// How long a completed report is reused
    pub cache_ttl: Duration,
}

impl Default for BureauConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4000/v1/credit/check".to_string(),
            api_key: None,
            timeout: Duration::from_millis(10_000),
            max_retries: 3,
            cache_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl BureauConfig {
    /// Defaults with an explicit endpoint and key
    pub fn for_endpoint(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Resolve configuration from embedded defaults, an override file and the environment
    ///
    /// An explicit `path` must exist; the default override location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = parse_config(DEFAULT_CONFIG, Self::default())?;

        match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                config = parse_config(&content, config)?;
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    if default_path.exists() {
                        let content = fs::read_to_string(&default_path).map_err(|e| {
                            Error::Config(format!(
                                "Failed to read config {}: {}",
                                default_path.display(),
                                e
                            ))
                        })?;
                        config = parse_config(&content, config)?;
                    }
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(ms) = lookup(TIMEOUT_MS_ENV) {
            self.timeout = Duration::from_millis(parse_env_number(TIMEOUT_MS_ENV, &ms)?);
        }
        if let Some(n) = lookup(MAX_RETRIES_ENV) {
            self.max_retries = parse_env_number(MAX_RETRIES_ENV, &n)?;
        }
        if let Some(hours) = lookup(CACHE_TTL_HOURS_ENV) {
            self.cache_ttl = ttl_from_hours(parse_env_number(CACHE_TTL_HOURS_ENV, &hours)?)?;
        }
        Ok(())
    }

    /// Refuse to call the bureau without an endpoint and a key
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config(
                "Credit bureau API URL is not configured".to_string(),
            ));
        }
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(Error::Config(format!(
                "Credit bureau API key is not configured (set {})",
                API_KEY_ENV
            ))),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config.toml"))
}

fn parse_env_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        Error::Config(format!(
            "{} must be a non-negative integer in range, got {:?}",
            name, value
        ))
    })
}

fn ttl_from_hours(hours: u64) -> Result<Duration> {
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::Config(format!("Cache TTL of {} hours is too large", hours)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    bureau: Option<RawBureau>,
}

#[derive(Debug, Deserialize)]
struct RawBureau {
    api_url: Option<String>,
    api_key: Option<String>,
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
    cache_ttl_hours: Option<u64>,
}

/// Layer TOML content over an existing config
fn parse_config(content: &str, mut config: BureauConfig) -> Result<BureauConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    if let Some(bureau) = raw.bureau {
        if let Some(url) = bureau.api_url {
            config.api_url = url;
        }
        if let Some(key) = bureau.api_key {
            config.api_key = Some(key);
        }
        if let Some(ms) = bureau.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = bureau.max_retries {
            config.max_retries = n;
        }
        if let Some(hours) = bureau.cache_ttl_hours {
            config.cache_ttl = ttl_from_hours(hours)?;
        }
    }

    Ok(config)
}
