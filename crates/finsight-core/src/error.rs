//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal failure of a credit bureau check. The message is the same
    /// description stored on the failed report row.
    #[error("Credit bureau check failed: {0}")]
    Bureau(String),
}

impl Error {
    /// True for errors caused by the caller's input or environment rather
    /// than by infrastructure (used to pick a 4xx over a 5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Config(_) | Error::Bureau(_) | Error::InvalidData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
