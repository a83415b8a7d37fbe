//! Credit bureau HTTP client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::config::BureauConfig;
use crate::error::Result;

/// A successful bureau answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BureauScore {
    pub score: i64,
    pub risk_band: String,
    pub enquiries_6m: i64,
    pub defaults: i64,
    pub open_loans: i64,
    pub trade_lines: i64,
}

/// Failure of a single bureau call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BureauCallError {
    /// Connection, timeout or other transport failure
    #[error("{0}")]
    Network(String),

    /// Bureau answered with a non-success status
    #[error("Bureau API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Success status but the body was not a score
    #[error("Invalid bureau response: {0}")]
    Decode(String),
}

/// Terminal outcome of a check after the retry policy gave up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BureauFailure {
    /// Not worth retrying; surfaced after the first occurrence
    #[error("{0}")]
    Permanent(BureauCallError),

    #[error("Bureau API failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: BureauCallError },
}

/// A source of credit scores
#[async_trait]
pub trait BureauClient: Send + Sync {
    /// Make one call to the bureau
    async fn fetch_score(&self) -> std::result::Result<BureauScore, BureauCallError>;
}

/// Client for the real bureau endpoint
pub struct HttpBureauClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpBureauClient {
    pub fn new(config: &BureauConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

/// Error body shape returned by the bureau
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[async_trait]
impl BureauClient for HttpBureauClient {
    async fn fetch_score(&self) -> std::result::Result<BureauScore, BureauCallError> {
        let mut request = self
            .client
            .post(&self.api_url)
            .json(&serde_json::json!({}));
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BureauCallError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %self.api_url, "Bureau responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(BureauCallError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<BureauScore>()
            .await
            .map_err(|e| BureauCallError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBureauServer, MOCK_API_KEY};

    fn client_for(server: &MockBureauServer, key: &str) -> HttpBureauClient {
        HttpBureauClient::new(&BureauConfig::for_endpoint(server.url(), key)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_score_success() {
        let server = MockBureauServer::start().await;
        let client = client_for(&server, MOCK_API_KEY);

        let score = client.fetch_score().await.unwrap();
        assert_eq!(score.score, 720);
        assert_eq!(score.risk_band, "LOW");
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    async fn test_wrong_key_is_status_error_with_message() {
        let server = MockBureauServer::start().await;
        let client = client_for(&server, "wrong-key");

        let err = client.fetch_score().await.unwrap_err();
        assert_eq!(
            err,
            BureauCallError::Status {
                status: 401,
                message: "Invalid API key".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_error_message_falls_back() {
        let server = MockBureauServer::start_with_failures(&[502]).await;
        let client = client_for(&server, MOCK_API_KEY);

        let err = client.fetch_score().await.unwrap_err();
        assert_eq!(err.to_string(), "Bureau API error: 502 - Unknown error");

        // Script exhausted, next call succeeds
        assert!(client.fetch_score().await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let server = MockBureauServer::start_with_failures(&[429]).await;
        let client = client_for(&server, MOCK_API_KEY);

        let err = client.fetch_score().await.unwrap_err();
        assert!(matches!(err, BureauCallError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/credit/check", listener.local_addr().unwrap());
        drop(listener);

        let client = HttpBureauClient::new(&BureauConfig::for_endpoint(url, MOCK_API_KEY)).unwrap();
        let err = client.fetch_score().await.unwrap_err();
        assert!(matches!(err, BureauCallError::Network(_)));
    }

    #[test]
    fn test_error_messages() {
        let status = BureauCallError::Status {
            status: 400,
            message: "Bad request".to_string(),
        };
        assert_eq!(status.to_string(), "Bureau API error: 400 - Bad request");

        let exhausted = BureauFailure::Exhausted {
            attempts: 3,
            last: BureauCallError::Status {
                status: 503,
                message: "Service unavailable".to_string(),
            },
        };
        assert_eq!(
            exhausted.to_string(),
            "Bureau API failed after 3 attempts: Bureau API error: 503 - Service unavailable"
        );

        assert_eq!(
            BureauFailure::Permanent(status).to_string(),
            "Bureau API error: 400 - Bad request"
        );
    }
}
