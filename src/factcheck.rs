//! External fact-checking collaborator.
//!
//! The domain mutations never call this; the API layer does, and records
//! the verdict on the timeline as an ordinary event.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::FactCheckError;

pub type FactCheckResult<T> = Result<T, FactCheckError>;

/// Trait that fact-check providers implement
#[async_trait]
pub trait FactCheckProvider: Send + Sync {
    /// Check a free-text statement, returning a text verdict
    async fn check(&self, statement: &str) -> FactCheckResult<String>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// HTTP-backed provider posting statements to a configured endpoint
pub struct HttpFactChecker {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    statement: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    verdict: String,
}

impl HttpFactChecker {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }
}

#[async_trait]
impl FactCheckProvider for HttpFactChecker {
    async fn check(&self, statement: &str) -> FactCheckResult<String> {
        let response = self
            .client
            .post(format!("{}/check", self.base_url))
            .timeout(self.timeout)
            .json(&CheckRequest { statement })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FactCheckError::Timeout(self.timeout)
                } else {
                    FactCheckError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(FactCheckError::Request(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| FactCheckError::Parse(e.to_string()))?;
        Ok(body.verdict)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Configuration for the fact-check collaborator
#[derive(Debug, Clone)]
pub struct FactCheckConfig {
    /// Endpoint base URL; None means fact checking is not configured
    pub base_url: Option<String>,
    /// Timeout for check requests
    pub timeout: Duration,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl FactCheckConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var("FACTCHECK_BASE_URL").ok().and_then(|url| {
            let trimmed = url.trim().trim_end_matches('/');
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let timeout = std::env::var("FACTCHECK_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Self { base_url, timeout }
    }

    /// Build the provider, or report the explicit not-configured signal
    pub fn build(&self) -> FactCheckResult<HttpFactChecker> {
        let base_url = self
            .base_url
            .clone()
            .ok_or(FactCheckError::NotConfigured)?;
        Ok(HttpFactChecker::new(base_url, self.timeout))
    }
}
