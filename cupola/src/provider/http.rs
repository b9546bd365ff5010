//! HTTP fetcher abstraction for testability

use std::time::Duration;

use reqwest::header::USER_AGENT;

use super::types::FetchError;
use crate::catalog::ResourceLocator;

/// Browser-like User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Trait for fetching the raw bytes behind a locator.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock fetchers in tests.
pub trait Fetcher: Send + Sync {
    /// Fetches the bytes for `locator`, giving up after `timeout`.
    fn fetch(&self, locator: &ResourceLocator, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// Real fetcher implementation using reqwest.
pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl ReqwestFetcher {
    /// Creates a new fetcher sending the given User-Agent header.
    pub fn new(user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }

    /// Returns the User-Agent this fetcher sends.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, locator: &ResourceLocator, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let url = locator.as_str();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::Connection(e.to_string())
                }
            })?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}
