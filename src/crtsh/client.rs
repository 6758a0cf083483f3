// src/crtsh/client.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::error::FetchError;
use super::types::CertificateEntry;
use super::CertSource;

pub const DEFAULT_ENDPOINT: &str = "https://crt.sh/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Tunables for the crt.sh client
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    /// Per attempt, not per query
    pub timeout: Duration,
    /// Additional attempts after a 429, so `max_retries + 1` requests at most
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: format!("crtx/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for the crt.sh search endpoint
///
/// One instance is shared by every worker; its configuration never changes
/// after construction.
pub struct CrtShClient {
    endpoint: Url,
    http_client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl CrtShClient {
    /// Create a new crt.sh client
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .with_context(|| format!("Invalid search endpoint '{}'", settings.endpoint))?;

        // crt.sh sits behind certificates that are not always valid from
        // every vantage point, so peer verification is off.
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(true)
            .user_agent(settings.user_agent)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint,
            http_client,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
        })
    }

    /// Build the search URL for a query
    /// Endpoint: GET {endpoint}?q={query}&output=json
    pub fn query_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("output", "json");
        url
    }

    async fn parse_body(
        query: &str,
        response: reqwest::Response,
    ) -> Result<Vec<CertificateEntry>, FetchError> {
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::RequestFailed {
                query: query.to_string(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FetchError::ParseError {
            query: query.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CertSource for CrtShClient {
    /// Fetch all certificate entries matching `query`
    ///
    /// Only 429 is retried; every other failure is returned straight away.
    async fn fetch(&self, query: &str) -> Result<Vec<CertificateEntry>, FetchError> {
        // An empty q matches far too much upstream
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.query_url(query);
        let total_attempts = self.max_retries + 1;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!("Querying crt.sh for '{}' (attempt {}/{})", query, attempt, total_attempts);

            let response = self
                .http_client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| FetchError::RequestFailed {
                    query: query.to_string(),
                    source,
                })?;

            let status = response.status();

            if status == StatusCode::OK {
                let entries = Self::parse_body(query, response).await?;
                debug!("Found {} entries for query: {}", entries.len(), query);
                return Ok(entries);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < total_attempts {
                    warn!(
                        "Received 429 Too Many Requests for '{}'. Retrying in {:?}... (retry {}/{})",
                        query, self.retry_delay, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }

                debug!("Max retries reached for query '{}' after 429 status", query);
                return Err(FetchError::RateLimitExceeded {
                    query: query.to_string(),
                    attempts: attempt,
                });
            }

            return Err(FetchError::BadStatus {
                query: query.to_string(),
                status,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.endpoint, "https://crt.sh/");
        assert_eq!(settings.timeout, Duration::from_secs(45));
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.retry_delay, Duration::from_secs(10));
        assert!(settings.user_agent.starts_with("crtx/"));
    }

    #[test]
    fn test_query_url_escapes_wildcard() {
        let client = CrtShClient::new(FetchSettings::default()).unwrap();
        let url = client.query_url("%.example.com");
        assert_eq!(
            url.as_str(),
            "https://crt.sh/?q=%25.example.com&output=json"
        );
    }

    #[test]
    fn test_query_url_escapes_organization() {
        let client = CrtShClient::new(FetchSettings::default()).unwrap();
        let url = client.query_url("Example Inc & Co");
        assert_eq!(
            url.as_str(),
            "https://crt.sh/?q=Example+Inc+%26+Co&output=json"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let settings = FetchSettings {
            endpoint: "not a url".to_string(),
            ..FetchSettings::default()
        };
        assert!(CrtShClient::new(settings).is_err());
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        // Unroutable endpoint: any request would fail
        let settings = FetchSettings {
            endpoint: "http://127.0.0.1:9/".to_string(),
            ..FetchSettings::default()
        };
        let client = CrtShClient::new(settings).unwrap();
        let entries = client.fetch("").await.unwrap();
        assert!(entries.is_empty());
    }
}
