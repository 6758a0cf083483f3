// src/crtsh/error.rs
use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single certificate search query.
///
/// Every variant is terminal for its query only: the worker that hit it
/// logs the error and moves on to the next query.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Still rate limited after the whole retry budget was spent
    #[error("rate limited on query '{query}' after {attempts} attempts")]
    RateLimitExceeded { query: String, attempts: u32 },

    /// Transport level failure (connect, TLS, timeout, body read)
    #[error("request for query '{query}' failed: {source}")]
    RequestFailed {
        query: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any status other than 200 or 429
    #[error("bad status {status} for query '{query}'")]
    BadStatus { query: String, status: StatusCode },

    /// Response body was not the expected JSON array
    #[error("could not parse response for query '{query}': {source}")]
    ParseError {
        query: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The query that failed
    pub fn query(&self) -> &str {
        match self {
            FetchError::RateLimitExceeded { query, .. }
            | FetchError::RequestFailed { query, .. }
            | FetchError::BadStatus { query, .. }
            | FetchError::ParseError { query, .. } => query,
        }
    }
}
