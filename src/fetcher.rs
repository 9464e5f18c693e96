use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use thiserror::Error;

/// A feed that could not be retrieved or parsed.
///
/// Carries the URL so the aggregator can log a self-contained message
/// and move on to the next feed.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

#[derive(Debug, Error)]
pub enum FetchErrorKind {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Body could not be parsed as RSS or Atom
    #[error("parse error: {0}")]
    Parse(String),
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Newsfold/1.0 (RSS Aggregator)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Retrieve a feed URL and parse the body as RSS or Atom.
    ///
    /// A single attempt, no retries. Every failure mode (unreachable
    /// host, timeout, HTTP error status, malformed document) comes back
    /// as a [`FetchError`] rather than a panic or a propagated cause
    /// without context.
    pub async fn fetch(&self, url: &str) -> Result<feed_rs::model::Feed, FetchError> {
        self.fetch_inner(url).await.map_err(|kind| FetchError {
            url: url.to_string(),
            kind,
        })
    }

    async fn fetch_inner(&self, url: &str) -> Result<feed_rs::model::Feed, FetchErrorKind> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchErrorKind::Timeout
            } else {
                FetchErrorKind::Network(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchErrorKind::HttpStatus(response.status().as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchErrorKind::Timeout
            } else {
                FetchErrorKind::Network(e)
            }
        })?;

        parser::parse(&bytes[..]).map_err(|e| FetchErrorKind::Parse(e.to_string()))
    }
}
