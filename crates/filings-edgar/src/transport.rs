//! HTTP transport used by the document fetcher.
//!
//! [`Transport`] is the seam between the client and the network: the
//! production implementation is [`HttpTransport`], tests substitute a
//! scripted one.

use async_trait::async_trait;
use filings_core::{FilingsError, Result};
use std::fmt;
use tracing::debug;

use crate::config::EdgarConfig;

/// Performs a single GET request and returns the body as text.
///
/// Implementations must report a non-success status as
/// [`FilingsError::Http`] and connection problems as
/// [`FilingsError::Network`] or [`FilingsError::Timeout`]. They must not
/// retry or rate limit; the caller does both.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Fetches `url`.
    async fn get(&self, url: &str) -> Result<String>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpTransport {
    /// Create a transport from the client configuration.
    ///
    /// The user agent and timeout are applied to every request; gzip
    /// responses are decoded transparently.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if the HTTP client cannot be built
    /// (e.g. the user agent is not a valid header value).
    pub fn new(config: &EdgarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| FilingsError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Create a transport with a pre-configured HTTP client.
    ///
    /// The client must already send an identifying user agent.
    #[must_use]
    pub fn with_client(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FilingsError::Timeout(format!("{url}: {e}"))
            } else {
                FilingsError::Network(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FilingsError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FilingsError::Network(format!("Failed to read body of {url}: {e}")))
    }
}
