//! Rate-limited document retrieval.

use filings_core::{FilingsError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::rate_limiter::RateLimiter;
use crate::transport::Transport;

/// Performs rate-limited GET requests through a [`Transport`].
///
/// Every request waits on the shared [`RateLimiter`] first. Failures are
/// returned to the caller unchanged; retrying across fallback URLs is the
/// resolver's job.
#[derive(Clone, Debug)]
pub struct DocumentFetcher {
    transport: Arc<dyn Transport>,
    rate_limiter: Arc<RateLimiter>,
}

impl DocumentFetcher {
    /// Creates a fetcher from a transport and a shared rate limiter.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            transport,
            rate_limiter,
        }
    }

    /// Returns the rate limiter shared by this fetcher.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    /// Returns [`FilingsError::Http`] for a non-success status and
    /// [`FilingsError::Network`] or [`FilingsError::Timeout`] for transport
    /// failures.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.rate_limiter.wait_if_needed().await;

        match self.transport.get(url).await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched document");
                Ok(body)
            }
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                Err(e)
            }
        }
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// # Errors
    /// Returns the errors of [`fetch`](Self::fetch), or
    /// [`FilingsError::Parse`] if the body does not decode into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| FilingsError::Parse(format!("Failed to parse JSON from {url}: {e}")))
    }
}
