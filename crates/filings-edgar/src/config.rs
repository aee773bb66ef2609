//! Client configuration.

use std::time::Duration;

use filings_core::{FilingsError, Result};

/// SEC EDGAR submissions API base URL
pub const SUBMISSIONS_BASE_URL: &str = "https://data.sec.gov/submissions";

/// SEC EDGAR archives base URL
pub const ARCHIVES_BASE_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// SEC company tickers URL
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default manifest cache validity
pub const DEFAULT_MANIFEST_TTL: Duration = Duration::from_secs(5 * 60);

/// Default identifying user agent
pub const DEFAULT_USER_AGENT: &str = "FilingsClient/0.1 (contact@example.com)";

/// Configuration for [`EdgarClient`](crate::EdgarClient).
///
/// The SEC rejects requests without an identifying user agent. Format should be:
/// "AppName/Version (contact@email.com)"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgarConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Minimum interval between two outbound requests.
    pub rate_limit: Duration,
    /// Per-request deadline.
    pub timeout: Duration,
    /// How long a fetched manifest stays valid.
    pub manifest_ttl: Duration,
    /// Base URL of the submissions API.
    pub submissions_base_url: String,
    /// Base URL of the filing archives.
    pub archives_base_url: String,
    /// URL of the company tickers file.
    pub tickers_url: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            manifest_ttl: DEFAULT_MANIFEST_TTL,
            submissions_base_url: SUBMISSIONS_BASE_URL.to_string(),
            archives_base_url: ARCHIVES_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
        }
    }
}

impl EdgarConfig {
    /// Creates a configuration with the given user agent and default settings.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    /// Reads overrides from the process environment.
    ///
    /// Recognized variables: `EDGAR_USER_AGENT`, `EDGAR_RATE_LIMIT_MS`,
    /// `EDGAR_TIMEOUT_SECS` and `EDGAR_MANIFEST_TTL_SECS`.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(user_agent) = lookup("EDGAR_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = user_agent;
        }
        if let Some(ms) = parse_number(&lookup, "EDGAR_RATE_LIMIT_MS")? {
            config.rate_limit = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_number(&lookup, "EDGAR_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_number(&lookup, "EDGAR_MANIFEST_TTL_SECS")? {
            config.manifest_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Sets the minimum interval between requests.
    #[must_use]
    pub const fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limit = min_interval;
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the manifest cache validity.
    #[must_use]
    pub const fn with_manifest_ttl(mut self, ttl: Duration) -> Self {
        self.manifest_ttl = ttl;
        self
    }

    /// Points the client at other hosts, e.g. a local mirror.
    #[must_use]
    pub fn with_base_urls(
        mut self,
        submissions: impl Into<String>,
        archives: impl Into<String>,
        tickers: impl Into<String>,
    ) -> Self {
        self.submissions_base_url = submissions.into();
        self.archives_base_url = archives.into();
        self.tickers_url = tickers.into();
        self
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| FilingsError::Config(format!("{key}='{raw}': {e}"))),
        None => Ok(None),
    }
}
