//! The EDGAR client facade.

use chrono::Utc;
use filings_core::{
    AccessionNumber, AccessionReference, Cik, CompanyProfile, ExtractedText, FilingManifest,
    FilingsError, FormType, InsiderTransactionSummary, RecentFiling, Result,
    StructuredFilingError,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::cache::ManifestCache;
use crate::company::{CompanyDirectory, CompanyMatch};
use crate::config::EdgarConfig;
use crate::fetcher::DocumentFetcher;
use crate::manifest::{Submissions, filter_recent, parse_submissions, submissions_url};
use crate::ownership::parse_ownership_document;
use crate::rate_limiter::RateLimiter;
use crate::resolver::{FilingIndexResolver, ResolvedDocument};
use crate::text::extract_text;
use crate::transport::{HttpTransport, Transport};

/// SEC EDGAR client.
///
/// Every outbound request, listing lookups and fallback attempts included,
/// goes through one rate limiter shared by the whole client. Submissions
/// documents are cached per company for the configured TTL; the company
/// directory is downloaded once.
#[derive(Debug)]
pub struct EdgarClient {
    config: EdgarConfig,
    fetcher: DocumentFetcher,
    resolver: FilingIndexResolver,
    manifests: ManifestCache,
    directory: OnceCell<CompanyDirectory>,
}

impl EdgarClient {
    /// Create a client that talks to the SEC over HTTP.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use filings_edgar::{EdgarClient, EdgarConfig};
    ///
    /// let client = EdgarClient::new(EdgarConfig::new("MyApp/1.0 (contact@example.com)")).unwrap();
    /// ```
    pub fn new(config: EdgarConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client configured from the environment.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] for unparsable variables or an
    /// unusable user agent.
    pub fn from_env() -> Result<Self> {
        Self::new(EdgarConfig::from_env()?)
    }

    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(config: EdgarConfig, transport: Arc<dyn Transport>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let fetcher = DocumentFetcher::new(transport, rate_limiter);
        let resolver = FilingIndexResolver::new(fetcher.clone(), config.archives_base_url.as_str());
        let manifests = ManifestCache::new(config.manifest_ttl);

        Self {
            config,
            fetcher,
            resolver,
            manifests,
            directory: OnceCell::new(),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// Returns the document resolver.
    #[must_use]
    pub const fn resolver(&self) -> &FilingIndexResolver {
        &self.resolver
    }

    /// Returns the manifest cache.
    #[must_use]
    pub const fn manifest_cache(&self) -> &ManifestCache {
        &self.manifests
    }

    async fn submissions(&self, cik: Cik) -> Result<Submissions> {
        if let Some(cached) = self.manifests.get(cik).await {
            return Ok(cached);
        }

        let url = submissions_url(&self.config.submissions_base_url, cik);
        let body = self.fetcher.fetch(&url).await?;
        let submissions = parse_submissions(cik, &body)?;
        debug!(%cik, filings = submissions.manifest.len(), "Fetched submissions");

        self.manifests.put(cik, submissions.clone()).await;
        Ok(submissions)
    }

    /// Fetches a company's filing manifest.
    ///
    /// # Errors
    /// Returns transport errors, [`FilingsError::Parse`] for an undecodable
    /// body, or [`FilingsError::MalformedManifest`] for misaligned arrays.
    #[instrument(skip(self), fields(cik = %cik))]
    pub async fn get_company_filings(&self, cik: Cik) -> Result<FilingManifest> {
        Ok(self.submissions(cik).await?.manifest)
    }

    /// Fetches a company's profile from its submissions document.
    ///
    /// # Errors
    /// Same as [`get_company_filings`](Self::get_company_filings).
    #[instrument(skip(self), fields(cik = %cik))]
    pub async fn get_company_profile(&self, cik: Cik) -> Result<CompanyProfile> {
        Ok(self.submissions(cik).await?.profile)
    }

    /// Returns the filings of the given form types made in the last
    /// `days_back` days (inclusive, relative to today in UTC).
    ///
    /// # Errors
    /// Same as [`get_company_filings`](Self::get_company_filings). Malformed
    /// entries are skipped, not reported.
    #[instrument(skip(self, form_types), fields(cik = %cik))]
    pub async fn get_recent_filings(
        &self,
        cik: Cik,
        form_types: &[FormType],
        days_back: u32,
    ) -> Result<Vec<RecentFiling>> {
        let manifest = self.get_company_filings(cik).await?;
        Ok(filter_recent(
            &manifest,
            form_types,
            days_back,
            Utc::now().date_naive(),
        ))
    }

    /// Resolves and fetches a filing document.
    ///
    /// # Errors
    /// Returns [`FilingsError::ResolutionExhausted`] when every candidate URL
    /// fails.
    #[instrument(skip(self), fields(cik = %cik, accession = %accession, form = %form_type))]
    pub async fn get_filing_document(
        &self,
        accession: &AccessionNumber,
        cik: Cik,
        form_type: &FormType,
    ) -> Result<ResolvedDocument> {
        let reference = AccessionReference::new(cik, accession.clone());
        self.resolver.get_document(&reference, form_type).await
    }

    /// Extracts plain text from a fetched document.
    #[must_use]
    pub fn extract_text_content(&self, raw: &str) -> ExtractedText {
        extract_text(raw)
    }

    /// Parses an insider-transaction ownership document.
    ///
    /// # Errors
    /// Returns the [`StructuredFilingError`] describing why no summary could
    /// be built.
    pub fn parse_structured_filing(
        &self,
        xml: &str,
    ) -> std::result::Result<InsiderTransactionSummary, StructuredFilingError> {
        parse_ownership_document(xml)
    }

    /// Resolves, fetches and parses an insider-transaction filing.
    ///
    /// # Errors
    /// Returns [`FilingsError::InvalidParameter`] for a form type that is not
    /// an ownership form, resolution errors, or
    /// [`FilingsError::StructuredFiling`] when parsing fails.
    pub async fn get_insider_summary(
        &self,
        accession: &AccessionNumber,
        cik: Cik,
        form_type: &FormType,
    ) -> Result<InsiderTransactionSummary> {
        if !form_type.is_insider_transaction() {
            return Err(FilingsError::InvalidParameter(format!(
                "form {form_type} is not an insider-transaction form"
            )));
        }

        let document = self.get_filing_document(accession, cik, form_type).await?;
        Ok(self.parse_structured_filing(&document.content)?)
    }

    async fn directory(&self) -> Result<&CompanyDirectory> {
        self.directory
            .get_or_try_init(|| async {
                let body = self.fetcher.fetch(&self.config.tickers_url).await?;
                let directory = CompanyDirectory::from_json(&body)?;
                debug!(companies = directory.len(), "Loaded company directory");
                Ok::<_, FilingsError>(directory)
            })
            .await
    }

    /// Searches companies by ticker or name.
    ///
    /// # Errors
    /// Returns an error if the company directory cannot be downloaded.
    #[instrument(skip(self))]
    pub async fn search_company(&self, query: &str) -> Result<Vec<CompanyMatch>> {
        Ok(self.directory().await?.search(query))
    }

    /// Looks up a company's CIK from its ticker symbol.
    ///
    /// # Errors
    /// Returns [`FilingsError::InvalidParameter`] for an empty ticker and
    /// [`FilingsError::CompanyNotFound`] for an unknown one.
    #[instrument(skip(self))]
    pub async fn lookup_ticker(&self, ticker: &str) -> Result<Cik> {
        if ticker.trim().is_empty() {
            return Err(FilingsError::InvalidParameter("Empty ticker".to_string()));
        }
        self.directory()
            .await?
            .lookup_ticker(ticker)
            .map(|c| c.cik)
            .ok_or_else(|| FilingsError::CompanyNotFound(ticker.to_string()))
    }
}
