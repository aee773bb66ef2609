//! Moves filings from EDGAR into a [`FilingStore`].

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use filings_analysis::{FilingAnalysis, FinancialFacts, FinancialRatios, NarrativeAnalyzer};
use filings_core::{
    AccessionNumber, Cik, Company, FilingStore, FilingsError, FormType, NewFiling, Result,
};
use filings_edgar::EdgarClient;
use tracing::{debug, info, instrument, warn};

/// Analysis type recorded for narrative filing analyses.
pub const FILING_ANALYSIS_TYPE: &str = "filing_analysis";

/// A recent filing that could not be ingested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFiling {
    /// Accession number of the filing.
    pub accession: AccessionNumber,
    /// Form type.
    pub form: FormType,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of [`FilingPipeline::ingest_recent_filings`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Ids of the stored filings, in manifest order.
    pub stored: Vec<i64>,
    /// Filings that failed to resolve.
    pub skipped: Vec<SkippedFiling>,
}

/// Retrieval and persistence glue.
///
/// Per-filing failures are reported and skipped; storage failures abort the
/// operation.
pub struct FilingPipeline {
    client: Arc<EdgarClient>,
    store: Arc<dyn FilingStore>,
    analyzer: Option<NarrativeAnalyzer>,
}

impl fmt::Debug for FilingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilingPipeline")
            .field("client", &self.client)
            .field("analyzer", &self.analyzer.as_ref().map(|_| "configured"))
            .finish_non_exhaustive()
    }
}

impl FilingPipeline {
    /// Creates a pipeline without narrative analysis.
    #[must_use]
    pub fn new(client: Arc<EdgarClient>, store: Arc<dyn FilingStore>) -> Self {
        Self {
            client,
            store,
            analyzer: None,
        }
    }

    /// Enables [`analyze_recent_filings`](Self::analyze_recent_filings).
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: NarrativeAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Returns the EDGAR client.
    #[must_use]
    pub fn client(&self) -> &EdgarClient {
        &self.client
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &dyn FilingStore {
        self.store.as_ref()
    }

    /// Fetches a company's profile and upserts it.
    ///
    /// # Errors
    /// Returns retrieval or storage errors.
    #[instrument(skip(self), fields(cik = %cik))]
    pub async fn sync_company(&self, cik: Cik) -> Result<Company> {
        let profile = self.client.get_company_profile(cik).await?;
        let company = Company::from(&profile);
        self.store.upsert_company(&company).await?;
        debug!(name = %company.name, "Synced company");
        Ok(company)
    }

    /// Resolves, fetches, extracts and stores every filing of the given forms
    /// made in the last `days_back` days.
    ///
    /// # Errors
    /// Returns manifest retrieval errors and storage errors. A filing whose
    /// document cannot be resolved is logged and listed in
    /// [`IngestReport::skipped`].
    #[instrument(skip(self, form_types), fields(cik = %cik))]
    pub async fn ingest_recent_filings(
        &self,
        cik: Cik,
        form_types: &[FormType],
        days_back: u32,
    ) -> Result<IngestReport> {
        let recent = self
            .client
            .get_recent_filings(cik, form_types, days_back)
            .await?;
        let mut report = IngestReport::default();

        for filing in recent {
            let document = match self
                .client
                .get_filing_document(&filing.accession, cik, &filing.form)
                .await
            {
                Ok(document) => document,
                Err(e) => {
                    warn!(accession = %filing.accession, form = %filing.form, error = %e, "Skipping filing");
                    report.skipped.push(SkippedFiling {
                        accession: filing.accession,
                        form: filing.form,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let text = self.client.extract_text_content(&document.content);
            let id = self
                .store
                .store_filing(&NewFiling {
                    company_cik: cik,
                    form_type: filing.form,
                    filing_date: filing.filing_date,
                    document_url: document.url,
                    processed_content: text.text_or_placeholder().to_string(),
                })
                .await?;
            report.stored.push(id);
        }

        info!(
            stored = report.stored.len(),
            skipped = report.skipped.len(),
            "Ingested recent filings"
        );
        Ok(report)
    }

    /// Computes ratios from `facts` and stores each available one as a metric.
    ///
    /// # Errors
    /// Returns storage errors.
    #[instrument(skip(self, facts), fields(cik = %cik))]
    pub async fn record_ratios(
        &self,
        cik: Cik,
        facts: &FinancialFacts,
        as_of: NaiveDate,
    ) -> Result<FinancialRatios> {
        let ratios = FinancialRatios::compute(facts);
        for (name, value) in ratios.metric_pairs() {
            self.store.store_metric(cik, name, value, as_of).await?;
        }
        debug!(metrics = ratios.metric_pairs().len(), "Recorded ratios");
        Ok(ratios)
    }

    /// Runs narrative analysis over the `limit` most recent stored filings
    /// and stores every successful analysis, dated today (UTC).
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] when no analyzer is configured, and
    /// storage errors.
    #[instrument(skip(self), fields(cik = %cik))]
    pub async fn analyze_recent_filings(
        &self,
        cik: Cik,
        limit: usize,
    ) -> Result<Vec<FilingAnalysis>> {
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or_else(|| FilingsError::Config("No language model configured".to_string()))?;

        let filings = self.store.recent_filings(cik, limit).await?;
        let mut analyses = Vec::with_capacity(filings.len());
        for filing in filings {
            let analysis = analyzer
                .analyze_filing(&filing.processed_content, &filing.form_type)
                .await;
            if analysis.confidence > 0.0 {
                self.store
                    .store_analysis(
                        cik,
                        FILING_ANALYSIS_TYPE,
                        &analysis.analysis,
                        Utc::now().date_naive(),
                    )
                    .await?;
            }
            analyses.push(analysis);
        }
        Ok(analyses)
    }
}
