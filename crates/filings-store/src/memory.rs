//! In-memory store implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use filings_core::{
    AnalysisRecord, Cik, Company, FilingStore, FinancialMetric, NewFiling, Result, StoredFiling,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Tables {
    companies: HashMap<Cik, Company>,
    filings: Vec<StoredFiling>,
    metrics: Vec<FinancialMetric>,
    analyses: Vec<AnalysisRecord>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Simple in-memory store for testing and development.
///
/// Data is stored behind one `RwLock` and is lost when the store is dropped.
/// Ids are shared across tables and increase monotonically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilingStore for InMemoryStore {
    #[instrument(skip(self, company), fields(cik = %company.cik))]
    async fn upsert_company(&self, company: &Company) -> Result<()> {
        self.tables
            .write()
            .await
            .companies
            .insert(company.cik, company.clone());
        debug!("Upserted company");
        Ok(())
    }

    async fn company(&self, cik: Cik) -> Result<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&cik).cloned())
    }

    async fn companies(&self) -> Result<Vec<Company>> {
        let tables = self.tables.read().await;
        let mut companies: Vec<Company> = tables.companies.values().cloned().collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    #[instrument(skip(self, filing), fields(cik = %filing.company_cik, form = %filing.form_type))]
    async fn store_filing(&self, filing: &NewFiling) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.filings.push(StoredFiling {
            id,
            company_cik: filing.company_cik,
            form_type: filing.form_type.clone(),
            filing_date: filing.filing_date,
            document_url: filing.document_url.clone(),
            processed_content: filing.processed_content.clone(),
            created_at: Utc::now(),
        });
        debug!(id, "Stored filing");
        Ok(id)
    }

    async fn recent_filings(&self, cik: Cik, limit: usize) -> Result<Vec<StoredFiling>> {
        let tables = self.tables.read().await;
        let mut filings: Vec<StoredFiling> = tables
            .filings
            .iter()
            .filter(|f| f.company_cik == cik)
            .cloned()
            .collect();
        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date).then(b.id.cmp(&a.id)));
        filings.truncate(limit);
        Ok(filings)
    }

    async fn store_metric(
        &self,
        cik: Cik,
        metric_name: &str,
        metric_value: f64,
        as_of_date: NaiveDate,
    ) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.metrics.push(FinancialMetric {
            id,
            company_cik: cik,
            metric_name: metric_name.to_string(),
            metric_value,
            as_of_date,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn metrics(&self, cik: Cik) -> Result<Vec<FinancialMetric>> {
        let tables = self.tables.read().await;
        let mut metrics: Vec<FinancialMetric> = tables
            .metrics
            .iter()
            .filter(|m| m.company_cik == cik)
            .cloned()
            .collect();
        metrics.sort_by(|a, b| b.as_of_date.cmp(&a.as_of_date).then(b.id.cmp(&a.id)));
        Ok(metrics)
    }

    async fn store_analysis(
        &self,
        cik: Cik,
        analysis_type: &str,
        analysis_result: &str,
        analysis_date: NaiveDate,
    ) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.analyses.push(AnalysisRecord {
            id,
            company_cik: cik,
            analysis_type: analysis_type.to_string(),
            analysis_result: analysis_result.to_string(),
            analysis_date,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn analyses(&self, cik: Cik) -> Result<Vec<AnalysisRecord>> {
        let tables = self.tables.read().await;
        let mut analyses: Vec<AnalysisRecord> = tables
            .analyses
            .iter()
            .filter(|a| a.company_cik == cik)
            .cloned()
            .collect();
        analyses.sort_by(|a, b| b.analysis_date.cmp(&a.analysis_date).then(b.id.cmp(&a.id)));
        Ok(analyses)
    }

    async fn clear(&self) -> Result<()> {
        *self.tables.write().await = Tables::default();
        debug!("Cleared in-memory store");
        Ok(())
    }
}
