//! Storage trait for companies, filings, metrics and analyses.
//!
//! This module defines the [`FilingStore`] trait that provides a unified
//! interface over the persistence backends (SQLite, in-memory).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::Result,
    records::{AnalysisRecord, Company, FinancialMetric, NewFiling, StoredFiling},
    types::Cik,
};

/// Trait for persisting retrieved filings and derived data.
///
/// Implementations hand out surrogate ids for inserted rows. Companies are
/// keyed by CIK and upserted.
#[async_trait]
pub trait FilingStore: Send + Sync {
    /// Inserts a company, or updates name, SIC and industry if it exists.
    async fn upsert_company(&self, company: &Company) -> Result<()>;

    /// Retrieves a company by CIK.
    ///
    /// Returns `Ok(None)` if the company is not stored.
    async fn company(&self, cik: Cik) -> Result<Option<Company>>;

    /// Lists all companies ordered by name.
    async fn companies(&self) -> Result<Vec<Company>>;

    /// Stores a filing and returns its id.
    async fn store_filing(&self, filing: &NewFiling) -> Result<i64>;

    /// Retrieves the most recent filings for a company, newest first.
    async fn recent_filings(&self, cik: Cik, limit: usize) -> Result<Vec<StoredFiling>>;

    /// Stores a metric value and returns its id.
    async fn store_metric(
        &self,
        cik: Cik,
        metric_name: &str,
        metric_value: f64,
        as_of_date: NaiveDate,
    ) -> Result<i64>;

    /// Retrieves all metric values for a company, newest first.
    async fn metrics(&self, cik: Cik) -> Result<Vec<FinancialMetric>>;

    /// Stores an analysis result and returns its id.
    async fn store_analysis(
        &self,
        cik: Cik,
        analysis_type: &str,
        analysis_result: &str,
        analysis_date: NaiveDate,
    ) -> Result<i64>;

    /// Retrieves all analysis results for a company, newest first.
    async fn analyses(&self, cik: Cik) -> Result<Vec<AnalysisRecord>>;

    /// Removes all stored data.
    async fn clear(&self) -> Result<()>;
}
