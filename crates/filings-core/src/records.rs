//! Persisted record types.
//!
//! These mirror the four relational tables kept by the storage layer:
//! companies, filings, financial metrics and analysis results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Cik, CompanyProfile, FormType};

/// A tracked company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// SEC CIK number.
    pub cik: Cik,
    /// Company name.
    pub name: String,
    /// Standard Industrial Classification code.
    pub sic: Option<String>,
    /// Industry category.
    pub industry: String,
}

impl Company {
    /// Creates a company record.
    #[must_use]
    pub fn new(cik: Cik, name: impl Into<String>, sic: Option<String>, industry: impl Into<String>) -> Self {
        Self {
            cik,
            name: name.into(),
            sic,
            industry: industry.into(),
        }
    }
}

impl From<&CompanyProfile> for Company {
    fn from(profile: &CompanyProfile) -> Self {
        Self {
            cik: profile.cik,
            name: profile.name.clone(),
            sic: profile.sic.clone(),
            industry: profile.industry.clone(),
        }
    }
}

/// A filing about to be stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFiling {
    /// Filer's CIK.
    pub company_cik: Cik,
    /// Form type.
    pub form_type: FormType,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// URL the document was retrieved from.
    pub document_url: String,
    /// Extracted plain text.
    pub processed_content: String,
}

/// A stored filing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFiling {
    /// Surrogate id.
    pub id: i64,
    /// Filer's CIK.
    pub company_cik: Cik,
    /// Form type.
    pub form_type: FormType,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// URL the document was retrieved from.
    pub document_url: String,
    /// Extracted plain text.
    pub processed_content: String,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// A stored financial metric value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetric {
    /// Surrogate id.
    pub id: i64,
    /// Company's CIK.
    pub company_cik: Cik,
    /// Metric name (e.g. `pe_ratio`).
    pub metric_name: String,
    /// Metric value.
    pub metric_value: f64,
    /// Date the value applies to.
    pub as_of_date: NaiveDate,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// A stored narrative analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Surrogate id.
    pub id: i64,
    /// Company's CIK.
    pub company_cik: Cik,
    /// Kind of analysis (e.g. `filing`, `recommendation`).
    pub analysis_type: String,
    /// Generated text.
    pub analysis_result: String,
    /// Date of the analysis.
    pub analysis_date: NaiveDate,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}
