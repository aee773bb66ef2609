#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for SEC filings retrieval.
//!
//! This crate provides the foundational abstractions shared by the client,
//! the storage layer and the analysis layer:
//!
//! - [`Cik`](types::Cik) and [`AccessionNumber`](types::AccessionNumber) - Validated identifiers
//! - [`FilingManifest`](types::FilingManifest) - A company's filing history
//! - [`InsiderTransactionSummary`](insider::InsiderTransactionSummary) - Parsed insider filings
//! - [`FilingStore`](store::FilingStore) - Persistence abstraction

/// Error types for filings operations.
pub mod error;
/// Insider transaction records and aggregates.
pub mod insider;
/// Persisted record types.
pub mod records;
/// Storage trait for companies, filings, metrics and analyses.
pub mod store;
/// Identifiers, manifests and document types.
pub mod types;

// Re-export commonly used items at crate root
pub use error::{AttemptFailure, FilingsError, Result, StructuredFilingError};
pub use insider::{InsiderTransaction, InsiderTransactionSummary, TransactionClass, TransactionKind};
pub use records::{AnalysisRecord, Company, FinancialMetric, NewFiling, StoredFiling};
pub use store::FilingStore;
pub use types::{
    AccessionNumber, AccessionReference, Cik, CompanyProfile, ExtractedText, FilingEntry,
    FilingManifest, FormType, RecentFiling, pad_cik,
};
