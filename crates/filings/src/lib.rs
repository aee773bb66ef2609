#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR filings retrieval, storage and analysis.
//!
//! This crate re-exports the core types, the EDGAR client, the stores and
//! the analytics, and provides a [`FilingPipeline`] that ties retrieval to
//! persistence.
//!
//! # Features
//!
//! - `sqlite` - SQLite-backed [`SqliteStore`]

// Core types and traits
pub use filings_core::*;

// Retrieval
pub use filings_edgar::{
    CandidateSource, CompanyMatch, EdgarClient, EdgarConfig, HttpTransport, ResolvedDocument,
    Transport,
};

// Storage
#[cfg(feature = "sqlite")]
pub use filings_store::SqliteStore;
pub use filings_store::InMemoryStore;

// Analytics
pub use filings_analysis::{
    FilingAnalysis, FinancialFacts, FinancialRatios, InsiderActivity, InstitutionalHolding,
    InstitutionalOwnership, LanguageModel, NarrativeAnalyzer, OpenAiChatModel, OpenAiConfig,
    Recommendation, RiskMetrics,
};

mod pipeline;
pub use pipeline::{FILING_ANALYSIS_TYPE, FilingPipeline, IngestReport, SkippedFiling};
