#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR client for filings and insider transactions.
//!
//! This crate provides:
//!
//! - [`EdgarClient`] - The facade tying the pieces below together
//! - [`RateLimiter`] - Minimum interval between outbound requests
//! - [`DocumentFetcher`] - Rate-limited GET through a [`Transport`]
//! - [`FilingIndexResolver`] - Ordered candidate URLs for a filing's document
//! - [`parse_ownership_document`] - Form 3/4/5 XML to a transaction summary
//! - [`extract_text`] - HTML to plain text
//! - [`filter_recent`] - Inclusive cutoff filter over a manifest
//! - [`CompanyDirectory`] - Ticker and name search
//!
//! # Example
//!
//! ```no_run
//! use filings_edgar::{EdgarClient, EdgarConfig};
//! use filings_core::{AccessionNumber, Cik, FormType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new(EdgarConfig::new("MyApp/1.0 (contact@example.com)"))?;
//!
//!     let cik = Cik::parse("320193")?;
//!     let accession = AccessionNumber::parse("0000320193-24-000123")?;
//!     let document = client
//!         .get_filing_document(&accession, cik, &FormType::new("10-K"))
//!         .await?;
//!     println!("{}", client.extract_text_content(&document.content).text_or_placeholder());
//!
//!     Ok(())
//! }
//! ```

/// Per-company submissions cache.
pub mod cache;
/// EDGAR client facade.
pub mod client;
/// Company directory and industry mapping.
pub mod company;
/// Client configuration.
pub mod config;
/// Rate-limited document retrieval.
pub mod fetcher;
/// Submissions decoding and cutoff filtering.
pub mod manifest;
/// Ownership document parser.
pub mod ownership;
/// Outbound request pacing.
pub mod rate_limiter;
/// Candidate URL resolution for filing documents.
pub mod resolver;
/// Plain-text extraction.
pub mod text;
/// HTTP transport seam.
pub mod transport;

#[cfg(test)]
mod testing;

pub use cache::ManifestCache;
pub use client::EdgarClient;
pub use company::{CompanyDirectory, CompanyMatch, OTHER_INDUSTRY, industry_from_sic};
pub use config::EdgarConfig;
pub use fetcher::DocumentFetcher;
pub use manifest::{Submissions, filter_recent, parse_submissions, submissions_url};
pub use ownership::parse_ownership_document;
pub use rate_limiter::RateLimiter;
pub use resolver::{Candidate, CandidateSource, FilingIndexResolver, Resolution, ResolvedDocument};
pub use text::extract_text;
pub use transport::{HttpTransport, Transport};
