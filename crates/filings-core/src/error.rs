//! Error types for filings operations.
//!
//! This module defines [`FilingsError`] which covers every failure that can
//! occur while fetching, resolving, parsing or storing filing data, and
//! [`StructuredFilingError`] for the two terminal outcomes of parsing an
//! insider-transaction document.

use std::fmt;

use thiserror::Error;

/// One failed attempt while walking a fallback chain of candidate URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptFailure {
    /// The URL that was requested.
    pub url: String,
    /// Why the attempt failed.
    pub reason: String,
}

impl AttemptFailure {
    /// Creates a new attempt failure.
    #[must_use]
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.reason)
    }
}

/// Terminal outcomes of parsing an insider-transaction filing.
///
/// Both are reported as values so a caller can still render whatever else it
/// has for the filing.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum StructuredFilingError {
    /// The document has no reporting owner element.
    #[error("no reporting owner")]
    NoReportingOwner,

    /// The owner is present but no transaction carried both shares and price.
    #[error("no transaction data found")]
    NoTransactionData,

    /// The document is not well-formed XML.
    #[error("malformed ownership document: {0}")]
    MalformedXml(String),
}

/// Errors that can occur during filings operations.
#[derive(Error, Debug)]
pub enum FilingsError {
    /// Connection failures and other transport-level errors.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete before the configured deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The remote side answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Http {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Every candidate document URL for a filing failed.
    #[error("Could not resolve document for accession {accession}: {}", join_attempts(.attempts))]
    ResolutionExhausted {
        /// The accession number being resolved.
        accession: String,
        /// Every attempt, in the order it was made.
        attempts: Vec<AttemptFailure>,
    },

    /// An insider-transaction document could not be summarized.
    #[error(transparent)]
    StructuredFiling(#[from] StructuredFilingError),

    /// A response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The submissions manifest violates its shape (e.g. misaligned arrays).
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    /// The company identifier is not a valid CIK.
    #[error("Invalid CIK: {0}")]
    InvalidCik(String),

    /// The accession number is not valid.
    #[error("Invalid accession number: {0}")]
    InvalidAccession(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No company matched a ticker or name.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// Error interacting with the persistence layer.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error talking to the language model.
    #[error("Language model error: {0}")]
    Language(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using [`FilingsError`].
pub type Result<T> = std::result::Result<T, FilingsError>;
