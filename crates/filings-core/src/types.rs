//! Core data types for SEC filings.
//!
//! This module defines the identifiers and documents that flow between the
//! client, the storage layer and the analysis layer:
//!
//! - [`Cik`] - Central Index Key, canonically zero-padded to ten digits
//! - [`AccessionNumber`] - Per-filing identifier with and without dashes
//! - [`AccessionReference`] - CIK + accession, the key for document URLs
//! - [`FormType`] - Regulatory form code
//! - [`FilingManifest`] - A company's filing history as published
//! - [`RecentFiling`] - A validated manifest entry
//! - [`CompanyProfile`] - Company metadata from the submissions document
//! - [`ExtractedText`] - Plain text extracted from a filing

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FilingsError, Result};

/// Width of a canonical, zero-padded CIK.
pub const CIK_WIDTH: usize = 10;

/// Number of digits in an accession number.
const ACCESSION_DIGITS: usize = 18;

/// Pads a CIK string to its canonical ten-digit form.
///
/// Validates the input first, so padding is idempotent:
/// `pad_cik(&pad_cik(x)?)? == pad_cik(x)?`.
///
/// # Errors
/// Returns [`FilingsError::InvalidCik`] if the input is empty, contains
/// non-digits or is longer than ten digits.
///
/// # Example
/// ```
/// use filings_core::pad_cik;
///
/// assert_eq!(pad_cik("320193").unwrap(), "0000320193");
/// ```
pub fn pad_cik(cik: &str) -> Result<String> {
    Cik::parse(cik).map(|c| c.padded())
}

/// Central Index Key: the SEC's numeric company identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cik(u64);

impl Cik {
    /// Parses a CIK from digits, with or without leading zeros.
    ///
    /// # Errors
    /// Returns [`FilingsError::InvalidCik`] for empty input, non-digit
    /// characters, or more than ten digits.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FilingsError::InvalidCik("empty identifier".to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FilingsError::InvalidCik(format!("'{s}' contains non-digits")));
        }
        if s.len() > CIK_WIDTH {
            return Err(FilingsError::InvalidCik(format!(
                "'{s}' is longer than {CIK_WIDTH} digits"
            )));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| FilingsError::InvalidCik(format!("'{s}': {e}")))
    }

    /// Creates a CIK from its numeric value.
    ///
    /// # Errors
    /// Returns [`FilingsError::InvalidCik`] if the value needs more than ten digits.
    pub fn from_number(value: u64) -> Result<Self> {
        if value > 9_999_999_999 {
            return Err(FilingsError::InvalidCik(format!(
                "{value} is longer than {CIK_WIDTH} digits"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the canonical ten-digit, zero-padded form (e.g. `0000320193`).
    #[must_use]
    pub fn padded(&self) -> String {
        format!("{:0>width$}", self.0, width = CIK_WIDTH)
    }

    /// Returns the form without leading zeros (e.g. `320193`).
    #[must_use]
    pub fn unpadded(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.padded())
    }
}

impl FromStr for Cik {
    type Err = FilingsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cik {
    type Error = FilingsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Cik> for String {
    fn from(cik: Cik) -> Self {
        cik.padded()
    }
}

/// Accession number: the per-filing identifier.
///
/// Stored as its eighteen digits; the dashed `##########-##-######`
/// rendering is always derivable from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessionNumber(String);

impl AccessionNumber {
    /// Parses an accession number in dashed or dash-stripped form.
    ///
    /// # Errors
    /// Returns [`FilingsError::InvalidAccession`] if the digits do not add up
    /// to eighteen or the dashes are misplaced.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains('-') {
            let parts: Vec<&str> = s.split('-').collect();
            let lengths: Vec<usize> = parts.iter().map(|p| p.len()).collect();
            if lengths != [10, 2, 6] {
                return Err(FilingsError::InvalidAccession(format!(
                    "'{s}' is not of the form ##########-##-######"
                )));
            }
        }
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        if digits.len() != ACCESSION_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FilingsError::InvalidAccession(format!(
                "'{s}' must contain exactly {ACCESSION_DIGITS} digits"
            )));
        }
        Ok(Self(digits))
    }

    /// Returns the dash-stripped form used in archive folder paths.
    #[must_use]
    pub fn stripped(&self) -> &str {
        &self.0
    }

    /// Returns the dashed form (e.g. `0000320193-23-000077`).
    #[must_use]
    pub fn dashed(&self) -> String {
        format!("{}-{}-{}", &self.0[..10], &self.0[10..12], &self.0[12..])
    }
}

impl fmt::Display for AccessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dashed())
    }
}

impl FromStr for AccessionNumber {
    type Err = FilingsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccessionNumber {
    type Error = FilingsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<AccessionNumber> for String {
    fn from(accession: AccessionNumber) -> Self {
        accession.dashed()
    }
}

/// Key for a single filing's documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccessionReference {
    /// Filer's CIK.
    pub cik: Cik,
    /// Accession number of the filing.
    pub accession: AccessionNumber,
}

impl AccessionReference {
    /// Creates a new reference.
    #[must_use]
    pub const fn new(cik: Cik, accession: AccessionNumber) -> Self {
        Self { cik, accession }
    }
}

/// A regulatory form code such as `10-K`, `8-K` or `4`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormType(String);

impl FormType {
    /// Creates a form type, trimming surrounding whitespace and uppercasing.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the form code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the form code without an amendment suffix (`4/A` -> `4`).
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.strip_suffix("/A").unwrap_or(&self.0)
    }

    /// Returns true for the insider-transaction ownership forms 3, 4 and 5.
    #[must_use]
    pub fn is_insider_transaction(&self) -> bool {
        matches!(self.base(), "3" | "4" | "5")
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FormType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FormType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One row of a company's filing history, as published.
///
/// Fields are kept as published so a single malformed entry can be skipped
/// without rejecting the whole manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingEntry {
    /// Form type.
    pub form: String,
    /// Filing date, expected as `YYYY-MM-DD`.
    pub filing_date: String,
    /// Accession number, usually dashed.
    pub accession_number: String,
    /// Primary document filename, when published.
    pub primary_document: Option<String>,
}

/// Ordered filing history for one company (most recent first, as published).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingManifest {
    /// Company the manifest belongs to.
    pub cik: Cik,
    /// Filing rows.
    pub entries: Vec<FilingEntry>,
}

impl FilingManifest {
    /// Creates a manifest from its entries.
    #[must_use]
    pub const fn new(cik: Cik, entries: Vec<FilingEntry>) -> Self {
        Self { cik, entries }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &FilingEntry> {
        self.entries.iter()
    }
}

/// A validated manifest entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFiling {
    /// Form type.
    pub form: FormType,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// Accession number.
    pub accession: AccessionNumber,
    /// Primary document filename, when published.
    pub primary_document: Option<String>,
}

/// Company metadata published alongside the filing history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// SEC CIK number.
    pub cik: Cik,
    /// Registered company name.
    pub name: String,
    /// Standard Industrial Classification code.
    pub sic: Option<String>,
    /// SEC description of the SIC code.
    pub sic_description: Option<String>,
    /// Industry category derived from the SIC code.
    pub industry: String,
    /// Ticker symbols.
    pub tickers: Vec<String>,
    /// Listing exchanges.
    pub exchanges: Vec<String>,
}

/// Plain text extracted from a filing.
///
/// Extraction never yields an empty string: when nothing readable remains the
/// result is [`ExtractedText::NoContent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractedText {
    /// Readable text.
    Content(String),
    /// Nothing readable could be extracted.
    NoContent,
}

impl ExtractedText {
    /// Text shown in place of missing content.
    pub const NO_CONTENT_PLACEHOLDER: &'static str = "[no content could be extracted]";

    /// Wraps text, mapping blank input to [`ExtractedText::NoContent`].
    #[must_use]
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::NoContent
        } else {
            Self::Content(text)
        }
    }

    /// Returns true for [`ExtractedText::NoContent`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// Returns the text, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::NoContent => None,
        }
    }

    /// Returns the text, or the placeholder for missing content.
    #[must_use]
    pub fn text_or_placeholder(&self) -> &str {
        self.as_str().unwrap_or(Self::NO_CONTENT_PLACEHOLDER)
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_or_placeholder())
    }
}
