//! Company directory built from the SEC tickers file.

use filings_core::{Cik, FilingsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// SIC code ranges and the industry category they map to.
const INDUSTRIES: &[(&[&str], &str)] = &[
    (
        &["7371", "7372", "7373", "7374", "7375", "7376", "7377", "7378", "7379"],
        "Technology - Software & Services",
    ),
    (
        &["3570", "3571", "3572", "3575", "3576", "3577", "3578", "3579"],
        "Technology - Hardware",
    ),
    (&["6021", "6022", "6029", "6035", "6036"], "Finance - Banking"),
    (&["6311", "6321", "6331", "6351", "6361", "6399"], "Finance - Insurance"),
    (&["6211", "6221", "6282", "6289"], "Finance - Investment Services"),
    (&["5211", "5311", "5331", "5399"], "Retail - Department Stores"),
    (&["5961", "5962", "5963"], "Retail - E-commerce"),
    (&["5411", "5412", "5422", "5461"], "Retail - Food & Grocery"),
    (&["2833", "2834", "2835", "2836"], "Healthcare - Pharmaceuticals"),
    (
        &["8011", "8021", "8031", "8041", "8051", "8061", "8071", "8082", "8090"],
        "Healthcare - Services",
    ),
    (&["3841", "3842", "3843", "3844", "3845"], "Healthcare - Equipment"),
    (&["2911", "1311", "1381", "1382", "1389"], "Energy - Oil & Gas"),
    (&["4911", "4931", "4932", "4939"], "Energy - Utilities"),
    (&["3711", "3713", "3714", "3715", "3716"], "Manufacturing - Automotive"),
    (&["3721", "3724", "3728"], "Manufacturing - Aerospace"),
    (&["4812", "4813", "4822", "4899"], "Telecommunications"),
    (&["2080", "2082", "2086", "2087"], "Consumer Goods - Beverages"),
    (
        &["2000", "2011", "2013", "2015", "2020", "2024"],
        "Consumer Goods - Food Products",
    ),
];

/// Category for SIC codes without a mapping.
pub const OTHER_INDUSTRY: &str = "Other";

/// Maps a SIC code to a broad industry category.
///
/// # Example
/// ```
/// use filings_edgar::industry_from_sic;
///
/// assert_eq!(industry_from_sic("3571"), "Technology - Hardware");
/// assert_eq!(industry_from_sic("9999"), "Other");
/// ```
#[must_use]
pub fn industry_from_sic(sic: &str) -> &'static str {
    let sic = sic.trim();
    INDUSTRIES
        .iter()
        .find(|(codes, _)| codes.contains(&sic))
        .map_or(OTHER_INDUSTRY, |(_, industry)| *industry)
}

/// One company in the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMatch {
    /// SEC CIK number.
    pub cik: Cik,
    /// Ticker symbol.
    pub ticker: String,
    /// Company name.
    pub name: String,
}

/// Row of the SEC tickers file.
#[derive(Debug, Deserialize)]
struct TickerRow {
    cik_str: u64,
    ticker: String,
    title: String,
}

/// Ticker and name index over every SEC registrant with a ticker.
#[derive(Clone, Debug, Default)]
pub struct CompanyDirectory {
    companies: Vec<CompanyMatch>,
    by_ticker: HashMap<String, usize>,
}

impl CompanyDirectory {
    /// Builds a directory from the published `company_tickers.json` body.
    ///
    /// The file is an object of `{"cik_str", "ticker", "title"}` rows keyed
    /// by position. Rows with an out-of-range CIK are skipped.
    ///
    /// # Errors
    /// Returns [`FilingsError::Parse`] if the body is not in that shape.
    pub fn from_json(body: &str) -> Result<Self> {
        let rows: HashMap<String, TickerRow> = serde_json::from_str(body)
            .map_err(|e| FilingsError::Parse(format!("Failed to parse company tickers: {e}")))?;

        let mut companies: Vec<CompanyMatch> = rows
            .into_values()
            .filter_map(|row| match Cik::from_number(row.cik_str) {
                Ok(cik) => Some(CompanyMatch {
                    cik,
                    ticker: row.ticker.to_uppercase(),
                    name: row.title,
                }),
                Err(e) => {
                    warn!(ticker = %row.ticker, error = %e, "Skipping ticker row");
                    None
                }
            })
            .collect();
        companies.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        Ok(Self::from_companies(companies))
    }

    /// Builds a directory from known companies.
    #[must_use]
    pub fn from_companies(companies: Vec<CompanyMatch>) -> Self {
        let by_ticker = companies
            .iter()
            .enumerate()
            .map(|(i, c)| (c.ticker.to_uppercase(), i))
            .collect();
        Self {
            companies,
            by_ticker,
        }
    }

    /// Returns the number of companies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Looks up a company by exact ticker (case-insensitive).
    #[must_use]
    pub fn lookup_ticker(&self, ticker: &str) -> Option<&CompanyMatch> {
        self.by_ticker
            .get(&ticker.trim().to_uppercase())
            .and_then(|&i| self.companies.get(i))
    }

    /// Searches by ticker or name.
    ///
    /// Ranking: exact ticker match, then names starting with the query, then
    /// names containing it. Matching is case-insensitive; ties are ordered
    /// by name, then ticker. Each CIK appears once, under its best-ranked
    /// ticker, so share classes of one issuer collapse into a single result.
    /// A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<CompanyMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(u8, &CompanyMatch)> = self
            .companies
            .iter()
            .filter_map(|c| {
                let name = c.name.to_lowercase();
                if c.ticker.to_lowercase() == query {
                    Some((0, c))
                } else if name.starts_with(&query) {
                    Some((1, c))
                } else if name.contains(&query) {
                    Some((2, c))
                } else {
                    None
                }
            })
            .collect();
        ranked.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .filter(|(_, c)| seen.insert(c.cik))
            .map(|(_, c)| c.clone())
            .collect()
    }
}
