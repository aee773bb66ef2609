//! Institutional ownership concentration.

use serde::{Deserialize, Serialize};

/// Number of holders reported in [`InstitutionalOwnership::top_holders`].
pub const TOP_HOLDERS: usize = 5;

/// One institution's position in a company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalHolding {
    /// Institution name.
    pub institution_name: String,
    /// Shares held.
    pub shares_held: f64,
}

impl InstitutionalHolding {
    /// Creates a holding.
    #[must_use]
    pub fn new(institution_name: impl Into<String>, shares_held: f64) -> Self {
        Self {
            institution_name: institution_name.into(),
            shares_held,
        }
    }
}

/// Aggregate institutional ownership of one company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalOwnership {
    /// Number of institutions reported.
    pub total_institutions: usize,
    /// Shares held across all institutions.
    pub total_shares_held: f64,
    /// Held shares as a percentage (0-100 scale) of shares outstanding.
    pub percentage_outstanding: f64,
    /// Largest holders by shares held, at most [`TOP_HOLDERS`].
    pub top_holders: Vec<InstitutionalHolding>,
}

impl InstitutionalOwnership {
    /// Aggregates holdings against the company's shares outstanding.
    ///
    /// Returns `None` for no holdings or a zero (or non-finite) share count.
    /// Holders with equal positions keep their input order.
    ///
    /// # Example
    /// ```
    /// use filings_analysis::{InstitutionalHolding, InstitutionalOwnership};
    ///
    /// let holdings = [
    ///     InstitutionalHolding::new("Vanguard", 1_300.0),
    ///     InstitutionalHolding::new("BlackRock", 1_000.0),
    /// ];
    /// let ownership = InstitutionalOwnership::from_holdings(&holdings, 10_000.0).unwrap();
    /// assert!((ownership.percentage_outstanding - 23.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn from_holdings(
        holdings: &[InstitutionalHolding],
        total_shares_outstanding: f64,
    ) -> Option<Self> {
        if holdings.is_empty()
            || total_shares_outstanding == 0.0
            || !total_shares_outstanding.is_finite()
        {
            return None;
        }

        let total_shares_held: f64 = holdings.iter().map(|h| h.shares_held).sum();

        let mut top_holders = holdings.to_vec();
        // Stable: ties stay in input order
        top_holders.sort_by(|a, b| b.shares_held.total_cmp(&a.shares_held));
        top_holders.truncate(TOP_HOLDERS);

        Some(Self {
            total_institutions: holdings.len(),
            total_shares_held,
            percentage_outstanding: total_shares_held / total_shares_outstanding * 100.0,
            top_holders,
        })
    }
}
