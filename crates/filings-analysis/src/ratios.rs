//! Standard financial ratios.

use serde::{Deserialize, Serialize};

/// Raw figures from a company's financial statements and market data.
///
/// Every field is optional; a ratio is computed only when all of its inputs
/// are present and non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFacts {
    /// Net income for the period.
    pub net_income: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Share price.
    pub stock_price: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,
    /// Total shareholders' equity.
    pub total_equity: Option<f64>,
    /// Total current assets.
    pub current_assets: Option<f64>,
    /// Total current liabilities.
    pub current_liabilities: Option<f64>,
    /// Inventory.
    pub inventory: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
}

/// Returns the value if it is present and non-zero.
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Ratios computed from [`FinancialFacts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Price over earnings per share.
    pub pe_ratio: Option<f64>,
    /// Total debt over total equity.
    pub debt_equity_ratio: Option<f64>,
    /// Current assets over current liabilities.
    pub current_ratio: Option<f64>,
    /// Current assets less inventory, over current liabilities.
    pub quick_ratio: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
    /// Return on assets.
    pub roa: Option<f64>,
}

impl FinancialRatios {
    /// Computes every ratio whose inputs are available.
    ///
    /// The quick ratio also needs a non-zero inventory figure.
    ///
    /// # Example
    /// ```
    /// use filings_analysis::{FinancialFacts, FinancialRatios};
    ///
    /// let facts = FinancialFacts {
    ///     current_assets: Some(150.0),
    ///     current_liabilities: Some(100.0),
    ///     ..Default::default()
    /// };
    /// let ratios = FinancialRatios::compute(&facts);
    /// assert_eq!(ratios.current_ratio, Some(1.5));
    /// assert_eq!(ratios.pe_ratio, None);
    /// ```
    #[must_use]
    pub fn compute(facts: &FinancialFacts) -> Self {
        let net_income = nonzero(facts.net_income);
        let equity = nonzero(facts.total_equity);
        let current_assets = nonzero(facts.current_assets);
        let current_liabilities = nonzero(facts.current_liabilities);

        let pe_ratio = net_income
            .zip(nonzero(facts.shares_outstanding))
            .map(|(income, shares)| income / shares)
            .zip(nonzero(facts.stock_price))
            .map(|(eps, price)| price / eps);

        let debt_equity_ratio = nonzero(facts.total_debt)
            .zip(equity)
            .map(|(debt, equity)| debt / equity);

        let current_ratio = current_assets
            .zip(current_liabilities)
            .map(|(assets, liabilities)| assets / liabilities);

        let quick_ratio = current_assets
            .zip(nonzero(facts.inventory))
            .zip(current_liabilities)
            .map(|((assets, inventory), liabilities)| (assets - inventory) / liabilities);

        let roe = net_income.zip(equity).map(|(income, equity)| income / equity);

        let roa = net_income
            .zip(nonzero(facts.total_assets))
            .map(|(income, assets)| income / assets);

        Self {
            pe_ratio,
            debt_equity_ratio,
            current_ratio,
            quick_ratio,
            roe,
            roa,
        }
    }

    /// Returns the computed ratios as `(metric name, value)` pairs.
    #[must_use]
    pub fn metric_pairs(&self) -> Vec<(&'static str, f64)> {
        [
            ("pe_ratio", self.pe_ratio),
            ("debt_equity_ratio", self.debt_equity_ratio),
            ("current_ratio", self.current_ratio),
            ("quick_ratio", self.quick_ratio),
            ("roe", self.roe),
            ("roa", self.roa),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Returns true if no ratio could be computed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pe_ratio.is_none()
            && self.debt_equity_ratio.is_none()
            && self.current_ratio.is_none()
            && self.quick_ratio.is_none()
            && self.roe.is_none()
            && self.roa.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("ratio should be computed");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    fn full_facts() -> FinancialFacts {
        FinancialFacts {
            net_income: Some(100.0),
            shares_outstanding: Some(50.0),
            stock_price: Some(40.0),
            total_debt: Some(300.0),
            total_equity: Some(600.0),
            current_assets: Some(250.0),
            current_liabilities: Some(125.0),
            inventory: Some(50.0),
            total_assets: Some(1000.0),
        }
    }

    #[test]
    fn test_all_ratios() {
        let ratios = FinancialRatios::compute(&full_facts());

        approx(ratios.pe_ratio, 20.0);
        approx(ratios.debt_equity_ratio, 0.5);
        approx(ratios.current_ratio, 2.0);
        approx(ratios.quick_ratio, 1.6);
        approx(ratios.roe, 100.0 / 600.0);
        approx(ratios.roa, 0.1);
        assert_eq!(ratios.metric_pairs().len(), 6);
    }

    #[test]
    fn test_zero_inputs_skip_ratios() {
        let facts = FinancialFacts {
            net_income: Some(0.0),
            inventory: Some(0.0),
            ..full_facts()
        };
        let ratios = FinancialRatios::compute(&facts);

        assert!(ratios.pe_ratio.is_none());
        assert!(ratios.roe.is_none());
        assert!(ratios.roa.is_none());
        assert!(ratios.quick_ratio.is_none());
        approx(ratios.current_ratio, 2.0);

        let names: Vec<&str> = ratios.metric_pairs().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["debt_equity_ratio", "current_ratio"]);
    }

    #[test]
    fn test_pe_needs_price() {
        let facts = FinancialFacts {
            stock_price: None,
            ..full_facts()
        };
        assert!(FinancialRatios::compute(&facts).pe_ratio.is_none());
    }

    #[test]
    fn test_empty_facts() {
        let ratios = FinancialRatios::compute(&FinancialFacts::default());
        assert!(ratios.is_empty());
        assert!(ratios.metric_pairs().is_empty());
    }
}
