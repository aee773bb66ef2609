//! Risk metrics over a price history.

use serde::{Deserialize, Serialize};

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Return deviation below which a series counts as flat.
const FLAT_DEVIATION: f64 = 1e-12;

/// Volatility, drawdown and Sharpe ratio of a price series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized standard deviation of simple returns.
    pub volatility: f64,
    /// Lowest price over highest price, minus one.
    pub max_drawdown: f64,
    /// Annualized mean return over return deviation; `None` for a flat series.
    pub sharpe_ratio: Option<f64>,
}

impl RiskMetrics {
    /// Computes risk metrics over prices in chronological order.
    ///
    /// Returns `None` for fewer than two prices or a non-positive price.
    ///
    /// # Example
    /// ```
    /// use filings_analysis::RiskMetrics;
    ///
    /// let metrics = RiskMetrics::from_prices(&[100.0, 110.0, 99.0]).unwrap();
    /// assert!((metrics.max_drawdown - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.len() < 2 || prices.iter().any(|p| *p <= 0.0 || !p.is_finite()) {
            return None;
        }

        let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        // Population deviation
        let std_dev = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let annualizer = TRADING_DAYS.sqrt();
        let sharpe_ratio = (std_dev > FLAT_DEVIATION).then(|| mean / std_dev * annualizer);

        Some(Self {
            volatility: std_dev * annualizer,
            max_drawdown: min / max - 1.0,
            sharpe_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_prices() {
        assert!(RiskMetrics::from_prices(&[]).is_none());
        assert!(RiskMetrics::from_prices(&[100.0]).is_none());
        assert!(RiskMetrics::from_prices(&[100.0, 0.0, 5.0]).is_none());
    }

    #[test]
    fn test_constant_growth_has_no_volatility() {
        let metrics = RiskMetrics::from_prices(&[100.0, 110.0, 121.0]).unwrap();
        assert!(metrics.volatility.abs() < 1e-12);
        assert!(metrics.sharpe_ratio.is_none());
        assert!((metrics.max_drawdown - (100.0 / 121.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_alternating_returns() {
        // Returns +10% and -10%: mean 0, population deviation 0.1
        let metrics = RiskMetrics::from_prices(&[100.0, 110.0, 99.0]).unwrap();

        assert!((metrics.volatility - 0.1 * TRADING_DAYS.sqrt()).abs() < 1e-9);
        assert!(metrics.sharpe_ratio.unwrap().abs() < 1e-9);
    }
}
