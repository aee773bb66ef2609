//! Aggregate statistics over insider transactions.

use filings_core::{InsiderTransaction, InsiderTransactionSummary};
use serde::{Deserialize, Serialize};

/// Buy and sell activity across one or more insider filings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsiderActivity {
    /// Number of transactions considered.
    pub total_transactions: usize,
    /// Open-market purchases (code `P`).
    pub buy_count: usize,
    /// Open-market sales (code `S`).
    pub sell_count: usize,
    /// Shares bought minus shares sold.
    pub net_volume: f64,
    /// Mean shares per transaction; `None` without transactions.
    pub average_transaction_size: Option<f64>,
}

impl InsiderActivity {
    /// Computes activity over individual transactions.
    ///
    /// Transactions with codes other than `P` and `S` (grants, exercises,
    /// gifts) count toward the total and the average size but not toward the
    /// buy/sell figures.
    #[must_use]
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a InsiderTransaction>,
    {
        let mut activity = Self::default();
        let mut total_shares = 0.0;

        for transaction in transactions {
            activity.total_transactions += 1;
            total_shares += transaction.shares;
            if transaction.is_purchase() {
                activity.buy_count += 1;
                activity.net_volume += transaction.shares;
            } else if transaction.is_sale() {
                activity.sell_count += 1;
                activity.net_volume -= transaction.shares;
            }
        }

        if activity.total_transactions > 0 {
            activity.average_transaction_size =
                Some(total_shares / activity.total_transactions as f64);
        }
        activity
    }

    /// Computes activity over every transaction of several filings.
    #[must_use]
    pub fn from_summaries(summaries: &[InsiderTransactionSummary]) -> Self {
        Self::from_transactions(summaries.iter().flat_map(|s| s.transactions.iter()))
    }

    /// Returns true if purchases outnumber sales.
    #[must_use]
    pub const fn is_net_buying(&self) -> bool {
        self.buy_count > self.sell_count
    }
}
