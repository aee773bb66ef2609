//! Insider transaction records and aggregates.
//!
//! An ownership filing (forms 3, 4 and 5) reports one owner and any number of
//! derivative and non-derivative transactions. [`InsiderTransactionSummary`]
//! carries the parsed transactions together with their share-weighted
//! aggregates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StructuredFilingError;

/// Transaction code for an open-market or private purchase.
pub const PURCHASE_CODE: &str = "P";

/// Transaction code for an open-market or private sale.
pub const SALE_CODE: &str = "S";

/// Table a transaction was reported in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Table I: common stock and other non-derivative securities.
    NonDerivative,
    /// Table II: options, warrants and other derivative securities.
    Derivative,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonDerivative => f.write_str("non-derivative"),
            Self::Derivative => f.write_str("derivative"),
        }
    }
}

/// Overall classification of a filing's transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionClass {
    /// At least one transaction carries the purchase code.
    Purchase,
    /// No transaction carries the purchase code.
    Sale,
}

impl fmt::Display for TransactionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase => f.write_str("Purchase"),
            Self::Sale => f.write_str("Sale"),
        }
    }
}

/// A single reported transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    /// Derivative or non-derivative table.
    pub kind: TransactionKind,
    /// Number of shares (or underlying units) transacted.
    pub shares: f64,
    /// Price per share.
    pub price_per_share: f64,
    /// SEC transaction code (`P`, `S`, `A`, `M`, ...).
    pub code: String,
    /// Transaction date.
    pub date: Option<NaiveDate>,
    /// Title of the security.
    pub security_title: Option<String>,
    /// `A` (acquired) or `D` (disposed).
    pub acquired_disposed: Option<String>,
}

impl InsiderTransaction {
    /// Creates a transaction with its required fields.
    #[must_use]
    pub fn new(kind: TransactionKind, shares: f64, price_per_share: f64, code: impl Into<String>) -> Self {
        Self {
            kind,
            shares,
            price_per_share,
            code: code.into(),
            date: None,
            security_title: None,
            acquired_disposed: None,
        }
    }

    /// Sets the transaction date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Returns shares multiplied by price.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.shares * self.price_per_share
    }

    /// Returns true if this transaction carries the purchase code.
    #[must_use]
    pub fn is_purchase(&self) -> bool {
        self.code.eq_ignore_ascii_case(PURCHASE_CODE)
    }

    /// Returns true if this transaction carries the sale code.
    #[must_use]
    pub fn is_sale(&self) -> bool {
        self.code.eq_ignore_ascii_case(SALE_CODE)
    }
}

/// Parsed insider filing with aggregates over its transactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransactionSummary {
    /// Reporting owner's name.
    pub owner_name: String,
    /// Reporting owner's title or relationship to the issuer.
    pub owner_title: Option<String>,
    /// Issuer name.
    pub issuer_name: Option<String>,
    /// Issuer trading symbol.
    pub issuer_ticker: Option<String>,
    /// Valid transactions, in document order.
    pub transactions: Vec<InsiderTransaction>,
    /// Sum of shares over all transactions.
    pub total_shares: f64,
    /// Share-weighted average price; `0` when total shares is `0`.
    pub weighted_average_price: f64,
    /// `Purchase` if any transaction is a purchase, else `Sale`.
    pub classification: TransactionClass,
}

impl InsiderTransactionSummary {
    /// Builds a summary, computing aggregates over `transactions`.
    ///
    /// # Errors
    /// Returns [`StructuredFilingError::NoTransactionData`] when
    /// `transactions` is empty; aggregates are undefined in that case.
    pub fn from_transactions(
        owner_name: impl Into<String>,
        owner_title: Option<String>,
        transactions: Vec<InsiderTransaction>,
    ) -> Result<Self, StructuredFilingError> {
        if transactions.is_empty() {
            return Err(StructuredFilingError::NoTransactionData);
        }

        let total_shares: f64 = transactions.iter().map(|t| t.shares).sum();
        let total_value: f64 = transactions.iter().map(InsiderTransaction::value).sum();
        let weighted_average_price = if total_shares == 0.0 {
            0.0
        } else {
            total_value / total_shares
        };

        // Mixed filings count as purchases as soon as one purchase appears.
        let classification = if transactions.iter().any(InsiderTransaction::is_purchase) {
            TransactionClass::Purchase
        } else {
            TransactionClass::Sale
        };

        Ok(Self {
            owner_name: owner_name.into(),
            owner_title,
            issuer_name: None,
            issuer_ticker: None,
            transactions,
            total_shares,
            weighted_average_price,
            classification,
        })
    }

    /// Sets the issuer name and ticker.
    #[must_use]
    pub fn with_issuer(mut self, name: Option<String>, ticker: Option<String>) -> Self {
        self.issuer_name = name;
        self.issuer_ticker = ticker;
        self
    }

    /// Returns the total traded value (shares × price).
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.transactions.iter().map(InsiderTransaction::value).sum()
    }
}
