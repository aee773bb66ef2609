#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Analytics over SEC filing data.
//!
//! The numeric modules are pure functions over values already fetched by
//! `filings-edgar`. The narrative module talks to a language model through
//! the [`LanguageModel`] trait.

/// Aggregate statistics over insider transactions.
pub mod insider_activity;

/// Institutional ownership concentration.
pub mod institutional;

/// Analyst commentary generated by a language model.
pub mod narrative;

/// OpenAI-compatible chat completions backend.
pub mod openai;

/// Standard financial ratios.
pub mod ratios;

/// Risk metrics over a price history.
pub mod risk;

pub use insider_activity::InsiderActivity;
pub use institutional::{InstitutionalHolding, InstitutionalOwnership};
pub use narrative::{
    CompletionRequest, FilingAnalysis, LanguageModel, NarrativeAnalyzer, Recommendation,
};
pub use openai::{OpenAiChatModel, OpenAiConfig};
pub use ratios::{FinancialFacts, FinancialRatios};
pub use risk::RiskMetrics;
