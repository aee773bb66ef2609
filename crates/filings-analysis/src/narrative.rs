//! Analyst commentary generated by a language model.
//!
//! [`NarrativeAnalyzer`] builds the prompts; any [`LanguageModel`] answers
//! them. Failures of the model never propagate: the result text carries the
//! error message, the confidence drops to zero and the point list is empty,
//! so a caller can still render something.

use async_trait::async_trait;
use filings_core::{FilingsError, FormType, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters of filing content included in a prompt.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// Confidence reported for a successful filing analysis.
pub const ANALYSIS_CONFIDENCE: f64 = 0.8;

/// Confidence reported for a successful recommendation.
pub const RECOMMENDATION_CONFIDENCE: f64 = 0.7;

const ANALYST_TEMPLATE: &str = "You are a financial analyst expert specialized in SEC filings analysis.
Analyze the following information and provide insights:

Context:
{context}

Question: {question}";

/// A single prompt for a language model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

/// A text completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync + fmt::Debug {
    /// Returns the model's answer to `request`.
    ///
    /// # Errors
    /// Returns [`FilingsError::Language`] when the model cannot answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Commentary on a single filing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilingAnalysis {
    /// Analysis text, or the error message.
    pub analysis: String,
    /// Confidence in the analysis; `0` on failure.
    pub confidence: f64,
    /// Key points extracted from the analysis.
    pub key_points: Vec<String>,
}

/// A trading recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommendation text, or the error message.
    pub recommendation: String,
    /// Confidence in the recommendation; `0` on failure.
    pub confidence_score: f64,
    /// Reasoning points extracted from the recommendation.
    pub reasoning: Vec<String>,
}

fn analyst_prompt(context: &str, question: &str) -> String {
    ANALYST_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

/// Splits a model's list answer into points, dropping bullets and blanks.
fn split_points(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_matches(|c: char| c == '-' || c == ' ').to_string())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Builds analyst prompts and runs them against a [`LanguageModel`].
#[derive(Clone, Debug)]
pub struct NarrativeAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl NarrativeAnalyzer {
    /// Creates an analyzer over `model`.
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Analyzes a filing's text.
    ///
    /// Only the first [`MAX_CONTENT_CHARS`] characters are sent.
    pub async fn analyze_filing(&self, content: &str, form_type: &FormType) -> FilingAnalysis {
        let context = format!(
            "Filing Type: {form_type}\n\nContent: {}",
            truncate_chars(content, MAX_CONTENT_CHARS)
        );
        let request = CompletionRequest::new(
            "You are a financial analyst expert.",
            analyst_prompt(
                &context,
                "What are the key insights and potential risks from this filing?",
            ),
            0.3,
            500,
        );

        match self.model.complete(&request).await {
            Ok(analysis) => {
                let key_points = self
                    .extract_points(
                        "Extract key points in a concise list format.",
                        &format!("Extract the key points from this analysis as a list:\n{analysis}"),
                    )
                    .await;
                debug!(form = %form_type, points = key_points.len(), "Analyzed filing");
                FilingAnalysis {
                    analysis,
                    confidence: ANALYSIS_CONFIDENCE,
                    key_points,
                }
            }
            Err(e) => {
                warn!(form = %form_type, error = %e, "Filing analysis failed");
                FilingAnalysis {
                    analysis: format!("Error analyzing filing: {e}"),
                    confidence: 0.0,
                    key_points: Vec::new(),
                }
            }
        }
    }

    /// Generates a trading recommendation from metrics, filing summaries and
    /// free-text market context.
    pub async fn generate_recommendation(
        &self,
        metrics: &[(&str, f64)],
        filing_summaries: &[String],
        market_context: &str,
    ) -> Recommendation {
        let metrics = metrics
            .iter()
            .map(|(name, value)| format!("{name}: {value:.4}"))
            .collect::<Vec<_>>()
            .join("\n");
        let context = format!(
            "Financial Metrics:\n{metrics}\n\nRecent Filings Summary:\n{}\n\nMarket Context:\n{market_context}",
            filing_summaries.join("\n")
        );
        let request = CompletionRequest::new(
            "You are a financial advisor expert.",
            analyst_prompt(
                &context,
                "What is your trading recommendation based on this information?",
            ),
            0.2,
            500,
        );

        match self.model.complete(&request).await {
            Ok(recommendation) => {
                let reasoning = self
                    .extract_points(
                        "Extract reasoning points in a clear list format.",
                        &format!(
                            "Extract the main reasoning points behind this recommendation:\n{recommendation}"
                        ),
                    )
                    .await;
                Recommendation {
                    recommendation,
                    confidence_score: RECOMMENDATION_CONFIDENCE,
                    reasoning,
                }
            }
            Err(e) => {
                warn!(error = %e, "Recommendation failed");
                Recommendation {
                    recommendation: format!("Error generating recommendation: {e}"),
                    confidence_score: 0.0,
                    reasoning: Vec::new(),
                }
            }
        }
    }

    /// Asks the model for a list; an unanswered request yields no points.
    async fn extract_points(&self, system: &str, prompt: &str) -> Vec<String> {
        let request = CompletionRequest::new(system, prompt, 0.1, 200);
        match self.model.complete(&request).await {
            Ok(text) => split_points(&text),
            Err(e) => {
                warn!(error = %e, "Point extraction failed");
                Vec::new()
            }
        }
    }
}

/// Returns a [`FilingsError::Language`] for a model that cannot answer.
pub(crate) fn language_error(message: impl fmt::Display) -> FilingsError {
    FilingsError::Language(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers from a queue and records each request.
    #[derive(Debug, Default)]
    struct QueuedModel {
        answers: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl QueuedModel {
        fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for QueuedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(language_error("no answer queued")))
        }
    }

    #[tokio::test]
    async fn test_analyze_filing() {
        let model = Arc::new(QueuedModel::new(vec![
            Ok("Revenue grew 6%. Supply chain risk remains.".to_string()),
            Ok("- Revenue grew 6%\n\n- Supply chain risk\n".to_string()),
        ]));
        let analyzer = NarrativeAnalyzer::new(model.clone());

        let content = "x".repeat(MAX_CONTENT_CHARS + 500);
        let analysis = analyzer.analyze_filing(&content, &FormType::new("10-K")).await;

        assert_eq!(analysis.analysis, "Revenue grew 6%. Supply chain risk remains.");
        assert!((analysis.confidence - ANALYSIS_CONFIDENCE).abs() < 1e-12);
        assert_eq!(analysis.key_points, vec!["Revenue grew 6%", "Supply chain risk"]);

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].prompt.contains("Filing Type: 10-K"));
        assert!(!requests[0].prompt.contains(&"x".repeat(MAX_CONTENT_CHARS + 1)));
        assert!(requests[0].prompt.contains(&"x".repeat(MAX_CONTENT_CHARS)));
        assert!(requests[1].prompt.contains("Revenue grew 6%. Supply chain risk remains."));
    }

    #[tokio::test]
    async fn test_analysis_failure_is_a_value() {
        let model = Arc::new(QueuedModel::new(vec![Err(language_error("rate limited"))]));
        let analyzer = NarrativeAnalyzer::new(model);

        let analysis = analyzer.analyze_filing("text", &FormType::new("8-K")).await;

        assert_eq!(analysis.analysis, "Error analyzing filing: Language model error: rate limited");
        assert_eq!(analysis.confidence, 0.0);
        assert!(analysis.key_points.is_empty());
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_analysis() {
        let model = Arc::new(QueuedModel::new(vec![Ok("Stable outlook.".to_string())]));
        let analyzer = NarrativeAnalyzer::new(model);

        let analysis = analyzer.analyze_filing("text", &FormType::new("10-Q")).await;

        assert_eq!(analysis.analysis, "Stable outlook.");
        assert!(analysis.key_points.is_empty());
    }

    #[tokio::test]
    async fn test_recommendation_context() {
        let model = Arc::new(QueuedModel::new(vec![
            Ok("Hold.".to_string()),
            Ok("1. Valuation is full\n2. Buybacks continue".to_string()),
        ]));
        let analyzer = NarrativeAnalyzer::new(model.clone());

        let recommendation = analyzer
            .generate_recommendation(
                &[("pe_ratio", 28.5), ("current_ratio", 0.87)],
                &["10-K filed 2024-11-01".to_string()],
                "Rates are falling.",
            )
            .await;

        assert_eq!(recommendation.recommendation, "Hold.");
        assert_eq!(recommendation.reasoning.len(), 2);
        assert!((recommendation.confidence_score - RECOMMENDATION_CONFIDENCE).abs() < 1e-12);

        let requests = model.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("pe_ratio: 28.5000"));
        assert!(requests[0].prompt.contains("10-K filed 2024-11-01"));
        assert!(requests[0].prompt.contains("Market Context:\nRates are falling."));
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
