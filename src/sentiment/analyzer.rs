//! Sentiment query with bounded retries

use super::prompt::build_prompt;
use super::sanitize::{sanitize, DEFAULT_CONFIDENCE};
use crate::config::AnalysisConfig;
use crate::error::{Result, SentimentError};
use crate::model::{GenerationRequest, TextGenerator};
use crate::types::{AnalysisMode, SentimentResult};
use serde_json::Value;
use std::time::Duration;

pub const EMPTY_TEXT_EXPLANATION: &str = "Cannot analyze empty text";

const CONNECTION_PROBE: &str = "This movie was absolutely fantastic with amazing acting!";

/// Retry and pacing knobs for the analyzer
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub parse_backoff: Duration,
    pub service_backoff: Duration,
    pub temperature: f32,
    /// Pause between items in [`SentimentAnalyzer::analyze_batch`]
    pub request_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for RetryPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            parse_backoff: config.parse_backoff(),
            service_backoff: config.service_backoff(),
            temperature: config.temperature,
            request_delay: config.request_delay(),
        }
    }
}

impl RetryPolicy {
    /// No sleeping anywhere; for tests and dry runs
    pub fn immediate() -> Self {
        Self {
            parse_backoff: Duration::ZERO,
            service_backoff: Duration::ZERO,
            request_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    fn backoff_for(&self, err: &SentimentError, attempt: u32) -> Duration {
        let base = if err.is_parse_failure() {
            self.parse_backoff
        } else {
            self.service_backoff
        };
        base * attempt
    }
}

/// Result of one analysis plus how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: SentimentResult,
    /// Generator calls made; zero for blank input
    pub attempts: u32,
    /// Last error, set only when every attempt failed
    pub error: Option<String>,
}

impl AnalysisOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Queries the model for a sentiment verdict and never fails
pub struct SentimentAnalyzer {
    generator: Box<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl SentimentAnalyzer {
    pub fn new(generator: Box<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Classify `text`; failures are folded into a Neutral result
    pub async fn analyze(&self, text: &str, mode: AnalysisMode) -> SentimentResult {
        self.analyze_detailed(text, mode).await.result
    }

    /// Like [`analyze`](Self::analyze), but also reports attempts and the last error
    pub async fn analyze_detailed(&self, text: &str, mode: AnalysisMode) -> AnalysisOutcome {
        let text = text.trim();
        if text.is_empty() {
            return AnalysisOutcome {
                result: SentimentResult::neutral(DEFAULT_CONFIDENCE, EMPTY_TEXT_EXPLANATION),
                attempts: 0,
                error: None,
            };
        }

        let request = GenerationRequest::json(build_prompt(mode, text), self.policy.temperature);
        let mut last_error: Option<SentimentError> = None;

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(&request).await {
                Ok(payload) => {
                    let result = sanitize(&payload);
                    tracing::debug!(
                        "Attempt {} succeeded: {} ({:.2})",
                        attempt,
                        result.label,
                        result.confidence
                    );
                    return AnalysisOutcome {
                        result,
                        attempts: attempt,
                        error: None,
                    };
                }
                Err(err) => {
                    tracing::warn!(
                        "Analysis attempt {}/{} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        err
                    );
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.backoff_for(&err, attempt)).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        AnalysisOutcome {
            result: SentimentResult::neutral(
                DEFAULT_CONFIDENCE,
                format!(
                    "Analysis failed after {} attempts: {}",
                    self.policy.max_attempts, error
                ),
            ),
            attempts: self.policy.max_attempts,
            error: Some(error),
        }
    }

    /// Analyze `texts` one after another, in order, pausing between requests
    pub async fn analyze_batch<F>(
        &self,
        texts: &[String],
        mode: AnalysisMode,
        mut on_progress: F,
    ) -> Vec<SentimentResult>
    where
        F: FnMut(usize, usize),
    {
        let total = texts.len();
        let mut results = Vec::with_capacity(total);

        for (i, text) in texts.iter().enumerate() {
            on_progress(i + 1, total);
            results.push(self.analyze(text, mode).await);

            if i + 1 < total && !self.policy.request_delay.is_zero() {
                tokio::time::sleep(self.policy.request_delay).await;
            }
        }

        results
    }

    /// Send a known-positive review and report whether a usable answer came back
    pub async fn check_connection(&self) -> bool {
        let outcome = self
            .analyze_detailed(CONNECTION_PROBE, AnalysisMode::Lenient)
            .await;
        if let Some(err) = &outcome.error {
            tracing::error!("Connection check failed: {}", err);
        }
        !outcome.failed()
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<Value> {
        let text = self.generator.generate(request).await?;
        parse_payload(&text)
    }
}

/// Parse the model's reply as a JSON object.
///
/// Replies wrapped in prose or code fences are reduced to their outermost `{...}` span.
pub fn parse_payload(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    // Valid JSON that is not an object is treated as a parse failure
    let object: serde_json::Map<String, Value> = serde_json::from_str(candidate)?;
    Ok(Value::Object(object))
}
