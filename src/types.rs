//! Core data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical sentiment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Trim and title-case `raw`, then match it against the canonical names.
    pub fn parse(raw: &str) -> Option<Self> {
        match title_case(raw.trim()).as_str() {
            "Positive" => Some(SentimentLabel::Positive),
            "Negative" => Some(SentimentLabel::Negative),
            "Neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt policy used when querying the model
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Only clear, strong sentiment; ambiguous text is Neutral
    Strict,
    /// Picks up subtle cues; Neutral only for factual or balanced text
    #[default]
    Lenient,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Strict => "strict",
            AnalysisMode::Lenient => "lenient",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized verdict for one piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Model-reported confidence, clamped to [0, 1]
    pub confidence: f64,
    pub explanation: String,
    pub evidence_phrases: Vec<String>,
}

impl SentimentResult {
    /// Neutral verdict with no evidence, used for every fallback path.
    pub fn neutral(confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence,
            explanation: explanation.into(),
            evidence_phrases: Vec::new(),
        }
    }

    pub fn evidence_joined(&self) -> String {
        self.evidence_phrases.join(", ")
    }
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
