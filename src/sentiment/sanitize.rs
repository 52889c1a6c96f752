//! Normalization of untrusted model output

use crate::types::{SentimentLabel, SentimentResult};
use serde_json::Value;

pub const MAX_EVIDENCE_PHRASES: usize = 6;
pub const MAX_PHRASE_CHARS: usize = 150;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const FALLBACK_EXPLANATION: &str =
    "No detailed explanation was provided for this classification.";

/// Turn an arbitrary JSON payload into a well-formed [`SentimentResult`].
///
/// Total: unknown labels become Neutral, bad confidences become 0.5 and are
/// clamped to [0, 1], a blank explanation gets a fallback, and evidence is
/// trimmed, truncated and capped. Non-object payloads yield the all-default result.
pub fn sanitize(raw: &Value) -> SentimentResult {
    let field = |name: &str| raw.as_object().and_then(|obj| obj.get(name));

    let label = field("label")
        .and_then(Value::as_str)
        .and_then(SentimentLabel::parse)
        .unwrap_or(SentimentLabel::Neutral);

    let confidence = field("confidence")
        .and_then(coerce_f64)
        .filter(|c| !c.is_nan())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let explanation = field("explanation")
        .map(coerce_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_EXPLANATION.to_string());

    let evidence_phrases = match field("evidence_phrases") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| clean_phrase(&coerce_text(item)))
            .filter(|phrase| !phrase.is_empty())
            .take(MAX_EVIDENCE_PHRASES)
            .collect(),
        _ => Vec::new(),
    };

    SentimentResult {
        label,
        confidence,
        explanation,
        evidence_phrases,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn clean_phrase(raw: &str) -> String {
    let truncated: String = raw.trim().chars().take(MAX_PHRASE_CHARS).collect();
    truncated.trim_end().to_string()
}
