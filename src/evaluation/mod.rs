//! Batch evaluation metrics
//!
//! Compares predicted labels against ground truth: accuracy, per-class
//! precision/recall/F1, a full 3x3 confusion matrix and confidence averages
//! split by correctness.


use crate::types::SentimentLabel;
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_GROUND_TRUTH: &str = "No ground truth labels found - skipping accuracy calculation";
pub const NO_VALID_PAIRS: &str = "No valid label pairs found for evaluation";

/// One prediction with its (optional) ground truth
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPrediction {
    /// `None` when the row has no ground-truth field at all
    pub true_label: Option<String>,
    pub predicted_label: String,
    pub confidence: f64,
}

impl LabeledPrediction {
    pub fn new(true_label: Option<&str>, predicted_label: &str, confidence: f64) -> Self {
        Self {
            true_label: true_label.map(str::to_string),
            predicted_label: predicted_label.to_string(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub total_samples: usize,
    pub correct_predictions: usize,
    pub class_metrics: BTreeMap<SentimentLabel, ClassMetrics>,
    pub confusion_matrix: BTreeMap<SentimentLabel, BTreeMap<SentimentLabel, usize>>,
    /// NaN when no prediction was correct
    pub avg_confidence_correct: f64,
    /// NaN when every prediction was correct
    pub avg_confidence_wrong: f64,
    pub evaluated_samples: usize,
    pub skipped_samples: usize,
}

impl EvaluationMetrics {
    pub fn confusion(&self, truth: SentimentLabel, predicted: SentimentLabel) -> usize {
        self.confusion_matrix
            .get(&truth)
            .and_then(|row| row.get(&predicted))
            .copied()
            .unwrap_or(0)
    }
}

/// Outcome of an evaluation; check the variant before reading numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evaluation {
    Metrics(EvaluationMetrics),
    NoGroundTruth { message: String },
    NoValidPairs { error: String },
}

impl Evaluation {
    pub fn metrics(&self) -> Option<&EvaluationMetrics> {
        match self {
            Evaluation::Metrics(m) => Some(m),
            _ => None,
        }
    }
}

/// Evaluate predictions against ground truth.
pub fn evaluate(rows: &[LabeledPrediction]) -> Evaluation {
    if rows.iter().all(|row| row.true_label.is_none()) {
        return Evaluation::NoGroundTruth {
            message: NO_GROUND_TRUTH.to_string(),
        };
    }

    let pairs: Vec<(SentimentLabel, SentimentLabel, f64)> = rows
        .iter()
        .filter_map(|row| {
            let truth = SentimentLabel::parse(row.true_label.as_deref()?)?;
            let predicted = SentimentLabel::parse(&row.predicted_label)?;
            Some((truth, predicted, row.confidence))
        })
        .collect();

    if pairs.is_empty() {
        return Evaluation::NoValidPairs {
            error: NO_VALID_PAIRS.to_string(),
        };
    }

    let evaluated = pairs.len();
    let correct = pairs.iter().filter(|(t, p, _)| t == p).count();

    let mut confusion_matrix = BTreeMap::new();
    for truth in SentimentLabel::ALL {
        let row: BTreeMap<SentimentLabel, usize> = SentimentLabel::ALL
            .into_iter()
            .map(|predicted| {
                let count = pairs
                    .iter()
                    .filter(|(t, p, _)| *t == truth && *p == predicted)
                    .count();
                (predicted, count)
            })
            .collect();
        confusion_matrix.insert(truth, row);
    }

    let class_metrics = SentimentLabel::ALL
        .into_iter()
        .map(|label| (label, class_metrics_for(label, &pairs)))
        .collect();

    let (right, wrong): (Vec<_>, Vec<_>) = pairs.iter().partition(|(t, p, _)| t == p);

    Evaluation::Metrics(EvaluationMetrics {
        accuracy: correct as f64 / evaluated as f64,
        total_samples: evaluated,
        correct_predictions: correct,
        class_metrics,
        confusion_matrix,
        avg_confidence_correct: mean(right.iter().map(|(_, _, c)| *c)),
        avg_confidence_wrong: mean(wrong.iter().map(|(_, _, c)| *c)),
        evaluated_samples: evaluated,
        skipped_samples: rows.len() - evaluated,
    })
}

fn class_metrics_for(
    label: SentimentLabel,
    pairs: &[(SentimentLabel, SentimentLabel, f64)],
) -> ClassMetrics {
    let tp = pairs.iter().filter(|(t, p, _)| *t == label && *p == label).count();
    let fp = pairs.iter().filter(|(t, p, _)| *t != label && *p == label).count();
    let fn_ = pairs.iter().filter(|(t, p, _)| *t == label && *p != label).count();

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        precision,
        recall,
        f1_score,
        support: tp + fn_,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}
