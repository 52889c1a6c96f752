//! Batch processing of review files
//!
//! Reads a CSV with a `review` column, analyzes every row in order, appends the
//! predictions and evaluates them when a `true_sentiment` column is present.

mod report;
mod table;

#[cfg(test)]
mod tests;

pub use report::{print_distribution, print_summary};
pub use table::{ReviewTable, REVIEW_COLUMN, TRUTH_COLUMN};

use crate::error::{Result, SentimentError};
use crate::evaluation::{evaluate, Evaluation, EvaluationMetrics, LabeledPrediction};
use crate::sentiment::{AnalysisOutcome, SentimentAnalyzer};
use crate::types::{AnalysisMode, SentimentLabel, SentimentResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const EMPTY_REVIEW_EXPLANATION: &str = "Empty or missing review text";

/// Placeholders spreadsheet exports use for missing cells
const MISSING_MARKERS: [&str; 3] = ["nan", "none", "null"];

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub mode: AnalysisMode,
    /// Only process the first N rows; 0 means no limit
    pub limit: Option<usize>,
    /// Log every row's verdict at info level
    pub verbose: bool,
}

impl BatchOptions {
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&n| n > 0)
    }
}

/// Everything a batch run produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Input rows augmented with prediction columns
    pub table: ReviewTable,
    pub results: Vec<SentimentResult>,
    pub evaluation: Evaluation,
    /// Rows whose analysis exhausted its retries
    pub failed: usize,
    pub elapsed: Duration,
    pub mode: AnalysisMode,
}

impl BatchReport {
    /// Predicted label counts; every label is present
    pub fn distribution(&self) -> BTreeMap<SentimentLabel, usize> {
        let mut counts: BTreeMap<SentimentLabel, usize> =
            SentimentLabel::ALL.into_iter().map(|l| (l, 0)).collect();
        for result in &self.results {
            *counts.entry(result.label).or_default() += 1;
        }
        counts
    }

    /// Mean confidence over all rows; NaN for an empty batch
    pub fn average_confidence(&self) -> f64 {
        if self.results.is_empty() {
            return f64::NAN;
        }
        self.results.iter().map(|r| r.confidence).sum::<f64>() / self.results.len() as f64
    }
}

/// Sidecar document written next to the results CSV
#[derive(Debug, Serialize)]
struct MetricsDocument<'a> {
    generated_at: DateTime<Utc>,
    analysis_mode: AnalysisMode,
    #[serde(flatten)]
    metrics: &'a EvaluationMetrics,
}

/// Runs the analyzer over a review table, one row at a time
pub struct BatchRunner {
    analyzer: SentimentAnalyzer,
}

impl BatchRunner {
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self { analyzer }
    }

    pub async fn run(&self, mut table: ReviewTable, options: &BatchOptions) -> Result<BatchReport> {
        let review_idx = table.column_index(REVIEW_COLUMN).ok_or_else(|| {
            SentimentError::Input(format!("missing '{}' column", REVIEW_COLUMN))
        })?;
        if let Some(limit) = options.effective_limit() {
            table.truncate(limit);
        }

        let started = Instant::now();
        let total = table.len();
        let delay = self.analyzer.policy().request_delay;
        let mut results = Vec::with_capacity(total);
        let mut failed = 0;

        tracing::info!("Analyzing {} reviews in {} mode", total, options.mode);

        for (i, row) in table.rows().iter().enumerate() {
            let review = row.get(review_idx).map(|s| s.trim()).unwrap_or("");
            tracing::debug!("Processing review {} of {}", i + 1, total);

            let outcome = if is_missing(review) {
                AnalysisOutcome {
                    result: SentimentResult::neutral(0.0, EMPTY_REVIEW_EXPLANATION),
                    attempts: 0,
                    error: None,
                }
            } else {
                self.analyzer.analyze_detailed(review, options.mode).await
            };

            if outcome.failed() {
                failed += 1;
                tracing::warn!(
                    "Review {} fell back to Neutral: {}",
                    i + 1,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            } else if options.verbose {
                tracing::info!(
                    "Review {}: {} ({:.2})",
                    i + 1,
                    outcome.result.label,
                    outcome.result.confidence
                );
            }

            let called_model = outcome.attempts > 0;
            results.push(outcome.result);

            if called_model && i + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let elapsed = started.elapsed();
        let truth: Option<Vec<String>> = table
            .column(TRUTH_COLUMN)
            .map(|cells| cells.into_iter().map(str::to_string).collect());

        annotate(&mut table, &results, truth.as_deref(), options.mode)?;

        let labeled: Vec<LabeledPrediction> = results
            .iter()
            .enumerate()
            .map(|(i, r)| LabeledPrediction {
                true_label: truth.as_ref().map(|t| t[i].clone()),
                predicted_label: r.label.to_string(),
                confidence: r.confidence,
            })
            .collect();
        let evaluation = evaluate(&labeled);

        Ok(BatchReport {
            table,
            results,
            evaluation,
            failed,
            elapsed,
            mode: options.mode,
        })
    }
}

/// Append prediction columns (and `correct` when ground truth exists)
fn annotate(
    table: &mut ReviewTable,
    results: &[SentimentResult],
    truth: Option<&[String]>,
    mode: AnalysisMode,
) -> Result<()> {
    table.set_column("predicted_sentiment", column_of(results, |r| r.label.to_string()))?;
    table.set_column("confidence", column_of(results, |r| r.confidence.to_string()))?;
    table.set_column("explanation", column_of(results, |r| r.explanation.clone()))?;
    table.set_column("evidence_phrases", column_of(results, |r| r.evidence_joined()))?;
    table.set_column("analysis_mode", column_of(results, |_| mode.to_string()))?;

    if let Some(truth) = truth {
        let correct = truth
            .iter()
            .zip(results)
            .map(|(t, r)| (SentimentLabel::parse(t) == Some(r.label)).to_string())
            .collect();
        table.set_column("correct", correct)?;
    }
    Ok(())
}

fn column_of(results: &[SentimentResult], f: impl Fn(&SentimentResult) -> String) -> Vec<String> {
    results.iter().map(f).collect()
}

fn is_missing(review: &str) -> bool {
    review.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|m| review.eq_ignore_ascii_case(m))
}

/// `<dir>/<stem>_results.csv` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reviews".to_string());
    input.with_file_name(format!("{}_results.csv", stem))
}

/// `<dir>/<stem>_metrics.json` next to the results CSV
pub fn metrics_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    output.with_file_name(format!("{}_metrics.json", stem))
}

/// Write the results CSV and, when evaluation produced numbers, the metrics sidecar.
///
/// Returns the sidecar path if one was written.
pub fn write_outputs(report: &BatchReport, output: &Path) -> Result<Option<PathBuf>> {
    report.table.save(output)?;
    tracing::info!("Results written to {}", output.display());

    let Some(metrics) = report.evaluation.metrics() else {
        return Ok(None);
    };

    let doc = MetricsDocument {
        generated_at: Utc::now(),
        analysis_mode: report.mode,
        metrics,
    };
    let path = metrics_path(output);
    std::fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
    tracing::info!("Metrics written to {}", path.display());
    Ok(Some(path))
}
