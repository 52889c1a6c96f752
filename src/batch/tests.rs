//! Tests for batch module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::model::ScriptedGenerator;
    use crate::sentiment::RetryPolicy;
    use std::sync::Arc;

    const POSITIVE: &str = r#"{"label": "Positive", "confidence": 0.9, "explanation": "Praise.", "evidence_phrases": ["great", "fun"]}"#;
    const NEGATIVE: &str = r#"{"label": "Negative", "confidence": 0.6, "explanation": "Complaints.", "evidence_phrases": []}"#;

    fn table(csv: &str) -> ReviewTable {
        ReviewTable::from_reader(csv.as_bytes()).unwrap()
    }

    fn runner(generator: Arc<ScriptedGenerator>) -> BatchRunner {
        BatchRunner::new(SentimentAnalyzer::new(
            Box::new(generator),
            RetryPolicy::immediate(),
        ))
    }

    #[test]
    fn test_table_requires_review_column() {
        let err = ReviewTable::from_reader("text,score\nhello,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SentimentError::Input(_)));
        assert!(err.to_string().contains("'review'"));
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let err = ReviewTable::from_reader("review,true_sentiment\na,Positive\nb\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, SentimentError::Csv(_)));
    }

    #[test]
    fn test_table_missing_file_is_input_error() {
        let err = ReviewTable::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SentimentError::Input(_)));
    }

    #[test]
    fn test_set_column_appends_then_overwrites() {
        let mut t = table("review\na\nb\n");
        t.set_column("confidence", vec!["1".into(), "2".into()]).unwrap();
        t.set_column("confidence", vec!["3".into(), "4".into()]).unwrap();

        assert_eq!(t.headers(), &["review".to_string(), "confidence".to_string()]);
        assert_eq!(t.column("confidence").unwrap(), vec!["3", "4"]);
        assert!(t.set_column("x", vec!["only one".into()]).is_err());
    }

    #[test]
    fn test_table_round_trips_quoted_text() {
        let t = table("review\n\"Loved it, truly.\"\n\"He said \"\"wow\"\"\"\n");
        let mut out = Vec::new();
        t.write_to(&mut out).unwrap();
        assert_eq!(table(std::str::from_utf8(&out).unwrap()), t);
    }

    #[tokio::test]
    async fn test_run_annotates_rows_in_order() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_reply(POSITIVE)
                .then_reply(NEGATIVE),
        );
        let report = runner(generator.clone())
            .run(
                table("id,review\n1,Great fun\n2,Dull and long\n"),
                &BatchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(generator.calls(), 2);
        assert_eq!(report.failed, 0);
        let t = &report.table;
        assert_eq!(t.column("predicted_sentiment").unwrap(), vec!["Positive", "Negative"]);
        assert_eq!(t.column("confidence").unwrap(), vec!["0.9", "0.6"]);
        assert_eq!(t.column("evidence_phrases").unwrap(), vec!["great, fun", ""]);
        assert_eq!(t.column("analysis_mode").unwrap(), vec!["lenient", "lenient"]);
        assert!(!t.has_column("correct"));
        assert!(matches!(report.evaluation, Evaluation::NoGroundTruth { .. }));
    }

    #[tokio::test]
    async fn test_run_skips_blank_and_placeholder_reviews() {
        let generator = Arc::new(ScriptedGenerator::always(POSITIVE));
        let report = runner(generator.clone())
            .run(
                table("review\n\"   \"\nnan\nNone\nA lovely film\n"),
                &BatchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(report.results[0].confidence, 0.0);
        assert_eq!(report.results[0].explanation, EMPTY_REVIEW_EXPLANATION);
        assert_eq!(report.results[1].label, SentimentLabel::Neutral);
        assert_eq!(report.results[3].label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_run_with_ground_truth_evaluates() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_reply(POSITIVE)
                .then_reply(POSITIVE)
                .then_reply(r#"{"label": "Neutral", "confidence": 0.8}"#),
        );
        let csv = "review,true_sentiment\nsuperb,positive\nmeh,Negative\nfine, Neutral \n";
        let report = runner(generator)
            .run(table(csv), &BatchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.table.column("correct").unwrap(), vec!["true", "false", "true"]);
        let metrics = report.evaluation.metrics().unwrap();
        assert!((metrics.accuracy - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.confusion(SentimentLabel::Negative, SentimentLabel::Positive), 1);
    }

    #[tokio::test]
    async fn test_run_counts_failures_and_completes() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_fail("500")
                .then_fail("500")
                .then_fail("500")
                .then_reply(POSITIVE),
        );
        let report = runner(generator.clone())
            .run(table("review\nfirst\nsecond\n"), &BatchOptions::default())
            .await
            .unwrap();

        assert_eq!(generator.calls(), 4);
        assert_eq!(report.failed, 1);
        assert!(report.results[0].explanation.starts_with("Analysis failed after 3 attempts"));
        assert_eq!(report.results[1].label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_run_respects_limit_and_mode() {
        let generator = Arc::new(ScriptedGenerator::always(NEGATIVE));
        let options = BatchOptions {
            mode: AnalysisMode::Strict,
            limit: Some(2),
            verbose: true,
        };
        let report = runner(generator.clone())
            .run(table("review\na\nb\nc\nd\n"), &options)
            .await
            .unwrap();

        assert_eq!(report.table.len(), 2);
        assert_eq!(generator.calls(), 2);
        assert!(generator.prompts()[0].contains("Neutral: the default"));
        assert_eq!(report.table.column("analysis_mode").unwrap(), vec!["strict", "strict"]);
    }

    #[tokio::test]
    async fn test_zero_limit_processes_every_row() {
        let generator = Arc::new(ScriptedGenerator::always(NEGATIVE));
        let options = BatchOptions {
            limit: Some(0),
            ..BatchOptions::default()
        };
        let report = runner(generator.clone())
            .run(table("review\na\nb\nc\n"), &options)
            .await
            .unwrap();

        assert_eq!(options.effective_limit(), None);
        assert_eq!(report.table.len(), 3);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_distribution_and_average_confidence() {
        let generator = Arc::new(ScriptedGenerator::new().then_reply(POSITIVE).then_reply(NEGATIVE));
        let report = runner(generator)
            .run(table("review\na\nb\n"), &BatchOptions::default())
            .await
            .unwrap();

        let dist = report.distribution();
        assert_eq!(dist[&SentimentLabel::Positive], 1);
        assert_eq!(dist[&SentimentLabel::Negative], 1);
        assert_eq!(dist[&SentimentLabel::Neutral], 0);
        assert!((report.average_confidence() - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_write_outputs_with_and_without_metrics() {
        let dir = tempfile::tempdir().unwrap();

        let generator = Arc::new(ScriptedGenerator::always(POSITIVE));
        let labeled = runner(generator.clone())
            .run(table("review,true_sentiment\ngood,Positive\n"), &BatchOptions::default())
            .await
            .unwrap();
        let out = dir.path().join("labeled_results.csv");
        let sidecar = write_outputs(&labeled, &out).unwrap().expect("sidecar");

        assert_eq!(sidecar, dir.path().join("labeled_results_metrics.json"));
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();
        assert_eq!(doc["accuracy"], 1.0);
        assert_eq!(doc["analysis_mode"], "lenient");
        assert!(doc["generated_at"].is_string());
        assert!(doc["avg_confidence_wrong"].is_null());

        let written = ReviewTable::from_path(&out).unwrap();
        assert_eq!(written.column("correct").unwrap(), vec!["true"]);

        let unlabeled = runner(generator)
            .run(table("review\ngood\n"), &BatchOptions::default())
            .await
            .unwrap();
        let out = dir.path().join("plain.csv");
        assert!(write_outputs(&unlabeled, &out).unwrap().is_none());
        assert!(out.exists());
        assert!(!dir.path().join("plain_metrics.json").exists());
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(
            default_output_path(Path::new("data/reviews.csv")),
            Path::new("data/reviews_results.csv")
        );
        assert_eq!(
            metrics_path(Path::new("out/run.csv")),
            Path::new("out/run_metrics.json")
        );
    }
}
