//! Console summary of a batch run

use super::BatchReport;
use crate::evaluation::Evaluation;

/// Print the evaluation summary, branching on the marker variants first
pub fn print_summary(evaluation: &Evaluation) {
    let metrics = match evaluation {
        Evaluation::NoGroundTruth { message } => {
            println!("\n📝 {}", message);
            return;
        }
        Evaluation::NoValidPairs { error } => {
            println!("\n⚠️  No performance metrics available");
            println!("Issue: {}", error);
            return;
        }
        Evaluation::Metrics(m) => m,
    };

    println!("\n{}", "=".repeat(65));
    println!("📊 ANALYSIS RESULTS SUMMARY");
    println!("{}", "=".repeat(65));

    println!("🎯 Overall Accuracy: {:.1}%", metrics.accuracy * 100.0);
    println!("📝 Total Reviews Analyzed: {}", metrics.total_samples);
    println!("✅ Correct Predictions: {}", metrics.correct_predictions);
    if metrics.skipped_samples > 0 {
        println!(
            "⚠️  Reviews Skipped: {} (invalid labels)",
            metrics.skipped_samples
        );
    }

    println!("\n📈 Average Confidence Scores:");
    println!("   Correct predictions: {}", percent(metrics.avg_confidence_correct));
    println!("   Incorrect predictions: {}", percent(metrics.avg_confidence_wrong));

    println!("\n📋 Performance by Sentiment:");
    for (label, stats) in &metrics.class_metrics {
        println!("\n   {}:", label);
        println!("      Precision: {:.3}", stats.precision);
        println!("      Recall: {:.3}", stats.recall);
        println!("      F1-Score: {:.3}", stats.f1_score);
        println!("      Number of samples: {}", stats.support);
    }

    println!("\n🔄 Confusion Matrix (rows = true, columns = predicted):");
    let short = |s: &str| s.chars().take(6).collect::<String>();
    print!("{:>9}", "");
    for label in metrics.confusion_matrix.keys() {
        print!("{:>8}", short(label.as_str()));
    }
    println!();
    for (truth, row) in &metrics.confusion_matrix {
        print!("{:>8} ", short(truth.as_str()));
        for count in row.values() {
            print!("{:>8}", count);
        }
        println!();
    }
}

/// Print the predicted-label breakdown and average confidence
pub fn print_distribution(report: &BatchReport) {
    let total = report.results.len();
    if total == 0 {
        println!("\n📈 No reviews were processed");
        return;
    }

    println!("\n📈 Sentiment Distribution:");
    for (label, count) in report.distribution() {
        println!(
            "   {}: {} reviews ({:.1}%)",
            label,
            count,
            count as f64 / total as f64 * 100.0
        );
    }
    println!(
        "\n🎯 Average Confidence Score: {}",
        percent(report.average_confidence())
    );
}

fn percent(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.1}%", value * 100.0)
    }
}
