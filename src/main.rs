//! Movie Review Sentiment Analyzer
//!
//! Command-line front end: batch CSV processing, single reviews and a connection check.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::seq::IndexedRandom;
use review_sentiment::{
    batch::{self, BatchOptions, BatchRunner, ReviewTable},
    config::Config,
    model::LlmClient,
    sentiment::{RetryPolicy, SentimentAnalyzer},
    types::{AnalysisMode, SentimentResult},
};
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SAMPLE_REVIEWS: [&str; 5] = [
    "This movie was absolutely fantastic! Amazing acting and incredible plot twists.",
    "Terrible movie. Poor acting, boring plot, and a complete waste of time. I walked out halfway through.",
    "The movie was okay. Not bad but not great either. Some good moments but overall pretty average.",
    "The film has some interesting visual elements and decent performances, though the plot feels a bit rushed.",
    "I loved the cinematography but found the dialogue somewhat predictable. Overall entertaining.",
];

#[derive(Parser)]
#[command(name = "review-sentiment")]
#[command(about = "Sentiment analysis of movie reviews with a large language model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to review-sentiment.toml or ~/.config/review-sentiment/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show detailed progress information
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every review in a CSV file (needs a 'review' column)
    Batch {
        /// CSV file containing movie reviews
        input: PathBuf,
        /// Output CSV path (default: <input>_results.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only process the first N reviews (0 processes all)
        #[arg(short, long)]
        sample: Option<usize>,
        /// Prompt policy (overrides config)
        #[arg(short, long, value_enum)]
        mode: Option<AnalysisMode>,
    },
    /// Analyze a single review given as argument, on stdin, or picked at random
    Analyze {
        /// Review text; read from stdin when omitted
        text: Option<String>,
        /// Analyze a random built-in example review
        #[arg(long, conflicts_with = "text")]
        example: bool,
        /// Prompt policy (overrides config)
        #[arg(short, long, value_enum)]
        mode: Option<AnalysisMode>,
    },
    /// Check that the configured model answers with usable JSON
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Batch {
            input,
            output,
            sample,
            mode,
        } => {
            let options = BatchOptions {
                mode: mode.unwrap_or(config.analysis.mode),
                limit: sample,
                verbose: cli.verbose,
            };
            run_batch(&config, input, output, options).await
        }
        Commands::Analyze {
            text,
            example,
            mode,
        } => analyze_one(&config, text, example, mode.unwrap_or(config.analysis.mode)).await,
        Commands::Check => check(&config).await,
    }
}

fn build_analyzer(config: &Config) -> anyhow::Result<SentimentAnalyzer> {
    let mut llm = config.llm.clone();
    llm.resolve_api_key()?;
    let client = LlmClient::from_config(&llm)?;
    tracing::info!("Using {} for sentiment analysis", client.name());

    Ok(SentimentAnalyzer::new(
        Box::new(client),
        RetryPolicy::from(&config.analysis),
    ))
}

async fn run_batch(
    config: &Config,
    input: PathBuf,
    output: Option<PathBuf>,
    options: BatchOptions,
) -> anyhow::Result<()> {
    // Credentials first, so a long file is not parsed for nothing
    let analyzer = build_analyzer(config)?;
    let output = output.unwrap_or_else(|| batch::default_output_path(&input));

    println!("🎬 Movie Review Sentiment Analysis - Batch Processing");
    println!("📁 Input file: {}", input.display());
    println!("💾 Output file: {}", output.display());

    let table = ReviewTable::from_path(&input)
        .with_context(|| format!("Error reading CSV file {}", input.display()))?;
    match options.effective_limit() {
        Some(limit) => println!(
            "📝 Processing first {} reviews (sample mode)",
            limit.min(table.len())
        ),
        None => println!("📝 Processing {} reviews", table.len()),
    }

    println!("\n🤖 Analyzing sentiment in {} mode...", options.mode);
    let started = Instant::now();
    let report = BatchRunner::new(analyzer).run(table, &options).await?;
    let total_secs = started.elapsed().as_secs_f64();

    println!("\n✅ Analysis completed");
    let processed = report.results.len().max(1);
    println!(
        "⏱️  Total processing time: {:.1} seconds ({:.1}s per review)",
        total_secs,
        total_secs / processed as f64
    );
    if report.failed > 0 {
        println!(
            "⚠️  {} reviews failed analysis and were assigned default values",
            report.failed
        );
    }

    if let Some(sidecar) = batch::write_outputs(&report, &output)? {
        println!("📊 Performance metrics saved to: {}", sidecar.display());
    }
    println!("✅ Analysis results saved to: {}", output.display());

    batch::print_summary(&report.evaluation);
    batch::print_distribution(&report);

    Ok(())
}

async fn analyze_one(
    config: &Config,
    text: Option<String>,
    example: bool,
    mode: AnalysisMode,
) -> anyhow::Result<()> {
    let review = if example {
        let picked = SAMPLE_REVIEWS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(SAMPLE_REVIEWS[0]);
        println!("Example review: {}", picked);
        picked.to_string()
    } else if let Some(text) = text {
        text
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read review from stdin")?;
        buf
    };

    if review.trim().is_empty() {
        anyhow::bail!("Please enter a review to analyze.");
    }

    let analyzer = build_analyzer(config)?;
    let result = analyzer.analyze(&review, mode).await;
    display_result(&result, mode);
    Ok(())
}

fn display_result(result: &SentimentResult, mode: AnalysisMode) {
    println!("\n{} [{} mode]", result.label, mode);
    println!("Confidence: {:.1}%", result.confidence * 100.0);
    println!("Analysis: {}", result.explanation);

    if !result.evidence_phrases.is_empty() {
        println!("\nKey phrases that influenced this classification:");
        for phrase in result.evidence_phrases.iter().take(5) {
            println!("  • {}", phrase);
        }
    }
}

async fn check(config: &Config) -> anyhow::Result<()> {
    let analyzer = build_analyzer(config)?;
    if analyzer.check_connection().await {
        println!("✅ System is functioning correctly!");
        Ok(())
    } else {
        anyhow::bail!("Configuration issue detected. Please check your API key and model settings.")
    }
}
