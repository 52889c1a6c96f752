//! LLM sentiment analysis
//!
//! - [`sanitize`]: trust boundary between raw model output and the rest of the crate
//! - [`prompt`]: strict and lenient prompt policies
//! - [`analyzer`]: prompt, call, retry, sanitize

pub mod analyzer;
pub mod prompt;
pub mod sanitize;


pub use analyzer::{parse_payload, AnalysisOutcome, RetryPolicy, SentimentAnalyzer};
pub use prompt::build_prompt;
pub use sanitize::sanitize;
