//! Movie Review Sentiment Analyzer
//!
//! Sends review text to a large language model, sanitizes the JSON verdict and
//! evaluates batches of predictions against ground-truth labels.

pub mod batch;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod sentiment;
pub mod types;

#[cfg(test)]
mod error_tests;
