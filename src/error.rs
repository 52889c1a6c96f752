//! Error types for the sentiment client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SentimentError {
    /// The service answered, but its text was not the JSON object we asked for.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, SentimentError::Json(_))
    }
}

impl From<config::ConfigError> for SentimentError {
    fn from(err: config::ConfigError) -> Self {
        SentimentError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
