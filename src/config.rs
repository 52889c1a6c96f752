//! Configuration management

use crate::error::{Result, SentimentError};
use crate::types::AnalysisMode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "REVIEW_SENTIMENT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider (gemini, openai, anthropic, deepseek, ollama, compatible)
    pub provider: String,
    /// API key; falls back to the provider's conventional environment variable
    pub api_key: String,
    /// Model name (provider default when unset)
    pub model: Option<String>,
    /// Endpoint override for OpenAI-style and self-hosted providers
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Prompt policy used when the CLI does not override it
    pub mode: AnalysisMode,
    /// Sampling temperature sent with every request
    pub temperature: f32,
    /// Total attempts per review, including the first
    pub max_attempts: u32,
    /// Base wait after an unparseable response, multiplied by the attempt number
    pub parse_backoff_ms: u64,
    /// Base wait after a transport or service failure, multiplied by the attempt number
    pub service_backoff_ms: u64,
    /// Pause between consecutive reviews in a batch
    pub request_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: String::new(),
            model: None,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Lenient,
            temperature: 0.1,
            max_attempts: 3,
            parse_backoff_ms: 500,
            service_backoff_ms: 800,
            request_delay_ms: 200,
        }
    }
}

impl LlmConfig {
    /// Environment variable conventionally holding this provider's key
    pub fn key_env_var(&self) -> Option<&'static str> {
        match self.provider.to_lowercase().as_str() {
            "gemini" | "google" => Some("GEMINI_API_KEY"),
            "openai" | "gpt" => Some("OPENAI_API_KEY"),
            "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
            "deepseek" => Some("DEEPSEEK_API_KEY"),
            _ => None,
        }
    }

    /// Whether the provider can be called without credentials
    pub fn key_optional(&self) -> bool {
        matches!(
            self.provider.to_lowercase().as_str(),
            "ollama" | "compatible" | "custom"
        )
    }

    /// Fill `api_key` from the environment when the config left it empty.
    ///
    /// Fails when the provider needs a key and none could be found.
    pub fn resolve_api_key(&mut self) -> Result<()> {
        if !self.api_key.trim().is_empty() {
            return Ok(());
        }
        if let Some(var) = self.key_env_var() {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    self.api_key = key.trim().to_string();
                    return Ok(());
                }
            }
            if !self.key_optional() {
                return Err(SentimentError::Config(format!(
                    "{} environment variable is required for provider '{}'",
                    var, self.provider
                )));
            }
        }
        if self.key_optional() {
            return Ok(());
        }
        Err(SentimentError::Config(format!(
            "api_key required for provider '{}'",
            self.provider
        )))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AnalysisConfig {
    pub fn parse_backoff(&self) -> Duration {
        Duration::from_millis(self.parse_backoff_ms)
    }

    pub fn service_backoff(&self) -> Duration {
        Duration::from_millis(self.service_backoff_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Config {
    /// Load configuration from file, overlaid with environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations; defaults plus environment when no file exists
    pub fn load_default() -> Result<Self> {
        let paths = [
            "review-sentiment.toml",
            "review-sentiment.yaml",
            "~/.config/review-sentiment/config.toml",
        ];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                tracing::debug!("Loading config from {}", expanded);
                return Self::load(expanded.as_ref());
            }
        }

        let settings = config::Config::builder().add_source(env_source()).build()?;
        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
