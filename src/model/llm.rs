//! HTTP text-generation client
//!
//! Supports multiple LLM providers: Gemini, DeepSeek, Anthropic, OpenAI, and OpenAI-compatible APIs.

use super::{GenerationRequest, TextGenerator};
use crate::config::LlmConfig;
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEEPSEEK_URL: &str = "https://api.deepseek.com";
const ANTHROPIC_URL: &str = "https://api.anthropic.com";
const OPENAI_URL: &str = "https://api.openai.com";
const OLLAMA_URL: &str = "http://localhost:11434";

/// LLM client for sentiment queries
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
}

#[derive(Debug, Clone)]
pub enum LlmProvider {
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
    DeepSeek {
        api_key: String,
        model: String,
        base_url: String,
    },
    Anthropic {
        api_key: String,
        model: String,
        base_url: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    /// OpenAI-compatible API (Ollama, vLLM, etc.)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

impl LlmClient {
    /// Create from config; the API key must already be resolved
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let model = |default: &str| config.model.clone().unwrap_or_else(|| default.to_string());
        let base_url = |default: &str| {
            config
                .base_url
                .clone()
                .unwrap_or_else(|| default.to_string())
        };

        let provider = match config.provider.to_lowercase().as_str() {
            "gemini" | "google" => LlmProvider::Gemini {
                api_key: config.api_key.clone(),
                model: model("gemini-1.5-flash"),
                base_url: base_url(GEMINI_URL),
            },
            "deepseek" => LlmProvider::DeepSeek {
                api_key: config.api_key.clone(),
                model: model("deepseek-chat"),
                base_url: base_url(DEEPSEEK_URL),
            },
            "anthropic" | "claude" => LlmProvider::Anthropic {
                api_key: config.api_key.clone(),
                model: model("claude-sonnet-4-20250514"),
                base_url: base_url(ANTHROPIC_URL),
            },
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: config.api_key.clone(),
                model: model("gpt-4o-mini"),
                base_url: base_url(OPENAI_URL),
            },
            "ollama" => LlmProvider::Compatible {
                api_key: None,
                model: model("qwen2.5:14b"),
                base_url: base_url(OLLAMA_URL),
            },
            "compatible" | "custom" => LlmProvider::Compatible {
                api_key: if config.api_key.is_empty() {
                    None
                } else {
                    Some(config.api_key.clone())
                },
                model: config.model.clone().ok_or_else(|| {
                    SentimentError::Config("model required for compatible provider".into())
                })?,
                base_url: config.base_url.clone().ok_or_else(|| {
                    SentimentError::Config("base_url required for compatible provider".into())
                })?,
            },
            _ => {
                return Err(SentimentError::Config(format!(
                    "Unknown LLM provider: {}",
                    config.provider
                )))
            }
        };

        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, provider })
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn name(&self) -> &str {
        match &self.provider {
            LlmProvider::Gemini { .. } => "Gemini",
            LlmProvider::DeepSeek { .. } => "DeepSeek",
            LlmProvider::Anthropic { .. } => "Claude",
            LlmProvider::OpenAI { .. } => "GPT",
            LlmProvider::Compatible { model, .. } => model,
        }
    }

    async fn call_gemini(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        };

        let req = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ))
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body);

        let text = self.send(req).await?;
        let response: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            SentimentError::Api(format!("Malformed Gemini envelope: {} - response: {}", e, preview(&text)))
        })?;

        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .find(|t| !t.is_empty())
            .ok_or_else(|| SentimentError::Api("Empty response from Gemini".into()))
    }

    async fn call_openai_compatible(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = OpenAIRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            response_format: request.json_output.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url.trim_end_matches('/')))
            .header("content-type", "application/json");

        if let Some(key) = api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let text = self.send(req.json(&body)).await?;
        let response: OpenAIResponse = serde_json::from_str(&text).map_err(|e| {
            SentimentError::Api(format!("Malformed completion envelope: {} - response: {}", e, preview(&text)))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SentimentError::Api("Empty response from LLM".into()))
    }

    async fn call_anthropic(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = AnthropicRequest {
            model: model.to_string(),
            max_tokens: 1024,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let req = self
            .http
            .post(format!("{}/v1/messages", base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body);

        let text = self.send(req).await?;
        let response: AnthropicResponse = serde_json::from_str(&text).map_err(|e| {
            SentimentError::Api(format!("Malformed Anthropic envelope: {} - response: {}", e, preview(&text)))
        })?;

        response
            .content
            .into_iter()
            .map(|c| c.text)
            .find(|t| !t.is_empty())
            .ok_or_else(|| SentimentError::Api("Empty response from Anthropic".into()))
    }

    /// Send the request and return the body, turning non-2xx statuses into API errors
    async fn send(&self, req: RequestBuilder) -> Result<String> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!("LLM raw response ({}): {}", status, preview(&text));

        if !status.is_success() {
            return Err(SentimentError::Api(format!(
                "{} returned {}: {}",
                self.name(),
                status,
                preview(&text)
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match &self.provider {
            LlmProvider::Gemini { api_key, model, base_url } => {
                self.call_gemini(base_url, api_key, model, request).await
            }
            LlmProvider::DeepSeek { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, Some(api_key), model, request)
                    .await
            }
            LlmProvider::Anthropic { api_key, model, base_url } => {
                self.call_anthropic(base_url, api_key, model, request).await
            }
            LlmProvider::OpenAI { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, Some(api_key), model, request)
                    .await
            }
            LlmProvider::Compatible { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, api_key.as_deref(), model, request)
                    .await
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
