//! Text generation backends
//!
//! The sentiment analyzer talks to the model through [`TextGenerator`] so the
//! HTTP client can be swapped for scripted responses in tests.

mod llm;
pub mod mock;

pub use llm::{LlmClient, LlmProvider};
pub use mock::ScriptedGenerator;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// One prompt sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Ask the provider to constrain output to JSON where it supports that
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn json(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            json_output: true,
        }
    }
}

/// External text-generation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the raw text produced for `request`
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}
