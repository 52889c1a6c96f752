//! Scripted text generator
//!
//! Replays a fixed sequence of replies and failures, for:
//! - Unit tests without network calls
//! - Dry runs of the batch pipeline

use super::{GenerationRequest, TextGenerator};
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Step {
    Reply(String),
    Fail(String),
}

/// Generator that answers from a script and records every prompt it saw
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Step>>,
    fallback: Option<Step>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `text` once the script is used up
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(Step::Reply(text.into())),
            ..Self::default()
        }
    }

    /// Always fail with a service error once the script is used up
    pub fn always_failing(message: impl Into<String>) -> Self {
        Self {
            fallback: Some(Step::Fail(message.into())),
            ..Self::default()
        }
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Step::Reply(text.into()))
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Step::Fail(message.into()))
    }

    fn push(self, step: Step) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.prompts
            .lock()
            .map_err(|_| SentimentError::Internal("prompt log poisoned".into()))?
            .push(request.prompt.clone());

        let step = self
            .script
            .lock()
            .map_err(|_| SentimentError::Internal("script poisoned".into()))?
            .pop_front()
            .or_else(|| self.fallback.clone());

        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(message)) => Err(SentimentError::Api(message)),
            None => Err(SentimentError::Api("script exhausted".into())),
        }
    }
}
