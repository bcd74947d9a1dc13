use crate::types::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for non-streaming chat completions against a generative text provider.
///
/// One call per logical operation; retries, if any, belong to the caller.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send role-tagged messages, return the generated text.
    async fn complete(&self, messages: &[ChatMessage], options: &CompleteOptions)
        -> Result<String>;

    /// JSON-mode completion with a schema hint, for providers that support it.
    ///
    /// Default implementation falls back to a plain completion; callers must
    /// still be prepared for non-JSON output either way.
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        _schema: &Value,
    ) -> Result<String> {
        self.complete(messages, &CompleteOptions::default()).await
    }
}

/// Trait for condensing a message transcript into a short summary.
///
/// A provider may implement this natively or by delegating to another client.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &[String]) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct CompleteOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_output_tokens: Some(2000),
        }
    }
}

impl CompleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}
