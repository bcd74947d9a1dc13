// OpenAI client (HTTP direct, no SDK)

use crate::traits::{ChatClient, CompleteOptions, Summarizer};
use crate::types::ChatMessage;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    summary_delegate: Option<Arc<dyn Summarizer>>,
}

impl OpenAIClient {
    /// Create a new client. A missing API key leaves the client constructible
    /// but every call fails fast until one is configured.
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!("OpenAI API key not configured, chat calls will fail");
        }

        Self {
            http_client: reqwest::Client::new(),
            base_url: OPENAI_API_BASE.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            summary_delegate: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Route summarization through another provider.
    pub fn with_summary_delegate(mut self, delegate: Arc<dyn Summarizer>) -> Self {
        self.summary_delegate = Some(delegate);
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("OpenAI client not initialized: missing API key"))
    }

    fn build_request(&self, messages: &[ChatMessage], options: &CompleteOptions) -> Value {
        let wire_messages: Vec<Value> = messages
            .iter()
            .map(|m| serde_json::json!({ "role": m.role_str(), "content": m.content }))
            .collect();

        let mut request = serde_json::json!({
            "model": self.model,
            "messages": wire_messages,
        });

        let obj = request.as_object_mut().expect("request is an object");
        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }

        request
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompleteOptions,
    ) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);
        let payload = self.build_request(messages, options);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(model = %self.model, %status, error = %body, "OpenAI API error");
            bail!("OpenAI API returned {}", status);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to decode OpenAI response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty());

        match content {
            Some(content) => Ok(content.trim().to_string()),
            None => {
                tracing::error!(model = %self.model, "OpenAI returned no message content");
                bail!("No response generated from OpenAI")
            }
        }
    }
}

#[async_trait]
impl Summarizer for OpenAIClient {
    async fn summarize(&self, transcript: &[String]) -> Result<String> {
        if let Some(delegate) = &self.summary_delegate {
            return delegate.summarize(transcript).await;
        }

        let conversation = transcript.join("\n\n");
        let messages = vec![
            ChatMessage::system(
                "You are a helpful assistant that creates concise summaries of conversations. \
                 Summarize the key points and outcomes in 2-3 sentences.",
            ),
            ChatMessage::user(format!("Please summarize this conversation:\n\n{conversation}")),
        ];

        self.complete(&messages, &CompleteOptions::default()).await
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_roles_and_options() {
        let client = OpenAIClient::new(Some("key".to_string()));
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let payload = client.build_request(
            &messages,
            &CompleteOptions::new().temperature(0.2).max_output_tokens(64),
        );

        assert_eq!(payload["model"], DEFAULT_MODEL);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "hi");
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["max_tokens"], 64);
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client = OpenAIClient::new(None);
        let err = client
            .complete(&[ChatMessage::user("hello")], &CompleteOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not initialized"));
    }
}
