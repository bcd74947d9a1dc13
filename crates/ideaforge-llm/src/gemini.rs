// Gemini client (HTTP direct, no SDK)

use crate::traits::{ChatClient, CompleteOptions, Summarizer};
use crate::types::{ChatMessage, ChatRole};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    /// Create a new client. A missing API key leaves the client constructible
    /// but every call fails fast until one is configured.
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!("Gemini API key not configured, generation calls will fail");
        }

        Self {
            http_client: reqwest::Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Gemini client not initialized: missing API key"))
    }

    /// Gemini takes a single prompt string; fold the role-tagged history into one.
    fn flatten_messages(messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();
        for message in messages {
            let tag = match message.role {
                ChatRole::System => "System",
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            prompt.push_str(tag);
            prompt.push_str(": ");
            prompt.push_str(&message.content);
            prompt.push_str("\n\n");
        }
        prompt.trim_end().to_string()
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        options: &CompleteOptions,
        response_schema: Option<&Value>,
    ) -> Value {
        let prompt = Self::flatten_messages(messages);

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(schema) = response_schema {
            generation_config.insert(
                "responseMimeType".to_string(),
                serde_json::json!("application/json"),
            );
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }

        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": Value::Object(generation_config),
        })
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &CompleteOptions,
        response_schema: Option<&Value>,
    ) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = self.build_request(messages, options, response_schema);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(model = %self.model, %status, error = %body, "Gemini API error");
            bail!("Gemini API returned {}", status);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty());

        match text {
            Some(text) => Ok(text.trim().to_string()),
            None => {
                tracing::error!(model = %self.model, "Gemini returned no text content");
                bail!("No response text from Gemini")
            }
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompleteOptions,
    ) -> Result<String> {
        self.generate(messages, options, None).await
    }

    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &Value,
    ) -> Result<String> {
        self.generate(messages, &CompleteOptions::default(), Some(schema))
            .await
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, transcript: &[String]) -> Result<String> {
        let conversation = transcript.join("\n\n");
        let prompt = format!(
            "You are a helpful assistant that creates concise summaries of conversations. \
             Summarize the key points and outcomes in 2-3 sentences.\n\n\
             Please summarize this conversation:\n\n{conversation}"
        );

        self.generate(
            &[ChatMessage::user(prompt)],
            &CompleteOptions::default(),
            None,
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_messages_tags_roles() {
        let messages = vec![
            ChatMessage::system("Be terse."),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi"),
        ];

        let prompt = GeminiClient::flatten_messages(&messages);
        assert_eq!(prompt, "System: Be terse.\n\nUser: hello\n\nAssistant: hi");
    }

    #[test]
    fn test_build_request_plain() {
        let client = GeminiClient::new(Some("key".to_string()));
        let payload = client.build_request(
            &[ChatMessage::user("hello")],
            &CompleteOptions::default(),
            None,
        );

        assert_eq!(payload["contents"][0]["parts"][0]["text"], "User: hello");
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 2000);
        assert!(payload["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_build_request_json_mode() {
        let client = GeminiClient::new(Some("key".to_string()));
        let schema = serde_json::json!({"type": "object"});
        let payload = client.build_request(
            &[ChatMessage::user("extract")],
            &CompleteOptions::default(),
            Some(&schema),
        );

        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(payload["generationConfig"]["responseSchema"], schema);
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client = GeminiClient::new(None);
        let err = client
            .complete(&[ChatMessage::user("hello")], &CompleteOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not initialized"));
    }
}
