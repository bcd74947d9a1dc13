use ideaforge_llm::{ChatClient, ChatMessage};
use ideaforge_persist::Assistant;
use serde_json::{Map, Value};

/// Flat key/value generation configuration. Later merge sources fully
/// replace same-named keys; nothing here validates values against enums.
pub type ParamSet = Map<String, Value>;

const DEFAULT_COUNT: u32 = 6;
const DEFAULT_INDUSTRY: &str = "general";
const DEFAULT_COMPLEXITY: &str = "simple";
const DEFAULT_FORMAT: &str = "cards";

/// Merge the four parameter sources in fixed priority order:
/// assistant defaults < user context < message-inferred < explicit overrides.
///
/// Inference is best-effort: it runs only when the assistant declares an
/// inference prompt, and any failure degrades to an empty contribution
/// rather than aborting the generation.
pub async fn resolve(
    assistant: &Assistant,
    user_message: &str,
    overrides: Option<&Map<String, Value>>,
    gateway: &dyn ChatClient,
) -> ParamSet {
    let mut resolved = defaults(assistant);

    resolved.extend(user_context());

    match infer_from_message(assistant, user_message, gateway).await {
        Ok(inferred) => resolved.extend(inferred),
        Err(e) => {
            tracing::warn!(error = %e, "Parameter inference failed, continuing with defaults");
        }
    }

    if let Some(overrides) = overrides {
        resolved.extend(overrides.clone());
    }

    resolved
}

fn defaults(assistant: &Assistant) -> ParamSet {
    let settings = &assistant.app_settings;
    let mut params = Map::new();

    params.insert(
        "count".to_string(),
        Value::from(settings.default_count.unwrap_or(DEFAULT_COUNT)),
    );
    params.insert(
        "industry".to_string(),
        Value::from(
            settings
                .default_industry
                .clone()
                .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
        ),
    );
    params.insert(
        "complexity".to_string(),
        Value::from(
            settings
                .default_complexity
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPLEXITY.to_string()),
        ),
    );
    params.insert(
        "format".to_string(),
        Value::from(
            settings
                .default_format
                .clone()
                .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        ),
    );

    params.extend(settings.default_options.clone());
    params
}

/// Reserved extension point: past preferences, stored industry, etc.
fn user_context() -> ParamSet {
    Map::new()
}

async fn infer_from_message(
    assistant: &Assistant,
    user_message: &str,
    gateway: &dyn ChatClient,
) -> anyhow::Result<ParamSet> {
    let Some(inference_prompt) = &assistant.prompt_config.parameter_inference_prompt else {
        return Ok(Map::new());
    };

    let prompt = inference_prompt.replace("{{message}}", user_message);
    let schema = inference_schema();

    let raw = gateway
        .complete_structured(&[ChatMessage::user(prompt)], &schema)
        .await?;

    let value: Value = serde_json::from_str(raw.trim())?;
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected JSON object from parameter inference, got {other}"),
    }
}

fn inference_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "industry": { "type": "string" },
            "count": { "type": "number" },
            "complexity": { "type": "string" },
            "tone": { "type": "string" },
            "target_audience": { "type": "string" },
            "urgency": { "type": "string" },
            "budget_range": { "type": "string" },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Utc;
    use ideaforge_llm::CompleteOptions;
    use ideaforge_persist::{
        AppSettings, AssistantCategory, OutputFormat, PromptConfig,
    };
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted gateway: pops canned responses, or fails when empty.
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedGateway {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: &CompleteOptions,
        ) -> Result<String> {
            let mut responses = self.responses.lock().unwrap();
            match responses.pop() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("no scripted response")),
            }
        }
    }

    fn assistant(settings: AppSettings, inference_prompt: Option<&str>) -> Assistant {
        Assistant {
            id: ObjectId::new(),
            name: "Test".to_string(),
            category: AssistantCategory::Idea,
            description: String::new(),
            system_prompt: String::new(),
            is_active: true,
            app_type: "idea-generator".to_string(),
            prompt_config: PromptConfig {
                system_template: "s".to_string(),
                user_template: "u".to_string(),
                refinement_templates: Default::default(),
                parameter_inference_prompt: inference_prompt.map(str::to_string),
            },
            output_format: OutputFormat::default(),
            app_settings: settings,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_override_wins_default_survives() {
        let assistant = assistant(
            AppSettings {
                default_count: Some(6),
                default_industry: Some("general".to_string()),
                ..Default::default()
            },
            None,
        );
        let gateway = ScriptedGateway::new(vec![]);
        let overrides = json!({"count": 3}).as_object().cloned().unwrap();

        let resolved = resolve(&assistant, "msg", Some(&overrides), &gateway).await;

        assert_eq!(resolved["count"], 3);
        assert_eq!(resolved["industry"], "general");
    }

    #[tokio::test]
    async fn test_inferred_params_override_defaults() {
        let assistant = assistant(
            AppSettings {
                default_industry: Some("general".to_string()),
                ..Default::default()
            },
            Some("Extract from {{message}}"),
        );
        let gateway = ScriptedGateway::new(vec![Ok(r#"{"industry": "food"}"#.to_string())]);

        let resolved = resolve(&assistant, "a recipe app", None, &gateway).await;

        assert_eq!(resolved["industry"], "food");
    }

    #[tokio::test]
    async fn test_overrides_beat_inferred() {
        let assistant = assistant(AppSettings::default(), Some("Extract from {{message}}"));
        let gateway = ScriptedGateway::new(vec![Ok(r#"{"industry": "food"}"#.to_string())]);
        let overrides = json!({"industry": "health"}).as_object().cloned().unwrap();

        let resolved = resolve(&assistant, "msg", Some(&overrides), &gateway).await;

        assert_eq!(resolved["industry"], "health");
    }

    #[tokio::test]
    async fn test_inference_failure_degrades_to_defaults() {
        let assistant = assistant(
            AppSettings {
                default_count: Some(4),
                ..Default::default()
            },
            Some("Extract from {{message}}"),
        );
        let gateway = ScriptedGateway::new(vec![Err("quota exceeded".to_string())]);

        let resolved = resolve(&assistant, "msg", None, &gateway).await;

        assert_eq!(resolved["count"], 4);
        assert_eq!(resolved["industry"], "general");
    }

    #[tokio::test]
    async fn test_no_inference_prompt_means_no_model_call() {
        let assistant = assistant(AppSettings::default(), None);
        // Gateway would fail if called; the resolver must not touch it.
        let gateway = ScriptedGateway::new(vec![]);

        let resolved = resolve(&assistant, "msg", None, &gateway).await;

        assert_eq!(resolved["count"], 6);
        assert_eq!(resolved["complexity"], "simple");
        assert_eq!(resolved["format"], "cards");
    }
}
