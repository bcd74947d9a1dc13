use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A named, configured generation behavior: prompt templates plus defaults
/// plus the refinement aspects it exposes.
///
/// Inactive assistants are never selectable for new generations, but threads
/// that reference them stay retrievable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub category: AssistantCategory,
    pub description: String,
    /// Plain conversational system prompt, used for thread-level chat.
    pub system_prompt: String,
    pub is_active: bool,
    pub app_type: String,
    pub prompt_config: PromptConfig,
    pub output_format: OutputFormat,
    pub app_settings: AppSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantCategory {
    Idea,
    Strategy,
}

/// Template bundle driving a generation. The system/user templates are the
/// product's core configuration; an empty one is a data integrity bug, not a
/// runtime condition to default around.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub system_template: String,
    #[serde(default)]
    pub user_template: String,
    #[serde(default)]
    pub refinement_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub parameter_inference_prompt: Option<String>,
}

/// Declared output shape. Only consulted when the model's answer fails to
/// parse, to decide how the fallback wrapper looks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "type", default)]
    pub shape: OutputShape,
    /// Free-form field descriptions shown to admins; never enforced.
    #[serde(default)]
    pub structure: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    #[default]
    Array,
    Object,
}

/// Default generation parameters and the refinement aspects this assistant
/// exposes to clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub default_count: Option<u32>,
    #[serde(default)]
    pub default_industry: Option<String>,
    #[serde(default)]
    pub default_complexity: Option<String>,
    #[serde(default)]
    pub default_format: Option<String>,
    #[serde(default)]
    pub default_options: Map<String, Value>,
    #[serde(default)]
    pub refinement_options: Vec<String>,
}
