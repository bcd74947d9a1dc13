use crate::error::{EngineError, Result};
use crate::params::ParamSet;
use ideaforge_persist::{Card, PromptConfig};
use serde_json::Value;

/// Fixed content-safety suffix appended to every generation system prompt.
/// Baked into the engine, never overridable per assistant.
const BUSINESS_BOUNDARY: &str = "\n\nBUSINESS FOCUS BOUNDARY:\n\
- ONLY provide business, entrepreneurship, startup, or commercial-related responses\n\
- If asked about non-business topics (personal advice, entertainment, general knowledge, etc.), \
politely redirect to business context\n\
- Example: \"I focus on business solutions. Let me help you with business-related aspects of \
your question instead.\"\n\
- Stay within: business strategy, marketing, finance, operations, management, entrepreneurship, \
startups, commerce\n";

const REFINEMENT_BOUNDARY: &str = "\n\nBUSINESS FOCUS BOUNDARY:\n\
- ONLY provide business, entrepreneurship, startup, or commercial-related insights\n\
- Focus on: business strategy, marketing, finance, operations, management, entrepreneurship, \
startups, commerce\n\
- If the content is not business-related, redirect to business applications or implications\n";

#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Render the generation prompt pair from an assistant's templates.
///
/// Substitution is best-effort: known placeholders get their resolved value,
/// anything still unresolved afterwards becomes the empty string. The
/// templates themselves are mandatory; an assistant without them is broken
/// seed data and the request fails.
pub fn build_generation_prompt(
    config: &PromptConfig,
    user_input: &str,
    params: &ParamSet,
) -> Result<RenderedPrompt> {
    if config.system_template.trim().is_empty() || config.user_template.trim().is_empty() {
        return Err(EngineError::Configuration(
            "Missing required prompt templates in assistant configuration".to_string(),
        ));
    }

    let mut system_prompt = substitute_params(&config.system_template, params);
    system_prompt = blank_unresolved(&system_prompt);
    system_prompt.push_str(BUSINESS_BOUNDARY);

    let mut user_prompt = config.user_template.replace("{{input}}", user_input);
    user_prompt = substitute_params(&user_prompt, params);
    user_prompt = blank_unresolved(&user_prompt);

    Ok(RenderedPrompt {
        system_prompt,
        user_prompt,
    })
}

/// Render the aspect-specific refinement prompt pair for one card.
///
/// The aspect must be declared by the assistant; an unknown aspect is a
/// configuration error, never silently skipped.
pub fn build_refinement_prompt(
    card: &Card,
    aspect: &str,
    config: &PromptConfig,
) -> Result<RenderedPrompt> {
    let template = config.refinement_templates.get(aspect).ok_or_else(|| {
        EngineError::Configuration(format!(
            "Missing refinement template for aspect '{aspect}' in assistant configuration"
        ))
    })?;

    let mut system_prompt = template.clone();
    system_prompt.push_str(REFINEMENT_BOUNDARY);

    let title = card.title().unwrap_or("Untitled");
    let body = card.body().unwrap_or("");
    let user_prompt = format!(
        "Provide 3-4 SHORT, actionable business insights about {aspect} for:\n\n\
         \"{title}\"\n{body}\n\n\
         Format:\n\
         - Key insight 1 (1 sentence)\n\
         - Key insight 2 (1 sentence)\n\
         - Key insight 3 (1 sentence)\n\
         - Key insight 4 (1 sentence)"
    );

    Ok(RenderedPrompt {
        system_prompt,
        user_prompt,
    })
}

/// System prompt for card-scoped chat, grounded on the card context block.
pub fn card_chat_system_prompt(card_context: &str) -> String {
    format!(
        "You are a concise, helpful business advisor.\n\n\
         Context about the specific idea:\n{card_context}\n\
         {BUSINESS_BOUNDARY}\n\
         Write responses that:\n\
         - Start with a direct 1-2 sentence answer tailored to the user's message and this idea.\n\
         - Keep the whole reply under ~120 words unless the user explicitly asks for more.\n\
         - Choose formatting based on intent (do not always use bullets): paragraphs for \
         explanations, bullet lists only when enumerating options, numbered steps only for clear \
         \"how to\" requests, a simple Markdown table only when asked to compare.\n\
         - Be specific, actionable, and reference the idea details when helpful.\n\
         - Avoid fluff, headings, or repeating the question.\n\
         - If key info is missing, end with one brief clarifying question on a new line prefixed \
         with \"Quick check:\""
    )
}

fn substitute_params(template: &str, params: &ParamSet) -> String {
    let mut rendered = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{{{{{key}}}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, &placeholder_value(value));
        }
    }
    rendered
}

fn placeholder_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replace any `{{key}}` that survived substitution with the empty string.
fn blank_unresolved(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("}}") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::collections::BTreeMap;

    fn params(pairs: Value) -> ParamSet {
        pairs.as_object().cloned().unwrap()
    }

    fn config(system: &str, user: &str) -> PromptConfig {
        PromptConfig {
            system_template: system.to_string(),
            user_template: user.to_string(),
            refinement_templates: BTreeMap::new(),
            parameter_inference_prompt: None,
        }
    }

    #[test]
    fn test_substitutes_known_placeholders() {
        let config = config(
            "Generate {{count}} ideas for {{industry}}.",
            "Interest: {{input}}",
        );
        let rendered = build_generation_prompt(
            &config,
            "pet grooming",
            &params(json!({"count": 6, "industry": "services"})),
        )
        .unwrap();

        assert!(rendered.system_prompt.starts_with("Generate 6 ideas for services."));
        assert_eq!(rendered.user_prompt, "Interest: pet grooming");
    }

    #[test]
    fn test_unresolved_placeholders_become_empty() {
        let config = config("Tone: {{tone}}.", "Go: {{input}} {{mystery}}");
        let rendered = build_generation_prompt(&config, "x", &params(json!({}))).unwrap();

        assert!(rendered.system_prompt.starts_with("Tone: ."));
        assert_eq!(rendered.user_prompt, "Go: x ");
    }

    #[test]
    fn test_boundary_suffix_always_appended() {
        let config = config("System.", "User {{input}}.");
        let rendered = build_generation_prompt(&config, "x", &params(json!({}))).unwrap();

        assert!(rendered.system_prompt.contains("BUSINESS FOCUS BOUNDARY"));
        assert!(!rendered.user_prompt.contains("BUSINESS FOCUS BOUNDARY"));
    }

    #[test]
    fn test_missing_template_is_configuration_error() {
        let config = config("", "User {{input}}.");
        let err = build_generation_prompt(&config, "x", &params(json!({}))).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_repeated_placeholder_replaced_everywhere() {
        let config = config("{{count}} then {{count}} again", "{{input}}");
        let rendered = build_generation_prompt(&config, "x", &params(json!({"count": 3}))).unwrap();
        assert!(rendered.system_prompt.starts_with("3 then 3 again"));
    }

    #[test]
    fn test_refinement_prompt_for_declared_aspect() {
        let mut templates = BTreeMap::new();
        templates.insert("business-model".to_string(), "Analyze the model.".to_string());
        let config = PromptConfig {
            system_template: "s".to_string(),
            user_template: "u".to_string(),
            refinement_templates: templates,
            parameter_inference_prompt: None,
        };
        let card = Card(
            json!({"id": "a", "title": "Dog spa", "description": "Mobile grooming van."})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let rendered = build_refinement_prompt(&card, "business-model", &config).unwrap();
        assert!(rendered.system_prompt.starts_with("Analyze the model."));
        assert!(rendered.system_prompt.contains("BUSINESS FOCUS BOUNDARY"));
        assert!(rendered.user_prompt.contains("\"Dog spa\""));
        assert!(rendered.user_prompt.contains("Mobile grooming van."));
    }

    #[test]
    fn test_unknown_aspect_is_configuration_error() {
        let config = config("s", "u");
        let card = Card(Map::new());
        let err = build_refinement_prompt(&card, "business-model", &config).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_card_without_title_falls_back_to_untitled() {
        let mut templates = BTreeMap::new();
        templates.insert("growth-strategy".to_string(), "t".to_string());
        let config = PromptConfig {
            system_template: "s".to_string(),
            user_template: "u".to_string(),
            refinement_templates: templates,
            parameter_inference_prompt: None,
        };
        let card = Card(json!({"id": "a", "content": "raw text"}).as_object().cloned().unwrap());

        let rendered = build_refinement_prompt(&card, "growth-strategy", &config).unwrap();
        assert!(rendered.user_prompt.contains("\"Untitled\""));
        assert!(rendered.user_prompt.contains("raw text"));
    }

    #[test]
    fn test_chat_system_prompt_embeds_context() {
        let prompt = card_chat_system_prompt("Card Details:\nTitle: Dog spa\n");
        assert!(prompt.contains("Title: Dog spa"));
        assert!(prompt.contains("BUSINESS FOCUS BOUNDARY"));
        assert!(prompt.contains("Quick check:"));
    }
}
