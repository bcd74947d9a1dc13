use rand::Rng;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Stamp every independent unit of generated content with a fresh unique id
/// and, where the model supplied no numeric score, a synthesized one.
///
/// Runs exactly once, at generation time; every later operation addresses
/// cards by the ids assigned here.
pub fn assign_card_ids(content: Value) -> Value {
    match content {
        // The normalizer usually parses for us, but a structured call can
        // still hand back a JSON string; parse it and recurse.
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => assign_card_ids(parsed),
            Err(_) => Value::Object(wrap_raw(Value::String(text))),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(stamp_element).collect()),
        Value::Object(map) => Value::Object(stamp(map)),
        other => other,
    }
}

fn stamp_element(item: Value) -> Value {
    match item {
        Value::Object(map) => Value::Object(stamp(map)),
        other => Value::Object(wrap_raw(other)),
    }
}

fn stamp(mut card: Map<String, Value>) -> Map<String, Value> {
    card.insert("id".to_string(), Value::from(new_card_id()));
    if !card.get("score").is_some_and(Value::is_number) {
        card.insert("score".to_string(), Value::from(synthesize_score()));
    }
    card
}

fn wrap_raw(content: Value) -> Map<String, Value> {
    let mut card = Map::new();
    card.insert("id".to_string(), Value::from(new_card_id()));
    card.insert("content".to_string(), content);
    card.insert("score".to_string(), Value::from(synthesize_score()));
    card
}

fn new_card_id() -> String {
    Uuid::new_v4().to_string()
}

/// Uniform in [7.0, 9.5], one decimal place.
fn synthesize_score() -> f64 {
    let raw: f64 = rand::thread_rng().gen_range(7.0..=9.5);
    (raw * 10.0).round() / 10.0
}
