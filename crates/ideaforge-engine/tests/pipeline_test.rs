//! The generation pipeline from raw model text to addressable cards:
//! normalize, stamp, then look up. Every generation runs this path before
//! it is persisted.

use ideaforge_engine::cards::assign_card_ids;
use ideaforge_engine::normalize::parse_structured;
use ideaforge_persist::{GeneratedContent, OutputShape};
use std::collections::HashSet;

fn run_pipeline(raw: &str, shape: OutputShape) -> GeneratedContent {
    let structured = parse_structured(raw, shape);
    let stamped = assign_card_ids(structured);
    serde_json::from_value(stamped).expect("stamped content is object-shaped")
}

#[test]
fn test_well_formed_array_yields_addressable_cards() {
    let raw = r#"```json
[
  {"title": "Mobile grooming", "description": "Van-based pet care.", "score": 8.2},
  {"title": "Subscription box", "description": "Monthly treats."},
  {"title": "Training videos", "description": "Online courses."},
  {"title": "Walking service", "description": "Neighborhood routes."},
  {"title": "Pet photography", "description": "At-home shoots."},
  {"title": "Organic treats", "description": "Local bakery."}
]
```"#;

    let content = run_pipeline(raw, OutputShape::Array);
    let results = content.results();
    assert_eq!(results.len(), 6);

    let mut seen = HashSet::new();
    for card in &results {
        let id = card.id().expect("every card has an id");
        assert!(!id.is_empty());
        assert!(seen.insert(id.to_string()), "duplicate card id");

        let score = card.score().expect("every card has a score");
        assert!((7.0..=9.5).contains(&score));
    }

    // Model-supplied score survives stamping.
    assert_eq!(results[0].score(), Some(8.2));

    // Stamped ids address the cards they were stamped onto.
    for card in &results {
        assert_eq!(content.find_card(card.id().unwrap()), Some(card));
    }
}

#[test]
fn test_refusal_text_degrades_to_single_fallback_card() {
    let raw = "Sorry, I can't help with that.";
    let content = run_pipeline(raw, OutputShape::Array);

    let results = content.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].body(), Some(raw));
    assert_eq!(results[0].score(), Some(7.5));
    assert!(results[0].id().is_some());
}

#[test]
fn test_object_shaped_generation_is_a_single_card() {
    let raw = r#"{"analysis": "Strong niche", "recommendations": ["start small"], "risks": []}"#;
    let content = run_pipeline(raw, OutputShape::Object);

    assert!(!content.is_array());
    let results = content.results();
    assert_eq!(results.len(), 1);
    let id = results[0].id().unwrap();
    assert!(content.find_card(id).is_some());
}

#[test]
fn test_prose_wrapped_array_still_parses() {
    let raw = "Here you go!\n[{\"title\": \"A\"}, {\"title\": \"B\"}]\nEnjoy.";
    let content = run_pipeline(raw, OutputShape::Array);
    assert_eq!(content.results().len(), 2);
}
