use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One generation session and its entire history, owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub assistant_id: ObjectId,
    pub title: String,
    /// Rolling conversation summary, refreshed as thread-level chat grows.
    pub summary: Option<String>,
    pub metadata: ThreadMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The thread's generation record. `generated_content` is written exactly
/// once, at creation, and never overwritten; the history and action vectors
/// only ever grow. The Option exists for pre-engine documents that carry no
/// generation, which later operations must reject rather than crash on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMetadata {
    pub app_type: String,
    pub user_input: String,
    pub resolved_params: Map<String, Value>,
    #[serde(default)]
    pub generated_content: Option<GeneratedContent>,
    pub refinement_history: Vec<RefinementEntry>,
    pub user_actions: UserActions,
    pub created_at: DateTime<Utc>,
}

impl ThreadMetadata {
    pub fn new(
        app_type: impl Into<String>,
        user_input: impl Into<String>,
        resolved_params: Map<String, Value>,
        generated_content: GeneratedContent,
    ) -> Self {
        Self {
            app_type: app_type.into(),
            user_input: user_input.into(),
            resolved_params,
            generated_content: Some(generated_content),
            refinement_history: Vec::new(),
            user_actions: UserActions::default(),
            created_at: Utc::now(),
        }
    }

    pub fn push_refinement(&mut self, entry: RefinementEntry) {
        self.refinement_history.push(entry);
    }

    pub fn push_saved(&mut self, action: SavedAction) {
        self.user_actions.saved.push(action);
    }

    pub fn push_shared(&mut self, action: SharedAction) {
        self.user_actions.shared.push(action);
    }
}

/// Generation output: a list of cards or one standalone document, preserved
/// in whichever shape the assistant produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Many(Vec<Card>),
    Single(Card),
}

impl GeneratedContent {
    /// Linear scan by engine-assigned card id.
    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        match self {
            Self::Many(cards) => cards.iter().find(|c| c.id() == Some(card_id)),
            Self::Single(card) => (card.id() == Some(card_id)).then_some(card),
        }
    }

    /// Positional lookup, only meaningful for array-shaped content.
    pub fn card_at_index(&self, index: usize) -> Option<&Card> {
        match self {
            Self::Many(cards) => cards.get(index),
            Self::Single(_) => None,
        }
    }

    /// Always-array view for responses; the stored shape is untouched.
    pub fn results(&self) -> Vec<Card> {
        match self {
            Self::Many(cards) => cards.clone(),
            Self::Single(card) => vec![card.clone()],
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// One generated card: model-determined fields kept verbatim, plus the
/// engine-assigned `id` and `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(pub Map<String, Value>);

impl Card {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(Value::as_f64)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Longest-form text the card carries: description, else raw content.
    pub fn body(&self) -> Option<&str> {
        self.0
            .get("description")
            .or_else(|| self.0.get("content"))
            .and_then(Value::as_str)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementEntry {
    pub card_id: String,
    pub aspect: String,
    pub refined_content: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActions {
    pub saved: Vec<SavedAction>,
    pub shared: Vec<SharedAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAction {
    pub idea_id: String,
    pub custom_title: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub content: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedAction {
    pub idea_id: String,
    pub share_id: String,
    pub share_link: String,
    pub shared_at: DateTime<Utc>,
    pub settings: Option<Value>,
    pub content: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(fields: Value) -> Card {
        match fields {
            Value::Object(map) => Card(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn sample_metadata() -> ThreadMetadata {
        ThreadMetadata::new(
            "idea-generator",
            "pet grooming",
            Map::new(),
            GeneratedContent::Many(vec![
                card(json!({"id": "a", "title": "Mobile grooming", "score": 8.1})),
                card(json!({"id": "b", "title": "Subscription box", "score": 7.4})),
            ]),
        )
    }

    #[test]
    fn test_find_card_in_array() {
        let metadata = sample_metadata();
        let content = metadata.generated_content.as_ref().unwrap();
        let found = content.find_card("b").unwrap();
        assert_eq!(found.title(), Some("Subscription box"));
        assert!(content.find_card("missing").is_none());
    }

    #[test]
    fn test_find_card_single_object() {
        let content = GeneratedContent::Single(card(json!({"id": "x", "analysis": "..."})));
        assert!(content.find_card("x").is_some());
        assert!(content.find_card("y").is_none());
        assert!(content.card_at_index(0).is_none());
    }

    #[test]
    fn test_results_always_array() {
        let single = GeneratedContent::Single(card(json!({"id": "x"})));
        assert_eq!(single.results().len(), 1);

        let metadata = sample_metadata();
        assert_eq!(metadata.generated_content.unwrap().results().len(), 2);
    }

    #[test]
    fn test_history_appends_preserve_order() {
        let mut metadata = sample_metadata();
        for aspect in ["business-model", "target-audience", "marketing-strategy"] {
            metadata.push_refinement(RefinementEntry {
                card_id: "a".to_string(),
                aspect: aspect.to_string(),
                refined_content: json!({"content": "insights"}),
                timestamp: Utc::now(),
            });
        }

        assert_eq!(metadata.refinement_history.len(), 3);
        assert_eq!(metadata.refinement_history[0].aspect, "business-model");
        assert_eq!(metadata.refinement_history[2].aspect, "marketing-strategy");
    }

    #[test]
    fn test_user_action_appends() {
        let mut metadata = sample_metadata();
        metadata.push_saved(SavedAction {
            idea_id: "a".to_string(),
            custom_title: None,
            saved_at: Utc::now(),
            content: json!({}),
        });
        metadata.push_shared(SharedAction {
            idea_id: "a".to_string(),
            share_id: "t-a-1".to_string(),
            share_link: "/shared/t-a-1".to_string(),
            shared_at: Utc::now(),
            settings: None,
            content: json!({}),
        });

        assert_eq!(metadata.user_actions.saved.len(), 1);
        assert_eq!(metadata.user_actions.shared.len(), 1);
    }

    #[test]
    fn test_generated_content_untagged_serde() {
        let many: GeneratedContent =
            serde_json::from_value(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert!(many.is_array());

        let single: GeneratedContent = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert!(!single.is_array());
    }
}
