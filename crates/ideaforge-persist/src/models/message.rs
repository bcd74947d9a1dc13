use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One chat turn half. `card_id = None` is thread-level chat; `Some` scopes
/// the message to a single generated card. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub thread_id: ObjectId,
    pub card_id: Option<String>,
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Assistant,
}

impl Message {
    pub fn new(
        thread_id: ObjectId,
        card_id: Option<String>,
        sender: MessageSender,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            thread_id,
            card_id,
            sender,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
