use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::Message;

#[derive(Clone)]
pub struct MessageRepository {
    collection: Collection<Message>,
}

impl MessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    /// Persist one chat turn: the user message and the assistant reply land
    /// in a single insert command, so a turn is written whole or not at all.
    pub async fn save_pair(&self, user_message: Message, assistant_message: Message) -> Result<()> {
        self.collection
            .insert_many(vec![user_message, assistant_message])
            .await?;
        Ok(())
    }

    /// Chat history for one card, oldest first.
    pub async fn get_card_messages(
        &self,
        thread_id: ObjectId,
        card_id: &str,
    ) -> Result<Vec<Message>> {
        let filter = doc! { "thread_id": thread_id, "card_id": card_id };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    /// Thread-level history (card-scoped messages excluded), oldest first.
    pub async fn get_thread_messages(&self, thread_id: ObjectId) -> Result<Vec<Message>> {
        let filter = doc! { "thread_id": thread_id, "card_id": null };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn count_thread_messages(&self, thread_id: ObjectId) -> Result<u64> {
        let filter = doc! { "thread_id": thread_id, "card_id": null };
        Ok(self.collection.count_documents(filter).await?)
    }
}
