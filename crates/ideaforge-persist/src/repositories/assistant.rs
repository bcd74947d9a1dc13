use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::Assistant;

#[derive(Clone)]
pub struct AssistantRepository {
    collection: Collection<Assistant>,
}

impl AssistantRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("assistants");
        Self { collection }
    }

    /// Look up an assistant for a new generation. Inactive assistants are
    /// invisible here; threads referencing them stay readable elsewhere.
    pub async fn find_active(&self, assistant_id: ObjectId) -> Result<Option<Assistant>> {
        let filter = doc! { "_id": assistant_id, "is_active": true };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_by_id(&self, assistant_id: ObjectId) -> Result<Option<Assistant>> {
        let filter = doc! { "_id": assistant_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn list_active(&self) -> Result<Vec<Assistant>> {
        let filter = doc! { "is_active": true };
        let assistants = self
            .collection
            .find(filter)
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(assistants)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn insert_many(&self, assistants: Vec<Assistant>) -> Result<()> {
        if assistants.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(assistants).await?;
        Ok(())
    }
}
