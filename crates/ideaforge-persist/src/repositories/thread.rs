use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::{Thread, ThreadMetadata};

#[derive(Clone)]
pub struct ThreadRepository {
    collection: Collection<Thread>,
}

impl ThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    /// Create a new thread holding a finished generation record.
    pub async fn create_thread(
        &self,
        user_id: ObjectId,
        assistant_id: ObjectId,
        title: String,
        metadata: ThreadMetadata,
    ) -> Result<Thread> {
        let thread = Thread {
            id: ObjectId::new(),
            user_id,
            assistant_id,
            title,
            summary: None,
            metadata,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    /// Ownership-scoped lookup. A thread owned by someone else is
    /// indistinguishable from one that does not exist.
    pub async fn get_owned(&self, thread_id: ObjectId, user_id: ObjectId) -> Result<Option<Thread>> {
        let filter = doc! { "_id": thread_id, "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Replace the metadata document wholesale (read-modify-write; concurrent
    /// writers race at document granularity, last write wins).
    pub async fn update_metadata(
        &self,
        thread_id: ObjectId,
        metadata: &ThreadMetadata,
    ) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        let update = doc! {
            "$set": {
                "metadata": bson::to_bson(metadata)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn update_summary(&self, thread_id: ObjectId, summary: &str) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        let update = doc! {
            "$set": {
                "summary": summary,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: ObjectId) -> Result<Vec<Thread>> {
        let filter = doc! { "user_id": user_id };
        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// Most recently active threads, optionally filtered by app type.
    pub async fn list_recent(&self, app_type: Option<&str>, limit: i64) -> Result<Vec<Thread>> {
        let mut filter = doc! {};
        if let Some(app_type) = app_type {
            filter.insert("metadata.app_type", app_type);
        }

        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }
}
