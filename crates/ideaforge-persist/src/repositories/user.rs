use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }

    pub async fn find_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        let filter = doc! { "_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let filter = doc! { "email": email };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Find the anonymous user for a device fingerprint, if one exists.
    pub async fn find_anonymous_by_device(
        &self,
        device_id: &str,
        platform: &str,
    ) -> Result<Option<User>> {
        let filter = doc! {
            "device_id": device_id,
            "platform": platform,
            "is_anonymous": true,
        };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn create_anonymous(&self, device_id: &str, platform: &str) -> Result<User> {
        let user = User {
            id: ObjectId::new(),
            name: None,
            email: None,
            password_hash: None,
            is_anonymous: true,
            device_id: Some(device_id.to_string()),
            platform: Some(platform.to_string()),
            authenticated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    pub async fn create_registered(
        &self,
        name: Option<String>,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let user = User {
            id: ObjectId::new(),
            name,
            email: Some(email.to_string()),
            password_hash: Some(password_hash.to_string()),
            is_anonymous: false,
            device_id: None,
            platform: None,
            authenticated_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    /// Promote an anonymous user to an authenticated one in place.
    ///
    /// The row keeps its id, so every thread the anonymous user owned stays
    /// owned by the authenticated account.
    pub async fn convert_to_authenticated(
        &self,
        user_id: ObjectId,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<Option<User>> {
        let filter = doc! { "_id": user_id };
        let update = doc! {
            "$set": {
                "email": email,
                "password_hash": password_hash,
                "name": name,
                "is_anonymous": false,
                "authenticated_at": bson::to_bson(&Utc::now())?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };

        self.collection.update_one(filter, update).await?;
        self.find_by_id(user_id).await
    }
}
