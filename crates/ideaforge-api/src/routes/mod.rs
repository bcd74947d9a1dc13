pub mod assistants;
pub mod auth;
pub mod generate;
pub mod health;
pub mod threads;
pub mod trending;

use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;

pub(crate) fn parse_thread_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw)
        .map_err(|_| ApiError::BadRequest("Invalid thread ID format".to_string()))
}
