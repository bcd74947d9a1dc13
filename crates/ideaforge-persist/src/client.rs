use mongodb::Client;

use crate::error::{PersistError, Result};
use crate::repositories::{
    AssistantRepository, MessageRepository, ThreadRepository, UserRepository,
};

pub struct PersistClient {
    user_repo: UserRepository,
    assistant_repo: AssistantRepository,
    thread_repo: ThreadRepository,
    message_repo: MessageRepository,
}

impl PersistClient {
    pub async fn connect(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            user_repo: UserRepository::new(&client, db_name),
            assistant_repo: AssistantRepository::new(&client, db_name),
            thread_repo: ThreadRepository::new(&client, db_name),
            message_repo: MessageRepository::new(&client, db_name),
        })
    }

    pub fn users(&self) -> &UserRepository {
        &self.user_repo
    }

    pub fn assistants(&self) -> &AssistantRepository {
        &self.assistant_repo
    }

    pub fn threads(&self) -> &ThreadRepository {
        &self.thread_repo
    }

    pub fn messages(&self) -> &MessageRepository {
        &self.message_repo
    }
}
