pub mod models;
pub mod repositories;
pub mod client;
pub mod error;
pub mod seed;

pub use models::{
    Assistant, AssistantCategory, AppSettings, Card, GeneratedContent, Message, MessageSender,
    OutputFormat, OutputShape, PromptConfig, RefinementEntry, SavedAction, SharedAction, Thread,
    ThreadMetadata, User, UserActions,
};
pub use repositories::{
    AssistantRepository, MessageRepository, ThreadRepository, UserRepository,
};
pub use client::PersistClient;
pub use error::PersistError;
pub use seed::seed_assistants;
