mod assistant;
mod message;
mod thread;
mod user;

pub use assistant::{
    AppSettings, Assistant, AssistantCategory, OutputFormat, OutputShape, PromptConfig,
};
pub use message::{Message, MessageSender};
pub use thread::{
    Card, GeneratedContent, RefinementEntry, SavedAction, SharedAction, Thread, ThreadMetadata,
    UserActions,
};
pub use user::User;
