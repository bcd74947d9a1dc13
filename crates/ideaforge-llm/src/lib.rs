pub mod types;
pub mod traits;
pub mod gemini;
pub mod openai;

pub use types::{ChatMessage, ChatRole};
pub use traits::{ChatClient, CompleteOptions, Summarizer};
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
