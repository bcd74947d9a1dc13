use ideaforge_persist::PersistError;
use thiserror::Error;

/// Engine failure taxonomy. Not-found never distinguishes "does not exist"
/// from "exists but belongs to someone else"; gateway errors carry their
/// cause for logs but surface a fixed message, prompt contents never leak.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("AI generation failed")]
    Gateway(#[source] anyhow::Error),

    #[error("Device identity error: {0}")]
    DeviceIdentity(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
