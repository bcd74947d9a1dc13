pub mod cards;
pub mod context;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod params;
pub mod template;

pub use engine::{
    CardChatOutcome, CardChatRequest, ChatHistoryEntry, GenerateOutcome, GenerateRequest,
    GenerationEngine, RefineOutcome, RefineRequest, SaveOutcome, SaveRequest, ShareOutcome,
    ShareRequest, ThreadChatOutcome, ThreadView, TrendingIdea,
};
pub use error::{EngineError, Result};
pub use params::ParamSet;
