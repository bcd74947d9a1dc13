use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use ideaforge_llm::{ChatClient, ChatMessage, CompleteOptions, Summarizer};
use ideaforge_persist::{
    AssistantRepository, Card, GeneratedContent, Message, MessageRepository, MessageSender,
    OutputShape, RefinementEntry, SavedAction, SharedAction, Thread, ThreadMetadata,
    ThreadRepository, UserActions,
};

use crate::cards::assign_card_ids;
use crate::context::build_card_context;
use crate::error::{EngineError, Result};
use crate::normalize::parse_structured;
use crate::params;
use crate::template;

const TITLE_MAX_LEN: usize = 100;
const TRENDING_LIMIT: i64 = 10;

// Thread-level chat summaries refresh on every 5th message once a
// conversation reaches 10.
const SUMMARY_MIN_MESSAGES: u64 = 10;
const SUMMARY_INTERVAL: u64 = 5;

/// The generation/refinement orchestration engine.
///
/// Every operation takes the caller's already-resolved user id; identity
/// resolution happens once at the transport boundary, never in here.
pub struct GenerationEngine {
    assistants: AssistantRepository,
    threads: ThreadRepository,
    messages: MessageRepository,
    /// Provider for generation, refinement and card chat.
    gateway: Arc<dyn ChatClient>,
    /// Provider for thread-level conversational chat.
    chat_gateway: Arc<dyn ChatClient>,
    summarizer: Arc<dyn Summarizer>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub app_id: String,
    pub message: String,
    #[serde(default)]
    pub overrides: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOutcome {
    pub thread_id: String,
    pub app_type: String,
    pub results: Vec<Card>,
    pub refinement_options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub card_id: String,
    pub aspect: String,
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct RefineOutcome {
    pub thread_id: String,
    pub aspect: String,
    pub refined_content: Value,
    pub original_content: Value,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub idea_id: String,
    #[serde(default)]
    pub custom_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveOutcome {
    pub message: String,
    pub saved_idea: SavedIdeaView,
}

#[derive(Debug, Serialize)]
pub struct SavedIdeaView {
    pub id: String,
    pub title: Option<String>,
    pub content: Value,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub idea_id: String,
    #[serde(default)]
    pub share_settings: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ShareOutcome {
    pub message: String,
    pub share_id: String,
    pub share_link: String,
    pub shared_idea: Value,
}

#[derive(Debug, Deserialize)]
pub struct CardChatRequest {
    pub card_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CardChatOutcome {
    pub thread_id: String,
    pub card_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ThreadChatOutcome {
    pub thread_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ThreadView {
    pub id: String,
    pub title: String,
    pub app_type: String,
    pub summary: Option<String>,
    pub metadata: ThreadMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryEntry {
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TrendingIdea {
    pub id: String,
    pub title: String,
    pub app_type: String,
    pub generated_content: Option<GeneratedContent>,
    pub user_actions: UserActions,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

impl GenerationEngine {
    pub fn new(
        assistants: AssistantRepository,
        threads: ThreadRepository,
        messages: MessageRepository,
        gateway: Arc<dyn ChatClient>,
        chat_gateway: Arc<dyn ChatClient>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            assistants,
            threads,
            messages,
            gateway,
            chat_gateway,
            summarizer,
        }
    }

    /// Generate content for a user message and persist it as a new thread.
    pub async fn generate_content(
        &self,
        user_id: ObjectId,
        request: GenerateRequest,
    ) -> Result<GenerateOutcome> {
        let assistant_id = ObjectId::parse_str(&request.app_id)
            .map_err(|_| EngineError::NotFound(format!("No assistant found for: {}", request.app_id)))?;
        let assistant = self
            .assistants
            .find_active(assistant_id)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!("No assistant found for: {}", request.app_id))
            })?;

        let resolved_params = params::resolve(
            &assistant,
            &request.message,
            request.overrides.as_ref(),
            self.gateway.as_ref(),
        )
        .await;

        let prompt = template::build_generation_prompt(
            &assistant.prompt_config,
            &request.message,
            &resolved_params,
        )?;

        let raw = self
            .gateway
            .complete(
                &[
                    ChatMessage::system(prompt.system_prompt),
                    ChatMessage::user(prompt.user_prompt),
                ],
                &CompleteOptions::default(),
            )
            .await
            .map_err(|e| {
                tracing::error!(app_type = %assistant.app_type, error = %e, "Content generation failed");
                EngineError::Gateway(e)
            })?;

        let structured = parse_structured(&raw, assistant.output_format.shape);
        let stamped = assign_card_ids(structured);
        let generated: GeneratedContent = serde_json::from_value(stamped)
            .map_err(|e| EngineError::Gateway(anyhow::anyhow!("unusable generation result: {e}")))?;

        let results = generated.results();
        let title = derive_title(&request.message, &assistant.app_type);
        let metadata = ThreadMetadata::new(
            assistant.app_type.clone(),
            request.message,
            resolved_params,
            generated,
        );

        let thread = self
            .threads
            .create_thread(user_id, assistant.id, title, metadata)
            .await?;

        Ok(GenerateOutcome {
            thread_id: thread.id.to_hex(),
            app_type: assistant.app_type,
            results,
            refinement_options: assistant.app_settings.refinement_options,
        })
    }

    /// Refine one card along a named aspect and record it in the thread's
    /// refinement history.
    pub async fn refine_content(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        request: RefineRequest,
    ) -> Result<RefineOutcome> {
        let mut thread = self.get_owned_thread(user_id, thread_id).await?;
        let assistant = self
            .assistants
            .find_by_id(thread.assistant_id)
            .await?
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Assistant {} referenced by thread no longer exists",
                    thread.assistant_id.to_hex()
                ))
            })?;

        let content = thread
            .metadata
            .generated_content
            .as_ref()
            .ok_or_else(|| EngineError::BadRequest("No content to refine".to_string()))?;
        let card = content
            .find_card(&request.card_id)
            .ok_or_else(|| {
                EngineError::NotFound(format!("Card with ID {} not found", request.card_id))
            })?
            .clone();

        let prompt =
            template::build_refinement_prompt(&card, &request.aspect, &assistant.prompt_config)?;

        let raw = self
            .gateway
            .complete(
                &[
                    ChatMessage::system(prompt.system_prompt),
                    ChatMessage::user(prompt.user_prompt),
                ],
                &CompleteOptions::default(),
            )
            .await
            .map_err(|e| {
                tracing::error!(aspect = %request.aspect, error = %e, "Content refinement failed");
                EngineError::Gateway(e)
            })?;

        let refined_content = parse_structured(&raw, OutputShape::Object);

        thread.metadata.push_refinement(RefinementEntry {
            card_id: request.card_id,
            aspect: request.aspect.clone(),
            refined_content: refined_content.clone(),
            timestamp: Utc::now(),
        });
        self.threads
            .update_metadata(thread.id, &thread.metadata)
            .await?;

        Ok(RefineOutcome {
            thread_id: thread.id.to_hex(),
            aspect: request.aspect,
            refined_content,
            original_content: card.as_value(),
        })
    }

    /// Record a save action against one idea.
    pub async fn save_idea(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        request: SaveRequest,
    ) -> Result<SaveOutcome> {
        let mut thread = self.get_owned_thread(user_id, thread_id).await?;
        let content = thread
            .metadata
            .generated_content
            .as_ref()
            .ok_or_else(|| EngineError::BadRequest("No content to save".to_string()))?;

        let idea = locate_idea(content, &request.idea_id)
            .ok_or_else(|| EngineError::NotFound("Idea not found".to_string()))?
            .clone();

        let title = request.custom_title.clone().or_else(|| idea.title().map(str::to_string));

        thread.metadata.push_saved(SavedAction {
            idea_id: request.idea_id.clone(),
            custom_title: request.custom_title,
            saved_at: Utc::now(),
            content: idea.as_value(),
        });
        self.threads
            .update_metadata(thread.id, &thread.metadata)
            .await?;

        Ok(SaveOutcome {
            message: "Idea saved successfully".to_string(),
            saved_idea: SavedIdeaView {
                id: request.idea_id,
                title,
                content: idea.as_value(),
            },
        })
    }

    /// Record a share action against one idea and mint its share link.
    pub async fn share_idea(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        request: ShareRequest,
    ) -> Result<ShareOutcome> {
        let mut thread = self.get_owned_thread(user_id, thread_id).await?;
        let content = thread
            .metadata
            .generated_content
            .as_ref()
            .ok_or_else(|| EngineError::BadRequest("No content to share".to_string()))?;

        let idea = locate_idea(content, &request.idea_id)
            .ok_or_else(|| EngineError::NotFound("Idea not found".to_string()))?
            .clone();

        // Collision-resistant via the timestamp, deliberately not unguessable:
        // share links are convenience, not a security boundary.
        let share_id = format!(
            "{}-{}-{}",
            thread.id.to_hex(),
            request.idea_id,
            Utc::now().timestamp_millis()
        );
        let share_link = format!("/shared/{share_id}");

        thread.metadata.push_shared(SharedAction {
            idea_id: request.idea_id,
            share_id: share_id.clone(),
            share_link: share_link.clone(),
            shared_at: Utc::now(),
            settings: request.share_settings,
            content: idea.as_value(),
        });
        self.threads
            .update_metadata(thread.id, &thread.metadata)
            .await?;

        Ok(ShareOutcome {
            message: "Idea shared successfully".to_string(),
            share_id,
            share_link,
            shared_idea: idea.as_value(),
        })
    }

    /// Card-scoped chat turn. The model is consulted first; the user and
    /// assistant messages are then persisted together, so a gateway failure
    /// leaves no half-written turn behind.
    pub async fn chat_with_card(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        request: CardChatRequest,
    ) -> Result<CardChatOutcome> {
        let thread = self.get_owned_thread(user_id, thread_id).await?;
        let content = thread
            .metadata
            .generated_content
            .as_ref()
            .ok_or_else(|| EngineError::BadRequest("No content found in thread".to_string()))?;
        let card = content.find_card(&request.card_id).ok_or_else(|| {
            EngineError::NotFound(format!("Card with ID {} not found", request.card_id))
        })?;

        let history = self
            .messages
            .get_card_messages(thread.id, &request.card_id)
            .await?;

        let card_context = build_card_context(card, &thread.metadata);
        let mut chat = vec![ChatMessage::system(template::card_chat_system_prompt(
            &card_context,
        ))];
        chat.extend(history.iter().map(to_chat_message));
        chat.push(ChatMessage::user(request.message.clone()));

        let ai_response = self
            .gateway
            .complete(&chat, &CompleteOptions::default())
            .await
            .map_err(|e| {
                tracing::error!(card_id = %request.card_id, error = %e, "Card chat failed");
                EngineError::Gateway(e)
            })?;

        let user_message = Message::new(
            thread.id,
            Some(request.card_id.clone()),
            MessageSender::User,
            request.message,
        );
        let assistant_message = Message::new(
            thread.id,
            Some(request.card_id.clone()),
            MessageSender::Assistant,
            ai_response,
        );
        let outcome = CardChatOutcome {
            thread_id: thread.id.to_hex(),
            card_id: request.card_id,
            user_message: user_message.content.clone(),
            ai_response: assistant_message.content.clone(),
            timestamp: assistant_message.created_at,
        };

        self.messages
            .save_pair(user_message, assistant_message)
            .await?;

        Ok(outcome)
    }

    /// Thread-level chat turn against the assistant's conversational prompt.
    pub async fn send_thread_message(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        content: String,
    ) -> Result<ThreadChatOutcome> {
        let thread = self.get_owned_thread(user_id, thread_id).await?;
        let assistant = self
            .assistants
            .find_by_id(thread.assistant_id)
            .await?
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Assistant {} referenced by thread no longer exists",
                    thread.assistant_id.to_hex()
                ))
            })?;

        let history = self.messages.get_thread_messages(thread.id).await?;

        let mut chat = vec![ChatMessage::system(assistant.system_prompt)];
        chat.extend(history.iter().map(to_chat_message));
        chat.push(ChatMessage::user(content.clone()));

        let ai_response = self
            .chat_gateway
            .complete(&chat, &CompleteOptions::default())
            .await
            .map_err(|e| {
                tracing::error!(thread_id = %thread.id, error = %e, "Thread chat failed");
                EngineError::Gateway(e)
            })?;

        let user_message = Message::new(thread.id, None, MessageSender::User, content);
        let assistant_message =
            Message::new(thread.id, None, MessageSender::Assistant, ai_response);
        let outcome = ThreadChatOutcome {
            thread_id: thread.id.to_hex(),
            user_message: user_message.content.clone(),
            ai_response: assistant_message.content.clone(),
            timestamp: assistant_message.created_at,
        };

        self.messages
            .save_pair(user_message, assistant_message)
            .await?;

        let total = self.messages.count_thread_messages(thread.id).await?;
        if total >= SUMMARY_MIN_MESSAGES && total % SUMMARY_INTERVAL == 0 {
            self.spawn_summary_refresh(thread.id);
        }

        Ok(outcome)
    }

    /// Ownership-checked read of one thread.
    pub async fn get_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<ThreadView> {
        let thread = self.get_owned_thread(user_id, thread_id).await?;

        Ok(ThreadView {
            id: thread.id.to_hex(),
            title: thread.title,
            app_type: thread.metadata.app_type.clone(),
            summary: thread.summary,
            metadata: thread.metadata,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        })
    }

    /// Ownership-checked chat history for one card, oldest first.
    pub async fn get_chat_history_by_card(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
        card_id: &str,
    ) -> Result<Vec<ChatHistoryEntry>> {
        let thread = self.get_owned_thread(user_id, thread_id).await?;
        let messages = self.messages.get_card_messages(thread.id, card_id).await?;

        Ok(messages
            .into_iter()
            .map(|m| ChatHistoryEntry {
                sender: m.sender,
                content: m.content,
                created_at: m.created_at,
            })
            .collect())
    }

    /// Ownership-checked thread-level chat history, oldest first.
    pub async fn get_thread_chat_history(
        &self,
        user_id: ObjectId,
        thread_id: ObjectId,
    ) -> Result<Vec<ChatHistoryEntry>> {
        let thread = self.get_owned_thread(user_id, thread_id).await?;
        let messages = self.messages.get_thread_messages(thread.id).await?;

        Ok(messages
            .into_iter()
            .map(|m| ChatHistoryEntry {
                sender: m.sender,
                content: m.content,
                created_at: m.created_at,
            })
            .collect())
    }

    /// Recently active generations ranked by engagement.
    pub async fn get_trending_ideas(&self, app_type: Option<&str>) -> Result<Vec<TrendingIdea>> {
        let threads = self.threads.list_recent(app_type, TRENDING_LIMIT).await?;

        Ok(threads
            .into_iter()
            .map(|thread| TrendingIdea {
                id: thread.id.to_hex(),
                title: thread.title,
                app_type: thread.metadata.app_type.clone(),
                score: trending_score(&thread.metadata),
                generated_content: thread.metadata.generated_content,
                user_actions: thread.metadata.user_actions,
                updated_at: thread.updated_at,
            })
            .collect())
    }

    async fn get_owned_thread(&self, user_id: ObjectId, thread_id: ObjectId) -> Result<Thread> {
        self.threads
            .get_owned(thread_id, user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Thread not found".to_string()))
    }

    fn spawn_summary_refresh(&self, thread_id: ObjectId) {
        let messages = self.messages.clone();
        let threads = self.threads.clone();
        let summarizer = Arc::clone(&self.summarizer);

        tokio::spawn(async move {
            if let Err(e) = refresh_summary(&messages, &threads, summarizer.as_ref(), thread_id).await
            {
                tracing::error!(thread_id = %thread_id, error = %e, "Failed to refresh thread summary");
            }
        });
    }
}

async fn refresh_summary(
    messages: &MessageRepository,
    threads: &ThreadRepository,
    summarizer: &dyn Summarizer,
    thread_id: ObjectId,
) -> anyhow::Result<()> {
    let history = messages.get_thread_messages(thread_id).await?;
    let transcript: Vec<String> = history
        .iter()
        .map(|m| {
            let sender = match m.sender {
                MessageSender::User => "user",
                MessageSender::Assistant => "assistant",
            };
            format!("{sender}: {}", m.content)
        })
        .collect();

    let summary = summarizer.summarize(&transcript).await?;
    threads.update_summary(thread_id, &summary).await?;
    Ok(())
}

fn to_chat_message(message: &Message) -> ChatMessage {
    match message.sender {
        MessageSender::User => ChatMessage::user(message.content.clone()),
        MessageSender::Assistant => ChatMessage::assistant(message.content.clone()),
    }
}

/// Locate an idea for save/share. Stable card ids are the primary scheme;
/// a stringified array index is honored as a compatibility shim for older
/// clients, and single-object content always resolves to its lone card.
fn locate_idea<'a>(content: &'a GeneratedContent, idea_id: &str) -> Option<&'a Card> {
    if let Some(card) = content.find_card(idea_id) {
        return Some(card);
    }

    match content {
        GeneratedContent::Many(_) => idea_id
            .parse::<usize>()
            .ok()
            .and_then(|index| content.card_at_index(index)),
        GeneratedContent::Single(card) => Some(card),
    }
}

fn derive_title(input: &str, app_type: &str) -> String {
    let title = match app_type {
        "idea-generator" => format!("Ideas for {input}"),
        "blog-writer" => format!("Blog about {input}"),
        _ => format!("Generated content for {input}"),
    };

    if title.chars().count() > TITLE_MAX_LEN {
        let mut truncated: String = title.chars().take(TITLE_MAX_LEN).collect();
        truncated.push_str("...");
        truncated
    } else {
        title
    }
}

fn trending_score(metadata: &ThreadMetadata) -> i64 {
    let saved = metadata.user_actions.saved.len() as i64;
    let shared = metadata.user_actions.shared.len() as i64;
    let refined = metadata.refinement_history.len() as i64;

    saved * 3 + shared * 5 + refined * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(fields: Value) -> Card {
        Card(fields.as_object().cloned().unwrap())
    }

    fn many() -> GeneratedContent {
        GeneratedContent::Many(vec![
            card(json!({"id": "aaa", "title": "First"})),
            card(json!({"id": "bbb", "title": "Second"})),
            card(json!({"id": "ccc", "title": "Third"})),
        ])
    }

    #[test]
    fn test_locate_idea_prefers_card_id() {
        let content = many();
        let found = locate_idea(&content, "bbb").unwrap();
        assert_eq!(found.title(), Some("Second"));
    }

    #[test]
    fn test_locate_idea_falls_back_to_index() {
        let content = many();
        let found = locate_idea(&content, "0").unwrap();
        assert_eq!(found.title(), Some("First"));
        assert!(locate_idea(&content, "7").is_none());
    }

    #[test]
    fn test_locate_idea_single_object_matches_any_id() {
        let content = GeneratedContent::Single(card(json!({"id": "x", "analysis": "y"})));
        assert!(locate_idea(&content, "whatever").is_some());
    }

    #[test]
    fn test_derive_title_by_app_type() {
        assert_eq!(
            derive_title("pet grooming", "idea-generator"),
            "Ideas for pet grooming"
        );
        assert_eq!(
            derive_title("coffee", "blog-writer"),
            "Blog about coffee"
        );
        assert_eq!(
            derive_title("x", "strategy-advisor"),
            "Generated content for x"
        );
    }

    #[test]
    fn test_derive_title_truncates_long_input() {
        let input = "a".repeat(200);
        let title = derive_title(&input, "idea-generator");

        assert_eq!(title.chars().count(), TITLE_MAX_LEN + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_trending_score_weights() {
        let mut metadata = ThreadMetadata::new("idea-generator", "x", Map::new(), many());
        metadata.push_saved(SavedAction {
            idea_id: "aaa".to_string(),
            custom_title: None,
            saved_at: Utc::now(),
            content: json!({}),
        });
        metadata.push_shared(SharedAction {
            idea_id: "aaa".to_string(),
            share_id: "s".to_string(),
            share_link: "/shared/s".to_string(),
            shared_at: Utc::now(),
            settings: None,
            content: json!({}),
        });
        metadata.push_refinement(RefinementEntry {
            card_id: "aaa".to_string(),
            aspect: "business-model".to_string(),
            refined_content: json!({}),
            timestamp: Utc::now(),
        });

        assert_eq!(trending_score(&metadata), 3 + 5 + 2);
    }

    #[test]
    fn test_trending_score_empty_metadata() {
        let metadata = ThreadMetadata::new("idea-generator", "x", Map::new(), many());
        assert_eq!(trending_score(&metadata), 0);
    }
}
