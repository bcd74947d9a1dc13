use ideaforge_persist::{Card, ThreadMetadata};
use std::fmt::Write;

/// Build the textual grounding block for card-scoped chat: the card's own
/// fields plus everything that has happened to it in this thread.
pub fn build_card_context(card: &Card, metadata: &ThreadMetadata) -> String {
    let mut context = String::from("Card Details:\n");
    let _ = writeln!(context, "Title: {}", card.title().unwrap_or("Untitled"));
    let _ = writeln!(
        context,
        "Description: {}",
        card.body().unwrap_or("No description")
    );
    match card.score() {
        Some(score) => {
            let _ = writeln!(context, "Score: {score}");
        }
        None => {
            let _ = writeln!(context, "Score: Not scored");
        }
    }

    let card_id = card.id().unwrap_or_default();

    let refinements: Vec<_> = metadata
        .refinement_history
        .iter()
        .filter(|r| r.card_id == card_id)
        .collect();
    if !refinements.is_empty() {
        context.push_str("\nRefinement History:\n");
        for (index, refinement) in refinements.iter().enumerate() {
            let summary = refinement
                .refined_content
                .get("content")
                .and_then(|v| v.as_str())
                .unwrap_or("No content");
            let _ = writeln!(context, "{}. {}: {}", index + 1, refinement.aspect, summary);
        }
    }

    let saved_count = metadata
        .user_actions
        .saved
        .iter()
        .filter(|s| s.idea_id == card_id)
        .count();
    let shared_count = metadata
        .user_actions
        .shared
        .iter()
        .filter(|s| s.idea_id == card_id)
        .count();

    if saved_count > 0 {
        let _ = writeln!(context, "\nUser has saved this idea {saved_count} time(s).");
    }
    if shared_count > 0 {
        let _ = writeln!(context, "\nUser has shared this idea {shared_count} time(s).");
    }

    context
}
