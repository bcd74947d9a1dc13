use ideaforge_llm::{ChatMessage, ChatRole, CompleteOptions};

#[test]
fn test_message_constructors() {
    let system = ChatMessage::system("instructions");
    let user = ChatMessage::user("question");
    let assistant = ChatMessage::assistant("answer");

    assert_eq!(system.role, ChatRole::System);
    assert_eq!(user.role, ChatRole::User);
    assert_eq!(assistant.role, ChatRole::Assistant);
    assert_eq!(user.content, "question");
}

#[test]
fn test_role_serialization_is_lowercase() {
    let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
    assert_eq!(json["role"], "user");

    let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
    assert_eq!(json["role"], "assistant");
}

#[test]
fn test_role_str() {
    assert_eq!(ChatMessage::system("x").role_str(), "system");
    assert_eq!(ChatMessage::user("x").role_str(), "user");
    assert_eq!(ChatMessage::assistant("x").role_str(), "assistant");
}

#[test]
fn test_complete_options_defaults() {
    let options = CompleteOptions::default();
    assert_eq!(options.temperature, Some(0.7));
    assert_eq!(options.max_output_tokens, Some(2000));
}

#[test]
fn test_complete_options_builder() {
    let options = CompleteOptions::new().temperature(0.1).max_output_tokens(512);
    assert_eq!(options.temperature, Some(0.1));
    assert_eq!(options.max_output_tokens, Some(512));
}
