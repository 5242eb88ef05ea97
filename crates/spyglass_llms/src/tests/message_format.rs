use crate::extractors::format::{format_ai_message, format_messages, to_json};
use crate::types::{AiMessage, BaseMessage, ContentBlock, ContentPart, ToolCallRequest};
use serde_json::{Map, json};

#[test]
fn test_roles_and_plain_content() {
    let formatted = format_messages(&[
        BaseMessage::system("You are terse."),
        BaseMessage::human("What is 2+2?"),
        BaseMessage::ai("4"),
        BaseMessage::tool("call_9", "{\"ok\":true}"),
    ]);

    let roles: Vec<_> = formatted.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);
    assert_eq!(formatted[1].content, "What is 2+2?");
    assert_eq!(formatted[3].tool_call_id.as_deref(), Some("call_9"));
    assert!(formatted[0].tool_call_id.is_none());
}

#[test]
fn test_list_content_is_joined_with_single_space() {
    let message = BaseMessage::human(vec![
        ContentPart::Block(ContentBlock::text("first")),
        ContentPart::Raw("second".to_string()),
    ]);

    let formatted = format_messages(&[message]);
    assert_eq!(formatted[0].content, "first second");
}

#[test]
fn test_tool_call_arguments_are_json_strings() {
    let mut args = Map::new();
    args.insert("city".to_string(), json!("Paris"));

    let message = AiMessage::new("").with_tool_calls(vec![
        ToolCallRequest::new("call_1", "get_weather", args),
        ToolCallRequest::new("call_2", "list_files", Map::new()),
    ]);

    let formatted = format_ai_message(&message);
    assert_eq!(formatted.tool_calls.len(), 2);
    assert_eq!(formatted.tool_calls[0].kind, "function");
    assert_eq!(formatted.tool_calls[0].function.arguments, "{\"city\":\"Paris\"}");
    assert_eq!(formatted.tool_calls[1].function.arguments, "");
}

#[test]
fn test_json_shape() {
    let json = to_json(&format_messages(&[BaseMessage::human("hi")])).unwrap();
    assert_eq!(json, r#"[{"role":"user","content":"hi"}]"#);
}
