//! Message formatting for `gen_ai.input.messages` / `gen_ai.output.messages`.

use serde::Serialize;

use crate::types::{AiMessage, BaseMessage, MessageContent, ToolCallRequest};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedFunction {
    pub name: String,
    /// JSON-encoded arguments; empty when the call has none
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FormattedFunction,
}

/// A message in the shape recorded on spans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<FormattedToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

pub fn format_messages(messages: &[BaseMessage]) -> Vec<FormattedMessage> {
    messages
        .iter()
        .map(|message| {
            format(
                message.role(),
                message.content(),
                message.tool_calls(),
                message.tool_call_id(),
            )
        })
        .collect()
}

pub fn format_ai_message(message: &AiMessage) -> FormattedMessage {
    format("assistant", &message.content, &message.tool_calls, None)
}

/// Serialize formatted messages for a span attribute.
pub fn to_json(messages: &[FormattedMessage]) -> Option<String> {
    serde_json::to_string(messages).ok()
}

fn format(
    role: &'static str,
    content: &MessageContent,
    tool_calls: &[ToolCallRequest],
    tool_call_id: Option<&str>,
) -> FormattedMessage {
    FormattedMessage {
        role,
        content: content.to_text(),
        tool_calls: tool_calls.iter().map(format_tool_call).collect(),
        tool_call_id: tool_call_id.map(str::to_string),
    }
}

fn format_tool_call(call: &ToolCallRequest) -> FormattedToolCall {
    let arguments = if call.args.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&call.args).unwrap_or_default()
    };

    FormattedToolCall {
        id: call.id.clone(),
        kind: "function",
        function: FormattedFunction {
            name: call.name.clone(),
            arguments,
        },
    }
}
