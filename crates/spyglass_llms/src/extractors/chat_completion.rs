//! Attributes for OpenAI-style chat completion calls.

use spyglass_core::attributes::*;
use spyglass_core::{Attributes, CallInfo, Extractor};

use crate::error::ClientError;
use crate::types::{ChatCompletion, ChatCompletionRequest, ChatCompletionStream, Tool, ToolCall};

pub const DEFAULT_SYSTEM: &str = "openai";

/// Extractor for [`ChatCompletionRequest`] calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletionExtractor {
    system: String,
    capture_content: bool,
}

impl Default for ChatCompletionExtractor {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM.to_string(),
            capture_content: true,
        }
    }
}

impl ChatCompletionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override `gen_ai.system` for OpenAI-compatible providers.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Record message bodies on spans (on by default).
    pub fn with_content_capture(mut self, capture: bool) -> Self {
        self.capture_content = capture;
        self
    }

    fn request_attributes(&self, request: &ChatCompletionRequest) -> Attributes {
        let mut attrs = Attributes::new();
        attrs
            .insert(GEN_AI_OPERATION_NAME, "chat")
            .insert(GEN_AI_SYSTEM, self.system.clone())
            .insert(GEN_AI_REQUEST_MODEL, request.model.clone())
            .insert_opt(
                GEN_AI_REQUEST_MAX_TOKENS,
                request
                    .max_tokens
                    .or(request.max_completion_tokens)
                    .map(i64::from),
            )
            .insert_opt(GEN_AI_REQUEST_TEMPERATURE, request.temperature)
            .insert_opt(GEN_AI_REQUEST_TOP_P, request.top_p)
            .insert_opt(GEN_AI_REQUEST_STREAM, request.stream)
            .insert_count(GEN_AI_INPUT_MESSAGES_COUNT, request.messages.len());

        if !request.tools.is_empty() {
            attrs
                .insert_count(GEN_AI_REQUEST_TOOLS_COUNT, request.tools.len())
                .insert(GEN_AI_REQUEST_TOOLS_NAMES, tool_names(&request.tools));
        }

        if self.capture_content {
            attrs.insert_opt(
                GEN_AI_INPUT_MESSAGES,
                serde_json::to_string(&request.messages).ok(),
            );
        }

        attrs
    }
}

fn tool_names(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(|tool| tool.function.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn tool_call_names(calls: &[ToolCall]) -> String {
    calls
        .iter()
        .map(|call| call.function.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Error attributes shared by every client shape.
pub(crate) fn client_error_attributes(error: &ClientError) -> Attributes {
    let mut attrs = Attributes::new();
    attrs
        .insert(ERROR_TYPE, error.kind())
        .insert(ERROR_MESSAGE, error.to_string())
        .insert_opt(HTTP_RESPONSE_STATUS_CODE, error.status_code().map(i64::from));
    attrs
}

impl Extractor<ChatCompletionRequest, ChatCompletion, ClientError> for ChatCompletionExtractor {
    fn request(&self, _call: &CallInfo<'_>, input: &ChatCompletionRequest) -> Attributes {
        self.request_attributes(input)
    }

    fn success(&self, _call: &CallInfo<'_>, output: &ChatCompletion) -> Attributes {
        let mut attrs = Attributes::new();
        attrs
            .insert(GEN_AI_RESPONSE_ID, output.id.clone())
            .insert(GEN_AI_RESPONSE_MODEL, output.model.clone());

        if let Some(usage) = &output.usage {
            attrs
                .insert(GEN_AI_USAGE_INPUT_TOKENS, i64::from(usage.prompt_tokens))
                .insert(GEN_AI_USAGE_OUTPUT_TOKENS, i64::from(usage.completion_tokens))
                .insert(GEN_AI_USAGE_TOTAL_TOKENS, i64::from(usage.total_tokens));
        }

        let finish_reasons: Vec<&str> = output
            .choices
            .iter()
            .filter_map(|choice| choice.finish_reason.as_deref())
            .collect();
        if !finish_reasons.is_empty() {
            attrs.insert(GEN_AI_RESPONSE_FINISH_REASONS, finish_reasons.join(","));
        }

        if let Some(message) = output.first_message() {
            if let Some(content) = &message.content {
                attrs.insert_count(GEN_AI_RESPONSE_CONTENT_LENGTH, content.chars().count());
            }
            if !message.tool_calls.is_empty() {
                attrs
                    .insert_count(GEN_AI_RESPONSE_TOOLS_COUNT, message.tool_calls.len())
                    .insert(
                        GEN_AI_RESPONSE_TOOLS_NAMES,
                        tool_call_names(&message.tool_calls),
                    );
            }
        }

        if self.capture_content {
            let messages: Vec<_> = output.choices.iter().map(|choice| &choice.message).collect();
            attrs.insert_opt(GEN_AI_OUTPUT_MESSAGES, serde_json::to_string(&messages).ok());
        }

        attrs
    }

    fn error(&self, _call: &CallInfo<'_>, error: &ClientError) -> Attributes {
        client_error_attributes(error)
    }
}

/// Streamed calls record request attributes only; the span ends when the
/// stream handle is returned.
impl Extractor<ChatCompletionRequest, ChatCompletionStream, ClientError>
    for ChatCompletionExtractor
{
    fn request(&self, _call: &CallInfo<'_>, input: &ChatCompletionRequest) -> Attributes {
        self.request_attributes(input)
    }

    fn error(&self, _call: &CallInfo<'_>, error: &ClientError) -> Attributes {
        client_error_attributes(error)
    }
}
