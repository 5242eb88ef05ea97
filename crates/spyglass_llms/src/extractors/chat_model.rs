//! Attributes for chat-model invocations.
//!
//! Only the first generation of a result is inspected.

use serde_json::Value;
use spyglass_core::attributes::*;
use spyglass_core::{Attributes, CallInfo, Extractor};

use super::chat_completion::client_error_attributes;
use super::format::{format_ai_message, format_messages, to_json};
use crate::error::ClientError;
use crate::types::{BaseMessage, ChatResult, GenerateOptions, ModelParameters};

/// Input of one chat-model call.
#[derive(Debug, Clone, Copy)]
pub struct ChatModelCall<'a> {
    pub parameters: &'a ModelParameters,
    pub messages: &'a [BaseMessage],
    pub options: &'a GenerateOptions,
}

/// Extractor for [`ChatModelCall`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatModelExtractor {
    capture_content: bool,
}

impl Default for ChatModelExtractor {
    fn default() -> Self {
        Self {
            capture_content: true,
        }
    }
}

impl ChatModelExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record message bodies on spans (on by default).
    pub fn with_content_capture(mut self, capture: bool) -> Self {
        self.capture_content = capture;
        self
    }
}

/// Names declared by provider tool definitions.
///
/// Accepts `{"function_declarations": [{"name": ..}]}` and
/// `{"function": {"name": ..}}`; a declaration without a name counts as
/// `unknown`.
pub fn declared_tool_names(tools: &[Value]) -> Vec<String> {
    fn name_of(value: &Value) -> String {
        value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    }

    let mut names = Vec::new();
    for tool in tools {
        if let Some(declarations) = tool.get("function_declarations").and_then(Value::as_array) {
            names.extend(declarations.iter().map(name_of));
        } else if let Some(function) = tool.get("function") {
            names.push(name_of(function));
        }
    }
    names
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Zero counts are treated as absent.
fn positive(count: Option<u64>) -> Option<u64> {
    count.filter(|count| *count > 0)
}

impl<'a> Extractor<ChatModelCall<'a>, ChatResult, ClientError> for ChatModelExtractor {
    fn request(&self, _call: &CallInfo<'_>, input: &ChatModelCall<'a>) -> Attributes {
        let params = input.parameters;
        let mut attrs = Attributes::new();
        attrs
            .insert(GEN_AI_OPERATION_NAME, "chat")
            .insert(GEN_AI_SYSTEM, params.system.clone())
            .insert(GEN_AI_REQUEST_MODEL, params.model_name.clone())
            .insert_opt(GEN_AI_REQUEST_VERTEX_AI_PROJECT, non_empty(&params.project))
            .insert_opt(GEN_AI_REQUEST_VERTEX_AI_LOCATION, non_empty(&params.location))
            .insert_opt(GEN_AI_REQUEST_TEMPERATURE, params.temperature)
            .insert_opt(GEN_AI_REQUEST_MAX_TOKENS, params.max_output_tokens.map(i64::from))
            .insert_opt(GEN_AI_REQUEST_TOP_P, params.top_p)
            .insert_opt(GEN_AI_REQUEST_TOP_K, params.top_k.map(i64::from))
            .insert_count(GEN_AI_INPUT_MESSAGES_COUNT, input.messages.len());

        if self.capture_content {
            attrs.insert_opt(
                GEN_AI_INPUT_MESSAGES,
                to_json(&format_messages(input.messages)),
            );
        }

        let tools = &input.options.tools;
        if !tools.is_empty() {
            attrs.insert_count(GEN_AI_REQUEST_TOOLS_COUNT, tools.len());
            let names = declared_tool_names(tools);
            if !names.is_empty() {
                attrs.insert(GEN_AI_REQUEST_TOOLS_NAMES, names.join(","));
            }
        }

        if !params.safety_settings.is_empty() {
            attrs.insert(GEN_AI_REQUEST_VERTEX_AI_SAFETY_SETTINGS_ENABLED, true);
        }

        attrs
    }

    fn success(&self, _call: &CallInfo<'_>, output: &ChatResult) -> Attributes {
        let mut attrs = Attributes::new();
        let Some(generation) = output.first() else {
            return attrs;
        };
        let message = &generation.message;

        if let Some(usage) = &message.usage_metadata {
            let counts = [
                (GEN_AI_USAGE_INPUT_TOKENS, usage.input_tokens),
                (GEN_AI_USAGE_OUTPUT_TOKENS, usage.output_tokens),
                (GEN_AI_USAGE_TOTAL_TOKENS, usage.total_tokens),
            ];
            for (key, count) in counts {
                if let Some(count) = positive(count) {
                    attrs.insert_count(key, count);
                }
            }
        }

        if self.capture_content {
            attrs.insert_opt(
                GEN_AI_OUTPUT_MESSAGES,
                to_json(&[format_ai_message(message)]),
            );
        }

        if !message.tool_calls.is_empty() {
            let names: Vec<&str> = message.tool_calls.iter().map(|tc| tc.name.as_str()).collect();
            attrs
                .insert_count(GEN_AI_RESPONSE_TOOLS_COUNT, names.len())
                .insert(GEN_AI_RESPONSE_TOOLS_NAMES, names.join(","));
        }

        let metadata = &message.response_metadata;
        attrs
            .insert_opt(GEN_AI_RESPONSE_MODEL, metadata.model_name.clone())
            .insert_opt(GEN_AI_RESPONSE_FINISH_REASONS, metadata.finish_reason.clone());

        if !metadata.safety_ratings.is_empty() {
            attrs.insert_count(
                GEN_AI_RESPONSE_VERTEX_AI_SAFETY_RATINGS_COUNT,
                metadata.safety_ratings.len(),
            );
        }

        let has_citations = metadata.citation_metadata.as_ref().is_some_and(|citations| {
            match citations {
                Value::Null => false,
                Value::Array(items) => !items.is_empty(),
                Value::Object(fields) => !fields.is_empty(),
                _ => true,
            }
        });
        if has_citations {
            attrs.insert(GEN_AI_RESPONSE_VERTEX_AI_HAS_CITATIONS, true);
        }

        attrs.insert_count(
            GEN_AI_RESPONSE_CONTENT_LENGTH,
            generation.text().chars().count(),
        );

        attrs
    }

    fn error(&self, _call: &CallInfo<'_>, error: &ClientError) -> Attributes {
        client_error_attributes(error)
    }
}
