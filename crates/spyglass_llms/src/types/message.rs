//! Chat-model types (LangChain-style message sequence and generation result).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed content block, such as `{"type": "text", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }
}

/// One element of list-form message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Raw(String),
    Block(ContentBlock),
}

/// Message content: a plain string or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Flatten to text. Text parts are joined by a single space; non-text
    /// blocks are skipped.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Raw(text) => Some(text.as_str()),
                    ContentPart::Block(block) if block.kind == "text" => {
                        Some(block.text.as_deref().unwrap_or(""))
                    }
                    ContentPart::Block(_) => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

/// Token counts reported with a generation.
///
/// Accepts both `input_tokens` and Vertex `prompt_token_count` style keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(default, alias = "prompt_token_count")]
    pub input_tokens: Option<u64>,
    #[serde(default, alias = "candidates_token_count")]
    pub output_tokens: Option<u64>,
    #[serde(default, alias = "total_token_count")]
    pub total_tokens: Option<u64>,
}

impl UsageMetadata {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(input_tokens.saturating_add(output_tokens)),
        }
    }
}

/// Provider metadata attached to a generated message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_metadata: Option<Value>,
}

/// A message produced by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

impl AiMessage {
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRequest>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage_metadata = Some(usage);
        self
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.response_metadata = metadata;
        self
    }
}

/// A message in a chat-model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BaseMessage {
    System {
        content: MessageContent,
    },
    Human {
        content: MessageContent,
    },
    Ai(AiMessage),
    Tool {
        content: MessageContent,
        tool_call_id: String,
    },
}

impl BaseMessage {
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<MessageContent>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<MessageContent>) -> Self {
        Self::Ai(AiMessage::new(content))
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// Conversation role: system, user, assistant or tool.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::Ai(_) => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> &MessageContent {
        match self {
            Self::System { content } | Self::Human { content } | Self::Tool { content, .. } => {
                content
            }
            Self::Ai(message) => &message.content,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Self::Ai(message) => &message.tool_calls,
            _ => &[],
        }
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::Tool { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }
}

impl From<AiMessage> for BaseMessage {
    fn from(message: AiMessage) -> Self {
        Self::Ai(message)
    }
}

/// One candidate output of a generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatGeneration {
    pub message: AiMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<Value>,
}

impl ChatGeneration {
    pub fn new(message: AiMessage) -> Self {
        Self {
            message,
            generation_info: None,
        }
    }

    pub fn text(&self) -> String {
        self.message.content.to_text()
    }
}

/// Output of a chat-model generate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub generations: Vec<ChatGeneration>,
}

impl ChatResult {
    pub fn single(message: AiMessage) -> Self {
        Self {
            generations: vec![ChatGeneration::new(message)],
        }
    }

    pub fn first(&self) -> Option<&ChatGeneration> {
        self.generations.first()
    }
}

/// Identifying parameters of a chat model instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub model_name: String,
    /// Provider system, e.g. `vertex_ai`
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<Value>,
}

impl ModelParameters {
    pub fn new(system: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_safety_settings(mut self, safety_settings: Vec<Value>) -> Self {
        self.safety_settings = safety_settings;
        self
    }

    /// `vertex_ai` becomes `vertexai`, as used in span names.
    pub fn span_prefix(&self) -> String {
        self.system.replace('_', "")
    }
}

/// Per-call options passed alongside the messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Provider tool declarations, either `{"function_declarations": [...]}`
    /// or `{"function": {...}}`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
}

impl GenerateOptions {
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }
}
