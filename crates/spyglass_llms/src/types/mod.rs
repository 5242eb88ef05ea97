//! Request and response types for the two supported client shapes.

pub mod chat;
pub mod message;

pub use chat::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionStream,
    ChatMessage, Choice, ChunkChoice, ChunkDelta, FunctionCall, FunctionDefinition, Role, Tool,
    ToolCall, Usage,
};
pub use message::{
    AiMessage, BaseMessage, ChatGeneration, ChatResult, ContentBlock, ContentPart,
    GenerateOptions, MessageContent, ModelParameters, ResponseMetadata, ToolCallRequest,
    UsageMetadata,
};
