//! Attribute extractors for LLM call shapes
//!
//! Both extractors write the same `gen_ai.*` attribute names so spans from
//! structurally different clients land in one schema.

pub mod chat_completion;
pub mod chat_model;
pub mod format;

pub use chat_completion::ChatCompletionExtractor;
pub use chat_model::{ChatModelCall, ChatModelExtractor, declared_tool_names};
pub use format::{FormattedMessage, format_ai_message, format_messages};
