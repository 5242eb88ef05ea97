//! spyglass_llms - traced proxies for LLM clients.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  TracedChatClient<C>            TracedChatModel<M>       │
//! │  chat.completions.create        <system>.chat.generate   │
//! │  chat.completions.stream        <system>.chat.agenerate  │
//! └───────────────┬──────────────────────────┬───────────────┘
//!                 ▼                          ▼
//!      ChatCompletionExtractor       ChatModelExtractor
//!                 └────────────┬─────────────┘
//!                              ▼
//!                 spyglass_core::in_span(_async)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spyglass_llms::{ChatCompletionClient, spyglass_openai};
//!
//! let client = spyglass_openai(my_openai_client)?;
//! let completion = client.create_chat_completion(request).await?;
//! ```

pub mod client;
pub mod error;
pub mod extractors;
pub mod proxy;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export core abstractions
pub use client::{ChatCompletionClient, ChatModel};
pub use error::{ClientError, Result};

// Re-export proxies
pub use proxy::{TracedChatClient, TracedChatModel, spyglass_chat_model, spyglass_openai};

// Re-export extractors
pub use extractors::{ChatCompletionExtractor, ChatModelCall, ChatModelExtractor};

// Re-export commonly used types
pub use types::{
    AiMessage, BaseMessage, ChatCompletion, ChatCompletionRequest, ChatMessage, ChatResult,
    GenerateOptions, ModelParameters, Role, Usage, UsageMetadata,
};
