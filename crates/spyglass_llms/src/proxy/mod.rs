//! Client proxies
//!
//! A proxy owns the wrapped client and implements the same trait, routing
//! the instrumented entry points through the span engine and forwarding
//! everything else unchanged.

mod chat_model;
mod openai;

pub use chat_model::{TracedChatModel, spyglass_chat_model};
pub use openai::{TracedChatClient, spyglass_openai};
