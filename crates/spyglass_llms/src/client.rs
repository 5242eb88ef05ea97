//! Client capability traits
//!
//! Two call shapes are supported: OpenAI-style chat completions and
//! LangChain-style chat models. Traced proxies implement the same traits as
//! the clients they wrap, so code written against a trait accepts either.

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::types::{
    AiMessage, BaseMessage, ChatCompletion, ChatCompletionRequest, ChatCompletionStream,
    ChatResult, GenerateOptions, ModelParameters,
};

/// Entry point for a blocking chat completion request.
pub const CHAT_COMPLETIONS_CREATE: &str = "chat.completions.create";
/// Entry point for a streamed chat completion request.
pub const CHAT_COMPLETIONS_STREAM: &str = "chat.completions.stream";
/// Entry point for synchronous chat-model generation.
pub const GENERATE: &str = "generate";
/// Entry point for asynchronous chat-model generation.
pub const AGENERATE: &str = "agenerate";

/// An OpenAI-style chat completion client.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Name used in diagnostics, e.g. `OpenAI`.
    fn client_name(&self) -> &str;

    /// Entry points this client exposes.
    fn entry_points(&self) -> &[&'static str] {
        &[CHAT_COMPLETIONS_CREATE]
    }

    async fn create_chat_completion(&self, request: ChatCompletionRequest)
    -> Result<ChatCompletion>;

    async fn stream_chat_completion(
        &self,
        _request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream> {
        Err(ClientError::unsupported(CHAT_COMPLETIONS_STREAM))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// A LangChain-style chat model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Name used in diagnostics, e.g. `ChatVertexAI`.
    fn model_type(&self) -> &str;

    /// Identifying parameters of this instance.
    fn parameters(&self) -> &ModelParameters;

    fn entry_points(&self) -> &[&'static str] {
        &[GENERATE]
    }

    fn generate(&self, messages: &[BaseMessage], options: &GenerateOptions)
    -> Result<ChatResult>;

    async fn agenerate(
        &self,
        _messages: &[BaseMessage],
        _options: &GenerateOptions,
    ) -> Result<ChatResult> {
        Err(ClientError::unsupported(AGENERATE))
    }

    /// Generate and return the first candidate's message.
    fn invoke(&self, messages: &[BaseMessage]) -> Result<AiMessage> {
        first_message(self.generate(messages, &GenerateOptions::default())?)
    }

    async fn ainvoke(&self, messages: &[BaseMessage]) -> Result<AiMessage> {
        first_message(
            self.agenerate(messages, &GenerateOptions::default())
                .await?,
        )
    }
}

fn first_message(result: ChatResult) -> Result<AiMessage> {
    result
        .generations
        .into_iter()
        .next()
        .map(|generation| generation.message)
        .ok_or_else(|| ClientError::Other("model returned no generations".to_string()))
}
