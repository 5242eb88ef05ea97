//! Common test utilities: in-memory span pipeline and mock clients.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use opentelemetry::Value;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider, SpanData};
use spyglass_core::Instrumentor;
use spyglass_llms::client::{
    AGENERATE, CHAT_COMPLETIONS_CREATE, CHAT_COMPLETIONS_STREAM, ChatCompletionClient, ChatModel,
    GENERATE,
};
use spyglass_llms::types::{
    ChatCompletionChunk, ChatCompletionStream, Choice, ChunkChoice, ChunkDelta, ResponseMetadata,
};
use spyglass_llms::{
    AiMessage, BaseMessage, ChatCompletion, ChatCompletionRequest, ChatMessage, ChatResult,
    ClientError, GenerateOptions, ModelParameters, Result, UsageMetadata, Usage,
};

/// A tracer whose finished spans land in memory.
pub struct TestPipeline {
    pub exporter: InMemorySpanExporter,
    pub provider: SdkTracerProvider,
    pub tracer: SdkTracer,
}

impl TestPipeline {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("test");

        Self {
            exporter,
            provider,
            tracer,
        }
    }

    pub fn instrumentor(&self) -> Instrumentor {
        Instrumentor::new(self.tracer.clone())
    }

    pub fn spans(&self) -> Vec<SpanData> {
        let _ = self.provider.force_flush();
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn span_named(&self, name: &str) -> SpanData {
        self.spans()
            .into_iter()
            .find(|span| span.name == name)
            .unwrap_or_else(|| panic!("expected span {name}"))
    }
}

pub fn find_attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .rev()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

pub fn attribute_str(span: &SpanData, key: &str) -> Option<String> {
    find_attribute(span, key).map(|value| value.as_str().into_owned())
}

/// Mock OpenAI-style client returning a canned outcome.
pub struct MockOpenAi {
    pub outcome: std::result::Result<Usage, ClientError>,
    pub streaming: bool,
}

impl MockOpenAi {
    pub fn ok(usage: Usage) -> Self {
        Self {
            outcome: Ok(usage),
            streaming: false,
        }
    }

    pub fn failing(error: ClientError) -> Self {
        Self {
            outcome: Err(error),
            streaming: false,
        }
    }

    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }
}

#[async_trait]
impl ChatCompletionClient for MockOpenAi {
    fn client_name(&self) -> &str {
        "MockOpenAi"
    }

    fn entry_points(&self) -> &[&'static str] {
        if self.streaming {
            &[CHAT_COMPLETIONS_CREATE, CHAT_COMPLETIONS_STREAM]
        } else {
            &[CHAT_COMPLETIONS_CREATE]
        }
    }

    async fn create_chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletion> {
        let usage = self.outcome.clone()?;
        Ok(ChatCompletion {
            id: "chatcmpl-test".to_string(),
            model: request.model,
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant("Hello there"),
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(usage),
        })
    }

    async fn stream_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream> {
        if !self.streaming {
            return Err(ClientError::unsupported(CHAT_COMPLETIONS_STREAM));
        }

        let chunks = ["Hel", "lo"].map(|text| {
            Ok::<_, ClientError>(ChatCompletionChunk {
                id: "chatcmpl-stream".to_string(),
                model: request.model.clone(),
                choices: vec![ChunkChoice {
                    index: 0,
                    delta: ChunkDelta {
                        role: None,
                        content: Some(text.to_string()),
                    },
                    finish_reason: None,
                }],
            })
        });
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()])
    }
}

/// Mock Vertex-style chat model.
pub struct MockVertex {
    pub parameters: ModelParameters,
    pub fail: bool,
    pub with_async: bool,
}

impl MockVertex {
    pub fn new() -> Self {
        Self {
            parameters: ModelParameters::new("vertex_ai", "gemini-1.5-pro")
                .with_project("acme-prod")
                .with_location("us-central1"),
            fail: false,
            with_async: true,
        }
    }

    fn result(&self) -> Result<ChatResult> {
        if self.fail {
            return Err(ClientError::Authentication(
                "invalid service account".to_string(),
            ));
        }

        Ok(ChatResult::single(
            AiMessage::new("Paris")
                .with_usage(UsageMetadata::new(10, 5))
                .with_metadata(ResponseMetadata {
                    model_name: Some("gemini-1.5-pro-002".to_string()),
                    finish_reason: Some("STOP".to_string()),
                    ..Default::default()
                }),
        ))
    }
}

#[async_trait]
impl ChatModel for MockVertex {
    fn model_type(&self) -> &str {
        "ChatVertexAI"
    }

    fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    fn entry_points(&self) -> &[&'static str] {
        if self.with_async {
            &[GENERATE, AGENERATE]
        } else {
            &[GENERATE]
        }
    }

    fn generate(&self, _messages: &[BaseMessage], _options: &GenerateOptions) -> Result<ChatResult> {
        self.result()
    }

    async fn agenerate(
        &self,
        _messages: &[BaseMessage],
        _options: &GenerateOptions,
    ) -> Result<ChatResult> {
        if !self.with_async {
            return Err(ClientError::unsupported(AGENERATE));
        }
        tokio::task::yield_now().await;
        self.result()
    }
}
