//! Traced chat completion client.

use async_trait::async_trait;
use opentelemetry_sdk::trace::SdkTracer;
use spyglass_core::{Binding, Instrumentor, SpanSpec, in_span_async};

use crate::client::{CHAT_COMPLETIONS_CREATE, CHAT_COMPLETIONS_STREAM, ChatCompletionClient};
use crate::error::Result;
use crate::extractors::ChatCompletionExtractor;
use crate::types::{ChatCompletion, ChatCompletionRequest, ChatCompletionStream};

const CREATE: Binding = Binding::new(CHAT_COMPLETIONS_CREATE);
const STREAM: Binding = Binding::new(CHAT_COMPLETIONS_STREAM);

/// A [`ChatCompletionClient`] whose completion calls run inside client spans.
///
/// Everything other than `create` and `stream` is forwarded untouched.
pub struct TracedChatClient<C> {
    inner: C,
    tracer: SdkTracer,
    extractor: ChatCompletionExtractor,
    create: SpanSpec,
    stream: Option<SpanSpec>,
}

impl<C: ChatCompletionClient> TracedChatClient<C> {
    /// Wrap `client` using the process-wide tracer.
    pub fn new(client: C) -> spyglass_core::Result<Self> {
        Self::with_instrumentor(client, &Instrumentor::global())
    }

    /// Wrap `client` using the tracer from `instrumentor`.
    ///
    /// Fails when the tracer cannot be initialized or the client does not
    /// expose `chat.completions.create`.
    pub fn with_instrumentor(client: C, instrumentor: &Instrumentor) -> spyglass_core::Result<Self> {
        let entry_points = client.entry_points();
        CREATE.resolve(client.client_name(), entry_points)?;
        let stream = STREAM
            .is_exposed(entry_points)
            .then(|| SpanSpec::client(STREAM.path()));

        let tracer = instrumentor.tracer()?;
        tracing::debug!(
            client = client.client_name(),
            stream = stream.is_some(),
            "Wrapped chat completion client"
        );

        Ok(Self {
            inner: client,
            tracer,
            extractor: ChatCompletionExtractor::default(),
            create: SpanSpec::client(CREATE.path()),
            stream,
        })
    }

    pub fn with_extractor(mut self, extractor: ChatCompletionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: ChatCompletionClient> ChatCompletionClient for TracedChatClient<C> {
    fn client_name(&self) -> &str {
        self.inner.client_name()
    }

    fn entry_points(&self) -> &[&'static str] {
        self.inner.entry_points()
    }

    async fn create_chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletion> {
        in_span_async(
            &self.tracer,
            &self.create,
            &self.extractor,
            request,
            |request| self.inner.create_chat_completion(request),
        )
        .await
    }

    async fn stream_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream> {
        match &self.stream {
            Some(spec) => {
                in_span_async(&self.tracer, spec, &self.extractor, request, |request| {
                    self.inner.stream_chat_completion(request)
                })
                .await
            }
            None => self.inner.stream_chat_completion(request).await,
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.inner.list_models().await
    }
}

/// Wrap an OpenAI-style client with the process-wide tracer.
pub fn spyglass_openai<C: ChatCompletionClient>(client: C) -> spyglass_core::Result<TracedChatClient<C>> {
    TracedChatClient::new(client)
}
