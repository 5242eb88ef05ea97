//! Traced chat model.

use async_trait::async_trait;
use opentelemetry_sdk::trace::SdkTracer;
use spyglass_core::{Binding, Instrumentor, SpanSpec, in_span, in_span_async};

use crate::client::{AGENERATE, ChatModel, GENERATE};
use crate::error::Result;
use crate::extractors::{ChatModelCall, ChatModelExtractor};
use crate::types::{BaseMessage, ChatResult, GenerateOptions, ModelParameters};

const SYNC: Binding = Binding::new(GENERATE);
const ASYNC: Binding = Binding::new(AGENERATE);

/// A [`ChatModel`] whose generate calls run inside client spans.
///
/// Span names are `<system>.chat.generate` and `<system>.chat.agenerate`,
/// with underscores dropped from the system (`vertexai.chat.generate`).
/// `invoke` and `ainvoke` route through the traced methods.
pub struct TracedChatModel<M> {
    inner: M,
    tracer: SdkTracer,
    extractor: ChatModelExtractor,
    generate: SpanSpec,
    agenerate: Option<SpanSpec>,
}

impl<M: ChatModel> TracedChatModel<M> {
    /// Wrap `model` using the process-wide tracer.
    pub fn new(model: M) -> spyglass_core::Result<Self> {
        Self::with_instrumentor(model, &Instrumentor::global())
    }

    /// Wrap `model` using the tracer from `instrumentor`.
    pub fn with_instrumentor(model: M, instrumentor: &Instrumentor) -> spyglass_core::Result<Self> {
        let entry_points = model.entry_points();
        SYNC.resolve(model.model_type(), entry_points)?;

        let prefix = model.parameters().span_prefix();
        let agenerate = ASYNC
            .is_exposed(entry_points)
            .then(|| SpanSpec::client(format!("{prefix}.chat.{AGENERATE}")));

        let tracer = instrumentor.tracer()?;
        tracing::debug!(
            model = model.model_type(),
            async_entry_point = agenerate.is_some(),
            "Wrapped chat model"
        );

        Ok(Self {
            inner: model,
            tracer,
            extractor: ChatModelExtractor::default(),
            generate: SpanSpec::client(format!("{prefix}.chat.{GENERATE}")),
            agenerate,
        })
    }

    pub fn with_extractor(mut self, extractor: ChatModelExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    fn call<'a>(
        &'a self,
        messages: &'a [BaseMessage],
        options: &'a GenerateOptions,
    ) -> ChatModelCall<'a> {
        ChatModelCall {
            parameters: self.inner.parameters(),
            messages,
            options,
        }
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for TracedChatModel<M> {
    fn model_type(&self) -> &str {
        self.inner.model_type()
    }

    fn parameters(&self) -> &ModelParameters {
        self.inner.parameters()
    }

    fn entry_points(&self) -> &[&'static str] {
        self.inner.entry_points()
    }

    fn generate(&self, messages: &[BaseMessage], options: &GenerateOptions) -> Result<ChatResult> {
        in_span(
            &self.tracer,
            &self.generate,
            &self.extractor,
            self.call(messages, options),
            |call| self.inner.generate(call.messages, call.options),
        )
    }

    async fn agenerate(
        &self,
        messages: &[BaseMessage],
        options: &GenerateOptions,
    ) -> Result<ChatResult> {
        match &self.agenerate {
            Some(spec) => {
                in_span_async(
                    &self.tracer,
                    spec,
                    &self.extractor,
                    self.call(messages, options),
                    |call| self.inner.agenerate(call.messages, call.options),
                )
                .await
            }
            None => self.inner.agenerate(messages, options).await,
        }
    }
}

/// Wrap a chat model with the process-wide tracer.
pub fn spyglass_chat_model<M: ChatModel>(model: M) -> spyglass_core::Result<TracedChatModel<M>> {
    TracedChatModel::new(model)
}
