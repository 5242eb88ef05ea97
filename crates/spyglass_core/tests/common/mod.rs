//! Common test utilities: an in-memory span pipeline.

use opentelemetry::Value;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider, SpanData};
use spyglass_core::Instrumentor;

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

    /// Instrumentor drawing from this pipeline's tracer.
    pub fn instrumentor(&self) -> Instrumentor {
        Instrumentor::new(self.tracer.clone())
    }

    pub fn spans(&self) -> Vec<SpanData> {
        let _ = self.provider.force_flush();
        self.exporter.get_finished_spans().unwrap()
    }

    /// The only finished span; panics unless exactly one exists.
    pub fn single_span(&self) -> SpanData {
        let mut spans = self.spans();
        assert_eq!(spans.len(), 1, "expected one span, got {spans:?}");
        spans.remove(0)
    }
}

pub fn find_attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .rev()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

#[allow(dead_code)]
pub fn attribute_str(span: &SpanData, key: &str) -> Option<String> {
    find_attribute(span, key).map(|value| value.as_str().into_owned())
}
