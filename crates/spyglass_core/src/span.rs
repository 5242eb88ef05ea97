//! Span lifecycle guard.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::SdkTracer;

use crate::attributes::{Attributes, EXCEPTION_EVENT, EXCEPTION_MESSAGE, EXCEPTION_TYPE};

/// An open span that ends exactly once.
///
/// Closing consumes the guard. A guard dropped while still open (the call
/// panicked, or an async call was cancelled) ends its span with an error
/// status.
pub(crate) struct ActiveSpan {
    cx: Context,
    started: Instant,
    closed: bool,
}

impl ActiveSpan {
    /// Start a span as a child of the current context.
    pub(crate) fn open(
        tracer: &SdkTracer,
        name: &str,
        kind: SpanKind,
        attributes: Attributes,
    ) -> Self {
        let span = tracer
            .span_builder(name.to_string())
            .with_kind(kind)
            .with_attributes(attributes.into_vec())
            .start(tracer);

        Self {
            cx: Context::current_with_span(span),
            started: Instant::now(),
            closed: false,
        }
    }

    /// Context carrying this span, for attaching around the call.
    pub(crate) fn context(&self) -> &Context {
        &self.cx
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn close_ok(mut self, attributes: Attributes) {
        let span = self.cx.span();
        span.set_attributes(attributes);
        span.set_status(Status::Ok);
        span.end();
        self.closed = true;
    }

    pub(crate) fn close_err(mut self, attributes: Attributes, error_type: String, message: String) {
        let span = self.cx.span();
        span.set_attributes(attributes);
        span.add_event(
            EXCEPTION_EVENT,
            vec![
                KeyValue::new(EXCEPTION_TYPE, error_type),
                KeyValue::new(EXCEPTION_MESSAGE, message.clone()),
            ],
        );
        span.set_status(Status::error(message));
        span.end();
        self.closed = true;
    }

    fn abandon(&self, reason: &'static str) {
        let span = self.cx.span();
        span.set_status(Status::Error {
            description: Cow::Borrowed(reason),
        });
        span.end();
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let reason = if std::thread::panicking() {
            "panicked"
        } else {
            "dropped before completion"
        };
        tracing::debug!(reason, "Span ended without a result");
        self.abandon(reason);
    }
}
