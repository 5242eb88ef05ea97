//! Span wrapping engine
//!
//! Every traced invocation follows the same path: extract request
//! attributes, open a span under the current context, run the call with
//! that span active, extract success or error attributes, set the status,
//! close the span and hand back the call's own result.
//!
//! Streaming calls are traced up to the point the stream handle is
//! returned; consuming the stream happens outside the span.

use std::convert::Infallible;
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::Arc;

use opentelemetry::trace::{FutureExt as _, SpanKind};
use opentelemetry_sdk::trace::SdkTracer;
use spyglass_observability::{GlobalTracer, TracerSource};

use crate::attributes::ERROR_TYPE;
use crate::callable::Callable;
use crate::error::Result;
use crate::extract::{
    Arguments, CallInfo, Extractor, FunctionExtractor, guarded, short_name, short_type_name,
};
use crate::span::ActiveSpan;

/// Name and kind of the span opened for each invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSpec {
    pub name: String,
    pub kind: SpanKind,
}

impl SpanSpec {
    pub fn new(name: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self::new(name, SpanKind::Internal)
    }

    pub fn client(name: impl Into<String>) -> Self {
        Self::new(name, SpanKind::Client)
    }
}

/// Run a synchronous call inside a span.
///
/// The result is returned exactly as `call` produced it.
pub fn in_span<I, T, E, X, F>(
    tracer: &SdkTracer,
    spec: &SpanSpec,
    extractor: &X,
    input: I,
    call: F,
) -> std::result::Result<T, E>
where
    X: Extractor<I, T, E> + ?Sized,
    E: Display,
    F: FnOnce(I) -> std::result::Result<T, E>,
{
    let info = CallInfo::new(&spec.name);
    let request = guarded("request", || extractor.request(&info, &input));
    let span = ActiveSpan::open(tracer, &spec.name, spec.kind.clone(), request);

    let result = {
        let _guard = span.context().clone().attach();
        call(input)
    };

    let info = info.finished(span.elapsed());
    close::<I, T, E, X>(span, extractor, &info, &result);
    result
}

/// Run an asynchronous call inside a span.
///
/// The span stays active across every poll of the call's future and ends
/// when the future completes. Dropping the returned future early ends the
/// span with an error status.
pub async fn in_span_async<I, T, E, X, F, Fut>(
    tracer: &SdkTracer,
    spec: &SpanSpec,
    extractor: &X,
    input: I,
    call: F,
) -> std::result::Result<T, E>
where
    X: Extractor<I, T, E> + ?Sized,
    E: Display,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let info = CallInfo::new(&spec.name);
    let request = guarded("request", || extractor.request(&info, &input));
    let span = ActiveSpan::open(tracer, &spec.name, spec.kind.clone(), request);

    let cx = span.context().clone();
    let fut = {
        let _guard = cx.clone().attach();
        call(input)
    };
    let result = fut.with_context(cx).await;

    let info = info.finished(span.elapsed());
    close::<I, T, E, X>(span, extractor, &info, &result);
    result
}

fn close<I, T, E, X>(
    span: ActiveSpan,
    extractor: &X,
    info: &CallInfo<'_>,
    result: &std::result::Result<T, E>,
) where
    X: Extractor<I, T, E> + ?Sized,
    E: Display,
{
    match result {
        Ok(output) => {
            let attrs = guarded("success", || extractor.success(info, output));
            span.close_ok(attrs);
        }
        Err(error) => {
            let mut attrs = guarded("error", || extractor.error(info, error));
            if !attrs.contains(ERROR_TYPE) {
                attrs.insert(ERROR_TYPE, short_type_name::<E>());
            }
            let error_type = attrs.get_str(ERROR_TYPE).unwrap_or_default();
            span.close_err(attrs, error_type, error.to_string());
        }
    }
}

/// Per-wrap settings.
#[derive(Debug, Clone)]
pub struct TraceOptions<X = FunctionExtractor> {
    name: Option<String>,
    kind: SpanKind,
    extractor: X,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            name: None,
            kind: SpanKind::Internal,
            extractor: FunctionExtractor::default(),
        }
    }
}

impl TraceOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X> TraceOptions<X> {
    /// Override the span name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replace the extractor.
    pub fn extractor<Y>(self, extractor: Y) -> TraceOptions<Y> {
        TraceOptions {
            name: self.name,
            kind: self.kind,
            extractor,
        }
    }
}

/// A callable wrapped so every invocation runs inside its own span.
///
/// Arguments are passed as a tuple: `traced.call((2, 3))` calls `f(2, 3)`.
pub struct Traced<F, X = FunctionExtractor> {
    inner: F,
    spec: SpanSpec,
    extractor: X,
    tracer: SdkTracer,
}

impl<F, X> Traced<F, X> {
    fn new(inner: F, options: TraceOptions<X>, tracer: SdkTracer) -> Self {
        let name = options
            .name
            .unwrap_or_else(|| short_name(std::any::type_name::<F>()).to_string());

        Self {
            inner,
            spec: SpanSpec::new(name, options.kind),
            extractor: options.extractor,
            tracer,
        }
    }

    /// Span name used for every invocation.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> &SpanKind {
        &self.spec.kind
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Call a function that cannot fail.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Callable<Args>,
        Args: Arguments,
        X: Extractor<Args, F::Output, Infallible>,
    {
        let result = in_span(&self.tracer, &self.spec, &self.extractor, args, |args| {
            Ok::<_, Infallible>(self.inner.invoke(args))
        });
        match result {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Call a function returning `Result`; the error is returned unchanged.
    pub fn try_call<Args, T, E>(&self, args: Args) -> std::result::Result<T, E>
    where
        F: Callable<Args, Output = std::result::Result<T, E>>,
        Args: Arguments,
        E: Display,
        X: Extractor<Args, T, E>,
    {
        in_span(&self.tracer, &self.spec, &self.extractor, args, |args| {
            self.inner.invoke(args)
        })
    }

    /// Call an async function that cannot fail.
    pub async fn call_async<Args, Fut>(&self, args: Args) -> Fut::Output
    where
        F: Callable<Args, Output = Fut>,
        Fut: Future,
        Args: Arguments,
        X: Extractor<Args, Fut::Output, Infallible>,
    {
        let result = in_span_async(&self.tracer, &self.spec, &self.extractor, args, |args| {
            let fut = self.inner.invoke(args);
            async move { Ok::<_, Infallible>(fut.await) }
        })
        .await;
        match result {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Call an async function returning `Result`; the error is returned
    /// unchanged.
    pub async fn try_call_async<Args, Fut, T, E>(&self, args: Args) -> std::result::Result<T, E>
    where
        F: Callable<Args, Output = Fut>,
        Fut: Future<Output = std::result::Result<T, E>>,
        Args: Arguments,
        E: Display,
        X: Extractor<Args, T, E>,
    {
        in_span_async(&self.tracer, &self.spec, &self.extractor, args, |args| {
            self.inner.invoke(args)
        })
        .await
    }
}

impl<F, X: fmt::Debug> fmt::Debug for Traced<F, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("spec", &self.spec)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

/// Wraps callables and clients with spans from an injected tracer source.
#[derive(Clone)]
pub struct Instrumentor {
    source: Arc<dyn TracerSource>,
}

impl Instrumentor {
    pub fn new(source: impl TracerSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Instrumentor backed by the process-wide tracer.
    pub fn global() -> Self {
        Self::new(GlobalTracer)
    }

    /// Resolve the tracer, initializing the source if needed.
    pub fn tracer(&self) -> Result<SdkTracer> {
        Ok(self.source.tracer()?)
    }

    /// Wrap `f` with default options.
    ///
    /// The tracer is resolved here, so configuration errors surface before
    /// any call is made.
    pub fn wrap<F>(&self, f: F) -> Result<Traced<F>> {
        self.wrap_with(f, TraceOptions::default())
    }

    pub fn wrap_with<F, X>(&self, f: F, options: TraceOptions<X>) -> Result<Traced<F, X>> {
        let tracer = self.tracer()?;
        let traced = Traced::new(f, options, tracer);
        tracing::debug!(name = traced.name(), "Wrapped callable");
        Ok(traced)
    }
}

impl Default for Instrumentor {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Instrumentor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentor").finish_non_exhaustive()
    }
}

/// Wrap `f` using the process-wide tracer.
///
/// ```no_run
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let add = spyglass_core::trace(add)?;
/// assert_eq!(add.call((2, 3)), 5);
/// # Ok::<(), spyglass_core::SpyglassError>(())
/// ```
pub fn trace<F>(f: F) -> Result<Traced<F>> {
    Instrumentor::global().wrap(f)
}

/// Wrap `f` with options using the process-wide tracer.
pub fn trace_with<F, X>(f: F, options: TraceOptions<X>) -> Result<Traced<F, X>> {
    Instrumentor::global().wrap_with(f, options)
}
