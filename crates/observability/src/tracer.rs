//! Process-wide tracer state
//!
//! The tracer is created on first use and lives until the process exits.
//! Concurrent first callers block on the same cell, so exactly one
//! provider/tracer pair is ever built per [`LazyTracer`].

use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};

use crate::error::{ObservabilityError, Result};

/// Instrumentation scope name shared by every span this crate family opens.
pub const TRACER_NAME: &str = "spyglass-tracer";

/// Builds the provider backing a [`LazyTracer`].
pub type Loader = fn() -> Result<SdkTracerProvider>;

/// The process-wide tracer, configured from the environment on first use.
pub static GLOBAL_TRACER: LazyTracer = LazyTracer::new(crate::telemetry::bootstrap_from_env);

/// Get the shared tracer, initializing it from the environment if needed.
///
/// Fails with [`ObservabilityError::Config`] when required environment
/// variables are missing. Nothing is cached on failure, so a later call
/// retries.
pub fn get_tracer() -> Result<SdkTracer> {
    GLOBAL_TRACER.get()
}

struct TracerState {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

/// Lazily initialized provider and tracer pair.
pub struct LazyTracer {
    state: OnceCell<TracerState>,
    loader: Loader,
}

impl LazyTracer {
    pub const fn new(loader: Loader) -> Self {
        Self {
            state: OnceCell::new(),
            loader,
        }
    }

    /// Return the tracer, running the loader on first use.
    pub fn get(&self) -> Result<SdkTracer> {
        self.get_or_init_with(self.loader)
    }

    /// Return the tracer, running `load` instead of the default loader if
    /// this is the first use. Ignored once initialized.
    pub fn get_or_init_with<F>(&self, load: F) -> Result<SdkTracer>
    where
        F: FnOnce() -> Result<SdkTracerProvider>,
    {
        self.state
            .get_or_try_init(|| {
                let provider = load()?;
                let tracer = provider.tracer(TRACER_NAME);
                tracing::debug!(tracer = TRACER_NAME, "Tracer initialized");
                Ok(TracerState { provider, tracer })
            })
            .map(|state| state.tracer.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// The provider, if initialization already happened.
    pub fn provider(&self) -> Option<&SdkTracerProvider> {
        self.state.get().map(|state| &state.provider)
    }

    /// Push buffered spans to the exporter. A no-op before initialization.
    pub fn force_flush(&self) -> Result<()> {
        match self.provider() {
            Some(provider) => provider
                .force_flush()
                .map_err(|e| ObservabilityError::Export(e.to_string())),
            None => Ok(()),
        }
    }
}

/// Something that can hand out the tracer used by the wrapping engine.
///
/// Production code uses [`GlobalTracer`]; tests inject an [`SdkTracer`]
/// built on an in-memory exporter.
pub trait TracerSource: Send + Sync {
    fn tracer(&self) -> Result<SdkTracer>;
}

/// [`TracerSource`] backed by [`GLOBAL_TRACER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTracer;

impl TracerSource for GlobalTracer {
    fn tracer(&self) -> Result<SdkTracer> {
        GLOBAL_TRACER.get()
    }
}

impl TracerSource for LazyTracer {
    fn tracer(&self) -> Result<SdkTracer> {
        self.get()
    }
}

impl TracerSource for SdkTracer {
    fn tracer(&self) -> Result<SdkTracer> {
        Ok(self.clone())
    }
}

impl<T: TracerSource + ?Sized> TracerSource for &T {
    fn tracer(&self) -> Result<SdkTracer> {
        (**self).tracer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TracerProvider as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn counting_loader() -> Result<SdkTracerProvider> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        Ok(SdkTracerProvider::builder().build())
    }

    fn failing_loader() -> Result<SdkTracerProvider> {
        Err(ObservabilityError::Config(
            "SPYGLASS_API_KEY is not set".to_string(),
        ))
    }

    #[test]
    fn test_concurrent_first_access_initializes_once() {
        static TRACER: LazyTracer = LazyTracer::new(counting_loader);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| TRACER.get().unwrap());
            }
        });

        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
        assert!(TRACER.is_initialized());

        // Later calls reuse the same state
        TRACER.get().unwrap();
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_returned_and_not_cached() {
        let tracer = LazyTracer::new(failing_loader);

        let err = tracer.get().unwrap_err();
        assert!(matches!(err, ObservabilityError::Config(_)));
        assert!(!tracer.is_initialized());
        assert!(tracer.provider().is_none());

        // A later call with a working loader recovers
        tracer
            .get_or_init_with(|| Ok(SdkTracerProvider::builder().build()))
            .unwrap();
        assert!(tracer.is_initialized());
    }

    #[test]
    fn test_get_or_init_with_is_ignored_after_init() {
        let tracer = LazyTracer::new(|| Ok(SdkTracerProvider::builder().build()));
        tracer.get().unwrap();

        let second = tracer.get_or_init_with(failing_loader);
        assert!(second.is_ok());
    }

    #[test]
    fn test_force_flush_before_init_is_noop() {
        let tracer = LazyTracer::new(failing_loader);
        assert!(tracer.force_flush().is_ok());
    }

    #[test]
    fn test_sdk_tracer_is_a_source() {
        let provider = SdkTracerProvider::builder().build();
        let tracer = provider.tracer("test");
        assert!(TracerSource::tracer(&tracer).is_ok());
        assert!(TracerSource::tracer(&&tracer).is_ok());
    }
}
