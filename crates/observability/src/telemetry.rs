//! OpenTelemetry telemetry initialization for version 0.31.0
//!
//! Exports spans over OTLP/gRPC to the Spyglass ingest endpoint, with gzip
//! compression and the API key as a bearer token.
//!
//! The tonic channel is created while building the exporter, so the first
//! tracer request must happen inside a Tokio runtime. Outside one, building
//! fails with [`ObservabilityError::InitFailed`].

use opentelemetry::global;
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::transport::ClientTlsConfig;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;
use crate::error::{ObservabilityError, Result};
use crate::tracer::GLOBAL_TRACER;

/// Initialize Spyglass tracing and console logging with the given configuration
///
/// Installs the process-wide tracer and a `tracing` subscriber whose spans
/// are exported through the same tracer.
///
/// If the process-wide tracer was already initialized (for example by an
/// earlier wrapped call), the existing exporter stays in effect and the
/// endpoint and API key in `config` are ignored. A warning is logged.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the exporter cannot be built
/// or a global subscriber is already installed
pub fn init(config: ObservabilityConfig) -> Result<()> {
    let env_filter = config
        .log_level
        .as_ref()
        .map(|level| tracing_subscriber::EnvFilter::new(level.as_str()))
        .unwrap_or_else(|| {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        });

    let already_initialized = GLOBAL_TRACER.is_initialized();
    let tracer = GLOBAL_TRACER.get_or_init_with(|| install_provider(&config))?;

    let fmt_layer = config
        .enable_console
        .then_some(tracing_subscriber::fmt::layer());

    let otel_layer = OpenTelemetryLayer::new(tracer);

    // Compose subscriber once (no mutation, avoids type mismatch)
    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    if already_initialized {
        tracing::warn!(
            otlp.endpoint = %config.endpoint(),
            "Tracer was already initialized; supplied exporter configuration ignored"
        );
    }

    tracing::info!(
        service.name = %config.deployment_id,
        otlp.endpoint = %config.endpoint(),
        "Spyglass tracing initialized"
    );

    Ok(())
}

/// Initialize with configuration read from environment variables
pub fn init_from_env() -> Result<()> {
    init(ObservabilityConfig::from_env()?)
}

/// Default loader of the global tracer: read the environment, build the
/// provider and install it as the OpenTelemetry global provider.
pub fn bootstrap_from_env() -> Result<SdkTracerProvider> {
    let config = ObservabilityConfig::from_env()?;
    install_provider(&config)
}

fn install_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider> {
    let provider = build_tracer_provider(config)?;

    // Set as global provider so other OpenTelemetry users share the pipeline
    global::set_tracer_provider(provider.clone());

    tracing::info!(
        service.name = %config.deployment_id,
        otlp.endpoint = %config.endpoint(),
        "OTLP tracing enabled"
    );

    Ok(provider)
}

/// Build the tracer provider for a configuration
///
/// Creates an OTLP span exporter behind a batch processor, with the resource
/// descriptor derived from the deployment identifier.
pub fn build_tracer_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider> {
    let span_exporter = build_span_exporter(config)?;

    // In 0.31, with_batch_exporter() takes only the exporter (runtime handled via rt-tokio feature)
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(config.resource().to_resource())
        .build();

    Ok(provider)
}

fn build_span_exporter(config: &ObservabilityConfig) -> Result<opentelemetry_otlp::SpanExporter> {
    tokio::runtime::Handle::try_current().map_err(|e| {
        ObservabilityError::InitFailed(format!("OTLP exporter requires a Tokio runtime: {e}"))
    })?;

    let endpoint = config.endpoint().to_string();

    let mut metadata = MetadataMap::new();
    metadata.insert("authorization", bearer_token(&config.api_key)?);

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.clone())
        .with_compression(Compression::Gzip)
        .with_metadata(metadata);

    if endpoint.starts_with("https://") {
        builder = builder.with_tls_config(ClientTlsConfig::new().with_native_roots());
    }

    tracing::debug!(otlp.endpoint = %endpoint, "Building OTLP span exporter");

    builder
        .build()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))
}

fn bearer_token(api_key: &str) -> Result<MetadataValue<tonic::metadata::Ascii>> {
    MetadataValue::try_from(format!("Bearer {api_key}")).map_err(|_| {
        ObservabilityError::Config("SPYGLASS_API_KEY contains invalid header characters".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::LazyTracer;

    #[test]
    fn test_bearer_token_format() {
        let token = bearer_token("sk-test").unwrap();
        assert_eq!(token.to_str().unwrap(), "Bearer sk-test");
    }

    fn local_config() -> ObservabilityConfig {
        ObservabilityConfig::new("sk-test", "support-bot").with_otlp_endpoint("http://localhost:4317")
    }

    fn local_provider() -> Result<SdkTracerProvider> {
        build_tracer_provider(&local_config())
    }

    #[test]
    fn test_build_outside_runtime_is_init_error() {
        let err = build_tracer_provider(&local_config()).unwrap_err();
        assert!(matches!(err, ObservabilityError::InitFailed(ref msg) if msg.contains("Tokio")));
    }

    #[test]
    fn test_lazy_tracer_outside_runtime_returns_error() {
        let tracer = LazyTracer::new(local_provider);

        assert!(matches!(tracer.get(), Err(ObservabilityError::InitFailed(_))));
        assert!(!tracer.is_initialized());
    }

    #[test]
    fn test_bearer_token_rejects_control_characters() {
        let err = bearer_token("sk-\ntest").unwrap_err();
        assert!(matches!(err, ObservabilityError::Config(_)));
    }
}
