//! Spyglass Observability - tracer bootstrap and OTLP export for Spyglass instrumentation
//!
//! This crate owns the process-wide OpenTelemetry state that the wrapping
//! engine in `spyglass_core` draws its tracer from.
//!
//! # Features
//!
//! - Resource identity derived from a single deployment identifier
//! - Lazy, exactly-once tracer initialization with no teardown
//! - OTLP/gRPC export with gzip and bearer-token authentication
//! - Console logging integration
//!
//! # Quick Start
//!
//! ```no_run
//! use spyglass_observability::{ObservabilityConfig, init};
//!
//! # fn main() -> Result<(), spyglass_observability::ObservabilityError> {
//! let config = ObservabilityConfig::new("sk-live-...", "support-bot")
//!     .with_log_level("info");
//!
//! init(config)?;
//!
//! // Or initialize from environment variables
//! // spyglass_observability::init_from_env()?;
//!
//! tracing::info!("Service started");
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `SPYGLASS_API_KEY` - API key (required)
//! - `SPYGLASS_DEPLOYMENT_ID` - Deployment identifier, used as service name (required)
//! - `SPYGLASS_OTLP_ENDPOINT` or `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint override
//! - `SPYGLASS_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracer;

pub use config::{ObservabilityConfig, ResourceDescriptor};
pub use error::{ObservabilityError, Result};
pub use telemetry::{build_tracer_provider, init, init_from_env};
pub use tracer::{GLOBAL_TRACER, GlobalTracer, LazyTracer, TRACER_NAME, TracerSource, get_tracer};
