//! Error types for observability crate

use thiserror::Error;

/// Errors that can occur during observability initialization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservabilityError {
    /// Failed to initialize OpenTelemetry
    #[error("Failed to initialize observability: {0}")]
    InitFailed(String),

    /// Configuration error (missing or empty environment variables)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Flushing buffered spans to the exporter failed
    #[error("Failed to export spans: {0}")]
    Export(String),
}

/// Result type for observability operations.
pub type Result<T> = std::result::Result<T, ObservabilityError>;
