//! Error types for wrapping and binding.
//!
//! Only setup can fail here. Errors from the wrapped call itself are never
//! converted into these types; they are returned to the caller unchanged.

use spyglass_observability::ObservabilityError;
use thiserror::Error;

/// A client does not expose the entry point an instrumentation expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("{client} has no entry point '{path}'")]
    MissingEntryPoint { client: String, path: String },
}

/// Errors raised when wrapping a callable or a client.
#[derive(Error, Debug)]
pub enum SpyglassError {
    /// Tracer setup failed (missing configuration, exporter build failure)
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    /// The client shape does not match the binding
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),
}

/// Result type for wrapping operations.
pub type Result<T> = std::result::Result<T, SpyglassError>;
