//! spyglass_core - transparent span wrapping for functions and client calls.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► Traced<F, X> ──► in_span / in_span_async ──► F
//!                                  │
//!                 ┌────────────────┼─────────────────┐
//!                 ▼                ▼                 ▼
//!            Extractor        ActiveSpan       TracerSource
//!         (request/success/   (open, close     (global lazy
//!           error attrs)       exactly once)    or injected)
//! ```
//!
//! ## Usage
//!
//! The process-wide tracer exports over gRPC, so the first `trace` call must
//! run inside a Tokio runtime. Outside one it returns an error.
//!
//! ```rust,no_run
//! use spyglass_core::{TraceOptions, trace, trace_with};
//!
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! fn parse(input: &str) -> Result<i32, std::num::ParseIntError> {
//!     input.parse()
//! }
//!
//! let add = trace(add)?;
//! assert_eq!(add.call((2, 3)), 5);
//!
//! let parse = trace_with(parse, TraceOptions::new().name("parse.port"))?;
//! assert!(parse.try_call(("80",)).is_ok());
//! # Ok::<(), spyglass_core::SpyglassError>(())
//! ```

pub mod attributes;
pub mod binding;
pub mod callable;
pub mod engine;
pub mod error;
pub mod extract;
mod span;

// Re-export core abstractions
pub use attributes::Attributes;
pub use binding::Binding;
pub use callable::Callable;
pub use engine::{
    Instrumentor, SpanSpec, TraceOptions, Traced, in_span, in_span_async, trace, trace_with,
};
pub use error::{BindingError, Result, SpyglassError};
pub use extract::{Arguments, CallInfo, Extractor, FunctionExtractor, guarded, short_type_name};

// Tracer access for callers that only depend on this crate
pub use spyglass_observability::{GlobalTracer, TracerSource};
