//! Attribute extraction
//!
//! An [`Extractor`] maps one call shape's input, output or error to a flat
//! [`Attributes`] set. Extractors are pure and stateless between calls: the
//! engine invokes them fresh for every phase of every invocation.

use std::any::type_name;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use crate::attributes::{
    Attributes, CODE_FUNCTION, ERROR_MESSAGE, ERROR_TYPE, SPYGLASS_DURATION_MS,
    SPYGLASS_FUNCTION_ARG_COUNT, SPYGLASS_FUNCTION_ARG_TYPES,
};

/// Facts about the invocation being traced.
#[derive(Debug, Clone, Copy)]
pub struct CallInfo<'a> {
    /// Span name of the invocation
    pub name: &'a str,
    /// Time spent in the wrapped call; zero during the request phase
    pub elapsed: Duration,
}

impl<'a> CallInfo<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            elapsed: Duration::ZERO,
        }
    }

    pub fn finished(self, elapsed: Duration) -> Self {
        Self { elapsed, ..self }
    }
}

/// Maps a call of input `I`, producing `T` or failing with `E`, to span
/// attributes.
///
/// Every phase defaults to no attributes. Implementations read only the
/// fields they declare and skip whatever is absent.
pub trait Extractor<I, T, E> {
    /// Attributes known before the call runs.
    fn request(&self, _call: &CallInfo<'_>, _input: &I) -> Attributes {
        Attributes::new()
    }

    /// Attributes from a successful result.
    fn success(&self, _call: &CallInfo<'_>, _output: &T) -> Attributes {
        Attributes::new()
    }

    /// Attributes from a failed call.
    fn error(&self, _call: &CallInfo<'_>, _error: &E) -> Attributes {
        Attributes::new()
    }
}

impl<I, T, E, X: Extractor<I, T, E> + ?Sized> Extractor<I, T, E> for &X {
    fn request(&self, call: &CallInfo<'_>, input: &I) -> Attributes {
        (**self).request(call, input)
    }

    fn success(&self, call: &CallInfo<'_>, output: &T) -> Attributes {
        (**self).success(call, output)
    }

    fn error(&self, call: &CallInfo<'_>, error: &E) -> Attributes {
        (**self).error(call, error)
    }
}

/// Run one extraction phase, absorbing a panic into an empty attribute set.
pub fn guarded<F>(phase: &'static str, extract: F) -> Attributes
where
    F: FnOnce() -> Attributes,
{
    match catch_unwind(AssertUnwindSafe(extract)) {
        Ok(attributes) => attributes,
        Err(_) => {
            tracing::warn!(phase, "Attribute extraction panicked; attributes dropped");
            Attributes::new()
        }
    }
}

/// Last path segment of a type name, without generic arguments.
///
/// `core::num::error::ParseIntError` becomes `ParseIntError`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    short_name(type_name::<T>())
}

/// Last `::` segment outside any generic argument list, with its own
/// arguments removed. `Meter<i32>::read` becomes `read`.
pub(crate) fn short_name(full: &'static str) -> &'static str {
    let bytes = full.as_bytes();
    let mut depth = 0usize;
    let mut start = 0;
    let mut end = None;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                if depth == 0 && end.is_none() {
                    end = Some(i);
                }
                depth += 1;
            }
            // `->` in fn pointer types
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                start = i + 2;
                end = None;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    &full[start..end.unwrap_or(full.len())]
}

/// Shape of a tuple of call arguments.
///
/// Only the arity and the Rust type names are exposed; values never are.
pub trait Arguments {
    fn type_names(&self) -> Vec<&'static str>;

    fn arity(&self) -> usize {
        self.type_names().len()
    }
}

/// Default extractor for plain functions.
///
/// Records the invocation name and duration, plus the error class and
/// message on failure. Argument shape is recorded only when enabled with
/// [`FunctionExtractor::with_arguments`]; argument values never are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionExtractor {
    capture_arguments: bool,
}

impl FunctionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record argument count and types.
    pub fn with_arguments() -> Self {
        Self {
            capture_arguments: true,
        }
    }

    pub fn captures_arguments(&self) -> bool {
        self.capture_arguments
    }
}

impl<I: Arguments, T, E: Display> Extractor<I, T, E> for FunctionExtractor {
    fn request(&self, call: &CallInfo<'_>, input: &I) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(CODE_FUNCTION, call.name.to_string());

        if self.capture_arguments {
            attrs
                .insert_count(SPYGLASS_FUNCTION_ARG_COUNT, input.arity())
                .insert(SPYGLASS_FUNCTION_ARG_TYPES, input.type_names().join(","));
        }

        attrs
    }

    fn success(&self, call: &CallInfo<'_>, _output: &T) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert_count(SPYGLASS_DURATION_MS, call.elapsed.as_millis());
        attrs
    }

    fn error(&self, call: &CallInfo<'_>, error: &E) -> Attributes {
        let mut attrs = Attributes::new();
        attrs
            .insert_count(SPYGLASS_DURATION_MS, call.elapsed.as_millis())
            .insert(ERROR_TYPE, short_type_name::<E>())
            .insert(ERROR_MESSAGE, error.to_string());
        attrs
    }
}
