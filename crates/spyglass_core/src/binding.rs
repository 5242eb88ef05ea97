//! Entry point bindings for client proxies.

use crate::error::BindingError;

/// A named entry point a proxy instruments, such as
/// `chat.completions.create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    path: &'static str,
}

impl Binding {
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Whether `available` lists this entry point.
    pub fn is_exposed(&self, available: &[&str]) -> bool {
        available.iter().any(|entry| *entry == self.path)
    }

    /// Check that `client` exposes this entry point.
    pub fn resolve(&self, client: &str, available: &[&str]) -> Result<(), BindingError> {
        if self.is_exposed(available) {
            Ok(())
        } else {
            Err(BindingError::MissingEntryPoint {
                client: client.to_string(),
                path: self.path.to_string(),
            })
        }
    }
}
