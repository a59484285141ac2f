//! Captured failures
//!
//! A [`Failure`] holds the descriptive fields of whatever went wrong inside a
//! wizard step. It is built once at capture time and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Name given to failures converted from a panic payload
pub const PANIC_NAME: &str = "Panic";

/// Descriptive fields of a raw failure
///
/// Absent fields deserialize to empty strings, which no categorization rule
/// ever matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Failure {
    /// Failure kind (for example `NetworkError`, `TypeError`)
    #[serde(default)]
    pub name: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Backtrace or component stack, if one was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Rendered underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Failure {
    /// Create failure from a name and message
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    /// With stack
    #[inline]
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// With cause
    #[inline]
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Capture a Rust error value.
    ///
    /// The name is the unqualified type name of `E`, so a `client::NetworkError`
    /// is captured as `NetworkError`. The cause is the rendered `source()`.
    #[must_use]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self {
            name: short_type_name::<E>().to_string(),
            message: err.to_string(),
            stack: None,
            cause: err.source().map(ToString::to_string),
        }
    }

    /// Capture a panic payload as returned by `std::panic::catch_unwind`
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "step content panicked".to_string()
        };
        Self::new(PANIC_NAME, message)
    }

    /// Whether this failure was converted from a panic
    #[inline]
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.name == PANIC_NAME
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error,
{
    fn from(err: E) -> Self {
        Self::from_error(&err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.message.is_empty()) {
            (true, _) => write!(f, "{}", self.message),
            (false, true) => write!(f, "{}", self.name),
            (false, false) => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

/// Last path segment of a type name, generics stripped
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
