//! Error types shared by the dispatcher, the device-state buffers and the window.

use std::fmt;

/// An error reported by the native windowing library.
///
/// The platform buffers the last error it raised; it is surfaced to the native call
/// that triggered it (see [`crate::native::with`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Library-specific error code (`-1` when the library only reports text).
    pub code: i32,
    /// Human readable description.
    pub description: String,
}

impl NativeError {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Error with no numeric code, as reported by string-only libraries.
    pub fn message(description: impl Into<String>) -> Self {
        Self::new(-1, description)
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)
    }
}

impl std::error::Error for NativeError {}

/// Errors raised by windowing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowingError {
    #[error("native error {0}")]
    Native(#[from] NativeError),

    #[error("thread affinity violation: {0}")]
    ThreadAffinity(String),

    #[error("index {index} is out of range (len: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} has been disposed")]
    Disposed(&'static str),

    #[error("dispatcher thread has terminated")]
    DispatcherTerminated,

    #[error("failed to spawn dispatcher thread: {0}")]
    Spawn(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for windowing operations.
pub type Result<T> = std::result::Result<T, WindowingError>;
