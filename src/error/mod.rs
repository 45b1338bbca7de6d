//! Centralized error handling
//! Defines the error type reported by the outer surfaces of the engine
//! (byte buffer modification, configuration, document carets).
//!
//! Consistency conditions inside the chunk tree, line registry and fixup are
//! invariants and assert instead of returning one of these.

use std::fmt;

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// File system or I/O errors
    Io,
    /// Malformed configuration input
    Parse,
    /// Configuration values that fail validation
    Settings,
    /// Offsets or ranges outside the text, or out of order
    Range,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "IO"),
            Self::Parse => write!(f, "Parse"),
            Self::Settings => write!(f, "Settings"),
            Self::Range => write!(f, "Range"),
        }
    }
}

/// A structured error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}({code}): {message}")]
pub struct RiftError {
    /// What kind of error occurred
    pub kind: ErrorType,
    /// Machine-readable error code (see `constants::error_types`)
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl RiftError {
    pub fn new(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a range error with the given code
    pub fn range(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorType::Range, code, message)
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl From<std::io::Error> for RiftError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorType::Io, "IO_ERROR", err.to_string())
    }
}

impl From<serde_json::Error> for RiftError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            ErrorType::Parse,
            crate::constants::error_types::CONFIG_PARSE,
            err.to_string(),
        )
    }
}

/// Result alias for fallible operations
pub type Result<T> = std::result::Result<T, RiftError>;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
