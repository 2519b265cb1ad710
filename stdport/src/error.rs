//! Error types for the stdport library.
//!
//! This module provides the error hierarchy shared by the path engine, the
//! JSON codec and the configuration layer, using `thiserror` for ergonomic
//! error handling.

use thiserror::Error;

use crate::json::DecodeError;

/// Result type alias for operations that may fail with a stdport error.
///
/// # Examples
///
/// ```
/// use stdport::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the stdport library.
///
/// The variants fall into three families: structural errors (`Decode`,
/// `Value`), type errors (`Type`), and filesystem errors surfaced by strict
/// path resolution (`Os`, `SymlinkLoop`, `NotADirectory`).
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed JSON input.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An argument had the wrong type, or arguments mixed text and bytes.
    #[error("{message}")]
    Type {
        /// Description of the type mismatch.
        message: String,
    },

    /// An argument had the right type but an unacceptable value.
    #[error("{message}")]
    Value {
        /// Description of the invalid value.
        message: String,
    },

    /// The encoder re-entered a container that is still being encoded.
    #[error("Circular reference detected")]
    CircularReference,

    /// Nesting exceeded the configured depth limit.
    #[error("maximum recursion depth exceeded (limit {limit})")]
    Recursion {
        /// The depth limit that was exceeded.
        limit: usize,
    },

    /// A symlink loop was detected during strict resolution.
    #[error("symlink loop detected: {path}")]
    SymlinkLoop {
        /// The symlink at which the loop was detected.
        path: String,
    },

    /// A non-final path component exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending component path.
        path: String,
    },

    /// A filesystem probe failed for a specific path.
    #[error("{path}: {source}")]
    Os {
        /// The path being probed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error on a reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A configuration value failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Builds a [`Error::Type`] from a message.
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Builds a [`Error::Value`] from a message.
    pub(crate) fn value_error(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
        }
    }

    /// Check if error indicates a path does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use stdport::Error;
    /// use std::io;
    ///
    /// let err = Error::Os {
    ///     path: "/nonexistent".to_string(),
    ///     source: io::Error::from(io::ErrorKind::NotFound),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Os { source, .. } | Self::Io(source) => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Check if error is a symlink loop.
    ///
    /// # Examples
    ///
    /// ```
    /// use stdport::Error;
    ///
    /// let err = Error::SymlinkLoop { path: "/tmp/a".to_string() };
    /// assert!(err.is_symlink_loop());
    /// ```
    #[must_use]
    pub fn is_symlink_loop(&self) -> bool {
        matches!(self, Self::SymlinkLoop { .. })
    }
}
