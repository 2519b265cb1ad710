//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use std::fmt;
use stdport::Error as LibError;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Configuration error.
    Config(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Malformed JSON input
    /// - 2: Usage error (reported by clap)
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => match lib_err {
                LibError::Decode(_) => 1,
                LibError::Type { .. } | LibError::Value { .. } => 4,
                LibError::Io(_) | LibError::Os { .. } => 5,
                LibError::Configuration(_) | LibError::Validation { .. } => 7,
                _ => 6,
            },
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        match e {
            LibError::Io(io) => CliError::Io(io),
            other => CliError::Library(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let decode = stdport::json::loads("[").unwrap_err();
        assert_eq!(CliError::from(decode).exit_code(), 1);

        let mixed = stdport::path::posix::commonpath(["/a", "b"]).unwrap_err();
        assert_eq!(CliError::from(mixed).exit_code(), 4);

        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(CliError::from(LibError::Io(io)).exit_code(), 5);

        assert_eq!(
            CliError::from(LibError::CircularReference).exit_code(),
            6
        );
        assert_eq!(CliError::Config("bad".into()).exit_code(), 7);
        assert_eq!(CliError::InvalidArguments("x".into()).exit_code(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CliError::InvalidArguments("no paths".into()).to_string(),
            "Invalid arguments: no paths"
        );
        let decode = stdport::json::loads("{\"a\": 1,}").unwrap_err();
        assert_eq!(
            CliError::from(decode).to_string(),
            "Illegal trailing comma before end of object: line 1 column 8 (char 7)"
        );
    }
}
