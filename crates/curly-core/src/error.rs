//! Error types for linting operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the linter
#[derive(Debug, Error)]
pub enum CurlyError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pass was cancelled through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Cancelled,
}

impl CurlyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurlyError::ConfigError { .. } => ErrorKind::Config,
            CurlyError::IoError { .. } => ErrorKind::Io,
            CurlyError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether a run should carry on with the remaining files
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Io
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> CurlyError {
        CurlyError::io_error(
            "Missing.cs",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CurlyError::config_error("x").kind(), ErrorKind::Config);
        assert_eq!(missing().kind(), ErrorKind::Io);
        assert_eq!(CurlyError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_recoverability() {
        assert!(missing().is_recoverable());
        assert!(!CurlyError::config_error("x").is_recoverable());
        assert!(!CurlyError::Cancelled.is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            missing().to_string(),
            "IO error for path 'Missing.cs': gone"
        );
        assert_eq!(
            CurlyError::config_error("bad glob").to_string(),
            "Configuration error: bad glob"
        );
    }
}
