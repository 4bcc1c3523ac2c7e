//! Error types for mushaf.
//!
//! Library crates use [`MushafError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all mushaf operations.
#[derive(Debug, thiserror::Error)]
pub enum MushafError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during page scrape or audio fetch.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or source-line parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Relational input (sqlite) error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing inputs, malformed artifact, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MushafError>;

impl MushafError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is local storage exhaustion.
    ///
    /// This is the one filesystem failure the pipeline is not allowed to
    /// swallow: retrying or continuing cannot help once the disk is full.
    pub fn is_storage_full(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::StorageFull
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MushafError::config("missing data directory");
        assert_eq!(err.to_string(), "config error: missing data directory");

        let err = MushafError::validation("no translation folders found");
        assert!(err.to_string().contains("no translation folders"));
    }

    #[test]
    fn storage_full_detection() {
        let full = MushafError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
        );
        assert!(full.is_storage_full());

        let other = MushafError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!other.is_storage_full());
    }
}
