//! Error types for the bytepair crates.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for training, encoding and model persistence.
#[derive(Error, Debug)]
pub enum BpeError {
    /// Rejected before any training step runs
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Error loading a model file
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a model file
    #[error("Save error: {0}")]
    Save(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Symbol id outside the vocabulary
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Merge list or vocabulary entry that breaks the merge tree
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),
}

impl BpeError {
    /// Wrap an I/O error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }

    /// Whether this error was raised by configuration validation.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

/// Result type alias for bytepair operations.
pub type Result<T> = std::result::Result<T, BpeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = BpeError::io(
            "corpus.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("corpus.txt"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_invalid_configuration_predicate() {
        assert!(BpeError::InvalidConfiguration("x".into()).is_invalid_configuration());
        assert!(!BpeError::UnknownTokenId(7).is_invalid_configuration());
    }
}
