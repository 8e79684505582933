//! Error types for backing data sources.

use std::path::PathBuf;

/// Errors that can occur when reading from a backing source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("source '{provider}' unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    /// The requested item does not exist in the source.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The source content could not be parsed.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl SourceError {
    /// Creates a new unavailable error.
    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
