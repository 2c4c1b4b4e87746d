//! Error types for prompt assembly and token counting

use o11n_plan::HashError;
use std::path::PathBuf;

/// Errors raised while assembling a prompt
///
/// Unreadable files never fail a build; they become inline placeholders.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The request could not be hashed into a cache key
    #[error("failed to hash prompt request: {0}")]
    CacheKey(#[from] HashError),
}

/// Errors raised by a token counter
#[derive(Debug, thiserror::Error)]
pub enum TokenCountError {
    /// The file to count could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The counting backend failed
    #[error("token counter failed: {0}")]
    Backend(String),
}

impl TokenCountError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
