//! Error types for o11n core
//!
//! Provides error handling for:
//! - configuration loading
//! - apply executor failures
//! - commit guard violations

use o11n_plan::FilterError;
use o11n_prompt::{PromptError, TokenCountError};
use std::path::PathBuf;

/// Main o11n error type
#[derive(Debug, thiserror::Error)]
pub enum O11nError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Commit failed or was refused
    #[error("commit failed: {0}")]
    Commit(#[from] CommitError),

    /// Prompt could not be assembled
    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),

    /// Plan filtering failed
    #[error("filter failed: {0}")]
    Filter(#[from] FilterError),

    /// Token counting failed
    #[error("token count failed: {0}")]
    TokenCount(#[from] TokenCountError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is invalid
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Apply executor errors
///
/// The message of a rejection is shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The executor ran and refused the payload
    #[error("{0}")]
    Rejected(String),

    /// The executor could not be started or reached
    #[error("executor unavailable: {0}")]
    Unavailable(String),

    /// The executor's report could not be decoded
    #[error("invalid executor report: {0}")]
    InvalidReport(#[from] serde_json::Error),

    /// I/O while talking to the executor
    #[error("executor I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    /// Create a rejection error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Commit pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The plan lacks the markers a commit needs
    #[error("plan is not committable: it needs `# Plan`, `### File` and `### Action` markers")]
    InvalidPlan,

    /// Another commit is in flight
    #[error("a commit is already in progress")]
    AlreadyCommitting,

    /// The executor failed; the plan is kept for retry
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl CommitError {
    /// Whether retrying the same plan later can succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AlreadyCommitting | Self::Executor(_))
    }
}
