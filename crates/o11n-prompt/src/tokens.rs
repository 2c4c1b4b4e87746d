//! Token counter boundary
//!
//! Counting is advisory: callers go through [`estimate_tokens`], which turns
//! every failure into "no count" so nothing waits on a broken counter.

use crate::error::TokenCountError;
use async_trait::async_trait;
use std::path::Path;

/// Counts tokens for display next to files and prompts
#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in `text`
    async fn count(&self, text: &str) -> Result<usize, TokenCountError>;

    /// Count the tokens in the file at `path`
    async fn count_path(&self, path: &Path) -> Result<usize, TokenCountError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TokenCountError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        self.count(&text).await
    }
}

/// Character-ratio estimate, about four characters per token
#[derive(Debug, Clone, Copy)]
pub struct ApproxTokenCounter {
    chars_per_token: usize,
}

impl ApproxTokenCounter {
    /// Counter with a custom ratio; a ratio of zero is treated as one
    #[inline]
    #[must_use]
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Estimate synchronously
    #[must_use]
    pub fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

impl Default for ApproxTokenCounter {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl TokenCounter for ApproxTokenCounter {
    async fn count(&self, text: &str) -> Result<usize, TokenCountError> {
        Ok(self.estimate(text))
    }
}

/// Count tokens, logging any failure and returning `None`
pub async fn estimate_tokens(counter: &dyn TokenCounter, text: &str) -> Option<usize> {
    match counter.count(text).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "token count unavailable");
            None
        }
    }
}

/// Count tokens for a file, logging any failure and returning `None`
pub async fn estimate_path_tokens(counter: &dyn TokenCounter, path: &Path) -> Option<usize> {
    match counter.count_path(path).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token count unavailable");
            None
        }
    }
}
