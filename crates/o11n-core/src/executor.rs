//! Apply executor boundary
//!
//! The executor performs the actual file writes for a filtered plan payload.
//! Its report is stored for display; the commit pipeline only cares whether
//! the call succeeded.

use crate::error::ExecutorError;
use serde::{Deserialize, Serialize};

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// File path
    pub path: String,
    /// Messages from the executor
    #[serde(default)]
    pub messages: Vec<String>,
}

impl FileReport {
    /// Report for `path` with one message
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            messages: vec![message.into()],
        }
    }
}

/// Per-file results of an apply call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Files written
    #[serde(default)]
    pub success: Vec<FileReport>,
    /// Files that failed
    #[serde(default)]
    pub errors: Vec<FileReport>,
}

impl ApplyReport {
    /// Decode a JSON report
    ///
    /// # Errors
    /// Returns an error if `text` is not a valid report
    pub fn from_json(text: &str) -> Result<Self, ExecutorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether no file reported an error
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies a plan payload to the file system
#[async_trait::async_trait]
pub trait ApplyExecutor: Send + Sync {
    /// Apply `payload`, a plan in protocol grammar
    async fn apply(&self, payload: &str) -> Result<ApplyReport, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_executor_json() {
        let report = ApplyReport::from_json(
            r#"{"success":[{"path":"a.rs","messages":["modified"]}],"errors":[{"path":"b.rs","messages":["search not found"]}]}"#,
        )
        .unwrap();
        assert_eq!(report.success, vec![FileReport::new("a.rs", "modified")]);
        assert!(!report.is_clean());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let report = ApplyReport::from_json("{}").unwrap();
        assert!(report.is_clean());
        assert!(report.success.is_empty());
    }

    #[test]
    fn garbage_is_invalid_report() {
        assert!(matches!(
            ApplyReport::from_json("not json"),
            Err(ExecutorError::InvalidReport(_))
        ));
    }
}
