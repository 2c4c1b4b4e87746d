//! Session configuration
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! prompt_cache_ttl_ms = 2000
//! failure_display_ms = 3000
//!
//! [executor]
//! command = "o11n-apply"
//! args = ["--root", "."]
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// o11n configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct O11nConfig {
    /// How long an assembled prompt is reused, in milliseconds
    pub prompt_cache_ttl_ms: u64,
    /// Maximum number of cached prompts
    pub prompt_cache_capacity: u64,
    /// How long a commit failure stays visible, in milliseconds
    pub failure_display_ms: u64,
    /// Emit the file map section
    pub include_file_tree: bool,
    /// Emit the plan grammar outside talk mode
    pub include_formatting_instructions: bool,
    /// External apply executor
    pub executor: ExecutorConfig,
}

impl O11nConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML for this schema
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Prompt cache time-to-live
    #[inline]
    #[must_use]
    pub fn prompt_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.prompt_cache_ttl_ms)
    }

    /// How long a failed commit reads as failed
    #[inline]
    #[must_use]
    pub fn failure_display(&self) -> Duration {
        Duration::from_millis(self.failure_display_ms)
    }

    /// With prompt cache TTL
    #[inline]
    #[must_use]
    pub fn with_prompt_cache_ttl(mut self, ttl: Duration) -> Self {
        self.prompt_cache_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With failure display window
    #[inline]
    #[must_use]
    pub fn with_failure_display(mut self, window: Duration) -> Self {
        self.failure_display_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With or without the file map
    #[inline]
    #[must_use]
    pub fn with_file_tree(mut self, include: bool) -> Self {
        self.include_file_tree = include;
        self
    }

    /// With or without formatting instructions
    #[inline]
    #[must_use]
    pub fn with_formatting_instructions(mut self, include: bool) -> Self {
        self.include_formatting_instructions = include;
        self
    }

    /// With executor command
    #[inline]
    #[must_use]
    pub fn with_executor(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.executor = ExecutorConfig {
            command: Some(command.into()),
            args,
        };
        self
    }
}

impl Default for O11nConfig {
    fn default() -> Self {
        Self {
            prompt_cache_ttl_ms: 2000,
            prompt_cache_capacity: 64,
            failure_display_ms: 3000,
            include_file_tree: true,
            include_formatting_instructions: true,
            executor: ExecutorConfig::default(),
        }
    }
}

/// Command that receives the plan payload on stdin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Program to run
    pub command: Option<String>,
    /// Arguments passed to the program
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = O11nConfig::default();
        assert_eq!(config.prompt_cache_ttl(), Duration::from_secs(2));
        assert_eq!(config.failure_display(), Duration::from_secs(3));
        assert!(config.include_file_tree);
        assert!(config.executor.command.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = O11nConfig::from_toml_str(
            "failure_display_ms = 500\n[executor]\ncommand = \"apply\"\n",
        )
        .unwrap();
        assert_eq!(config.failure_display_ms, 500);
        assert_eq!(config.prompt_cache_capacity, 64);
        assert_eq!(config.executor.command.as_deref(), Some("apply"));
        assert!(config.executor.args.is_empty());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = O11nConfig::from_toml_str("failure_display_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("o11n.toml");
        std::fs::write(&path, "include_file_tree = false\n").unwrap();
        assert!(!O11nConfig::load(&path).unwrap().include_file_tree);

        let missing = O11nConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[test]
    fn builders() {
        let config = O11nConfig::new()
            .with_prompt_cache_ttl(Duration::from_millis(10))
            .with_failure_display(Duration::from_secs(1))
            .with_executor("apply", vec!["-v".into()]);
        assert_eq!(config.prompt_cache_ttl_ms, 10);
        assert_eq!(config.failure_display_ms, 1000);
        assert_eq!(config.executor.args, vec!["-v".to_string()]);
    }
}
