//! Parsed plan document model
//!
//! Everything here is derived from the raw plan text and read-only; a new
//! text means a new [`PlanDocument`].

use crate::grammar::{self, CONTENT_MARKER, SEARCH_MARKER};
use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action directive declared in a file preamble (`### Action <verb>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create a new file from the `**Content**:` payload
    Create,
    /// Search/replace edits on an existing file
    Modify,
    /// Replace the whole file
    Rewrite,
    /// Remove the file
    Delete,
    /// Any verb the protocol does not name
    Other(String),
}

impl Action {
    /// Interpret an action verb; matching is case-sensitive
    #[must_use]
    pub fn from_verb(verb: &str) -> Self {
        match verb {
            "create" => Self::Create,
            "modify" => Self::Modify,
            "rewrite" => Self::Rewrite,
            "delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    /// The verb as written in the plan
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Rewrite => "rewrite",
            Self::Delete => "delete",
            Self::Other(verb) => verb,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently acceptable edit inside a file entry
///
/// The text runs from its `#### Change` line up to the next change marker or
/// the end of the file segment, line terminators included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    /// Verbatim text of the change
    pub text: String,
    /// Trimmed `**Description**:` values, possibly empty
    pub descriptions: Vec<String>,
}

impl ChangeBlock {
    /// First description, if the change carries one
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }

    /// Inner text of the fenced block after `**Search**:`
    #[must_use]
    pub fn search(&self) -> Option<String> {
        grammar::fenced_after(&self.text, SEARCH_MARKER)
    }

    /// Inner text of the fenced block after `**Content**:`
    #[must_use]
    pub fn content(&self) -> Option<String> {
        grammar::fenced_after(&self.text, CONTENT_MARKER)
    }

    /// Diff-style rendering for review
    ///
    /// Search lines are prefixed `- ` and content lines `+ `. A change without
    /// a content fence renders as its trimmed raw text.
    #[must_use]
    pub fn preview(&self) -> String {
        let diff_lines = |text: &str, sign: &str| -> Vec<String> {
            text.trim_end()
                .split('\n')
                .map(|line| format!("{sign} {line}"))
                .collect()
        };

        match (self.search(), self.content()) {
            (Some(search), Some(content)) => {
                let mut lines = diff_lines(&search, "-");
                lines.extend(diff_lines(&content, "+"));
                lines.join("\n")
            }
            (None, Some(content)) => diff_lines(&content, "+").join("\n"),
            _ => self.text.trim().to_string(),
        }
    }
}

/// A `### File` entry of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeBlock {
    /// Path named by the `### File` marker, trimmed and non-empty
    pub file_path: String,
    /// Text between the marker line and the first change
    pub preamble: String,
    /// Change blocks in document order
    pub changes: Vec<ChangeBlock>,
    /// Action directive found in the preamble
    pub action: Option<Action>,
    /// Initial content for `create` entries with a `**Content**:` fence
    pub creation_content: Option<String>,
}

impl FileChangeBlock {
    /// Whether the preamble declares `### Action create`
    #[inline]
    #[must_use]
    pub fn is_creation(&self) -> bool {
        matches!(self.action, Some(Action::Create))
    }

    /// Last path segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.file_path)
    }
}

/// A parsed plan document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// The raw plan text
    pub source: String,
    /// Hash of `source`; selections are bound to it
    pub hash: ContentHash,
    /// Verbatim text before the first `### File` marker
    pub header: String,
    /// Trimmed text between `# Plan` and `## Files`
    pub description: String,
    /// File entries in document order, unique by path
    pub files: Vec<FileChangeBlock>,
    /// Paths whose repeated `### File` blocks were discarded
    pub duplicates: Vec<String>,
}

impl PlanDocument {
    /// Parse plan text; never fails
    #[inline]
    #[must_use]
    pub fn parse(text: &str) -> Self {
        crate::parser::parse(text)
    }

    /// Whether the document has no file entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up a file entry by path
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileChangeBlock> {
        self.files.iter().find(|f| f.file_path == path)
    }

    /// Total number of change blocks across all files
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.files.iter().map(|f| f.changes.len()).sum()
    }

    /// Serializable overview of the plan for previews
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            description: self.description.clone(),
            files: self
                .files
                .iter()
                .map(|f| FileSummary {
                    path: f.file_path.clone(),
                    action: f.action.clone(),
                    change_count: f.changes.len(),
                    descriptions: f
                        .changes
                        .iter()
                        .map(|c| c.description().unwrap_or_default().to_string())
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Overview of a plan: description plus one line per change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan description
    pub description: String,
    /// Per-file overview in document order
    pub files: Vec<FileSummary>,
}

/// Per-file part of a [`PlanSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// File path
    pub path: String,
    /// Declared action
    pub action: Option<Action>,
    /// Number of change blocks
    pub change_count: usize,
    /// First description of each change, empty when missing
    pub descriptions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(text: &str) -> ChangeBlock {
        ChangeBlock {
            text: text.to_string(),
            descriptions: Vec::new(),
        }
    }

    #[test]
    fn action_from_verb() {
        assert_eq!(Action::from_verb("create"), Action::Create);
        assert_eq!(Action::from_verb("delete"), Action::Delete);
        assert_eq!(Action::from_verb("Create"), Action::Other("Create".into()));
        assert_eq!(Action::from_verb("rename").to_string(), "rename");
    }

    #[test]
    fn preview_search_and_content() {
        let block = change(
            "#### Change\n**Search**:\n```rs\nlet a = 1;\n```\n**Content**:\n```rs\nlet a = 2;\nlet b = 3;\n```\n",
        );
        assert_eq!(block.preview(), "- let a = 1;\n+ let a = 2;\n+ let b = 3;");
    }

    #[test]
    fn preview_content_only() {
        let block = change("#### Change\n**Content**:\n```\nhello\n```\n");
        assert_eq!(block.preview(), "+ hello");
    }

    #[test]
    fn preview_falls_back_to_raw_text() {
        let block = change("#### Change\n**Description**: nothing fenced\n\n");
        assert_eq!(block.preview(), "#### Change\n**Description**: nothing fenced");
    }

    #[test]
    fn file_name_is_last_segment() {
        let file = FileChangeBlock {
            file_path: "src/util/io.rs".into(),
            preamble: String::new(),
            changes: Vec::new(),
            action: None,
            creation_content: None,
        };
        assert_eq!(file.file_name(), "io.rs");
    }
}
