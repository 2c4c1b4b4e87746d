//! Core types for o11n
//!
//! Defines the records a session keeps:
//! - files selected for context
//! - project roots known to the directory listing
//! - custom prompt templates
//! - the interaction mode

use o11n_plan::CreatedFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Folder label for paths without a directory component
pub const ROOT_FOLDER: &str = "Root";

/// Last non-empty `/` segment of `path`
fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// Format a size given in megabytes as bytes, KB or MB
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_file_size(megabytes: f64) -> String {
    if megabytes < 1.0 / 1024.0 {
        let bytes = (megabytes * BYTES_PER_MEGABYTE).floor() as u64;
        format!("{bytes} bytes")
    } else if megabytes < 1.0 {
        format!("{:.2} KB", megabytes * 1024.0)
    } else {
        format!("{megabytes:.2} MB")
    }
}

/// A file selected for inclusion in the prompt
///
/// Unique by `path` within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Absolute or project-relative path
    pub path: String,
    /// Size in megabytes, when known
    pub size: Option<f64>,
    /// Token count, attached after selection
    pub token_size: Option<usize>,
    /// Root of the project the file belongs to
    pub project_root: Option<String>,
}

impl FileNode {
    /// Node for `path`, identified by its path and named by its last segment
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_segment(&path).unwrap_or(&path).to_string();
        Self {
            id: path.clone(),
            name,
            path,
            size: None,
            token_size: None,
            project_root: None,
        }
    }

    /// With size in megabytes
    #[inline]
    #[must_use]
    pub fn with_size(mut self, megabytes: f64) -> Self {
        self.size = Some(megabytes);
        self
    }

    /// With owning project root
    #[inline]
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<String>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Human-readable size, if known
    #[must_use]
    pub fn display_size(&self) -> Option<String> {
        self.size.map(format_file_size)
    }

    /// Directory part of the path, or [`ROOT_FOLDER`]
    #[must_use]
    pub fn folder(&self) -> &str {
        self.path
            .rfind('/')
            .map_or(ROOT_FOLDER, |slash| &self.path[..slash])
    }
}

impl From<CreatedFile> for FileNode {
    fn from(file: CreatedFile) -> Self {
        Self {
            id: file.path.clone(),
            name: file.file_name().to_string(),
            size: Some(file.size_in_megabytes()),
            path: file.path,
            token_size: None,
            project_root: None,
        }
    }
}

/// A project root from the directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoot {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Root path
    pub path: String,
    /// Whether the cached listing is current; cleared after a commit
    pub loaded_children: bool,
}

impl ProjectRoot {
    /// Root at `path` with a listing not yet loaded
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_segment(&path).unwrap_or(&path).to_string();
        Self {
            id: path.clone(),
            name,
            path,
            loaded_children: false,
        }
    }

    /// With the listing marked loaded or stale
    #[inline]
    #[must_use]
    pub fn with_loaded_children(mut self, loaded: bool) -> Self {
        self.loaded_children = loaded;
        self
    }
}

/// A user template embedded in the prompt while active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTemplate {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// File holding the template text
    pub path: String,
    /// Whether the template is embedded
    pub active: bool,
}

impl CustomTemplate {
    /// Active template named after the last segment of `path`
    #[must_use]
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_segment(&path).unwrap_or("Template").to_string();
        Self {
            id: id.into(),
            name,
            path,
            active: true,
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Interaction mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free conversation; no plan grammar requested
    Talk,
    /// Ask for a plan and review it
    #[default]
    Plan,
    /// Apply changes directly
    Do,
}

impl Mode {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Talk => "talk",
            Mode::Plan => "plan",
            Mode::Do => "do",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0} (expected talk, plan or do)")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "talk" => Ok(Mode::Talk),
            "plan" => Ok(Mode::Plan),
            "do" => Ok(Mode::Do),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
