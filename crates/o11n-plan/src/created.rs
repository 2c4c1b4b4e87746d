//! New-file detection
//!
//! Runs over the original plan, independent of selections: a file is
//! reported when its preamble says `### Action create` and a fenced block
//! follows its `**Content**:` marker.

use crate::document::PlanDocument;
use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// A file the plan creates, with its initial content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedFile {
    /// Path from the `### File` marker
    pub path: String,
    /// Inner text of the content fence
    pub content: String,
}

impl CreatedFile {
    /// UTF-8 size of the content in megabytes
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_in_megabytes(&self) -> f64 {
        self.content.len() as f64 / BYTES_PER_MEGABYTE
    }

    /// Last path segment, or `New File` when the path has none
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "New File",
        }
    }
}

/// Files created by `document`, in document order
#[must_use]
pub fn created_files(document: &PlanDocument) -> Vec<CreatedFile> {
    document
        .files
        .iter()
        .filter(|file| file.is_creation())
        .filter_map(|file| {
            file.creation_content.as_ref().map(|content| CreatedFile {
                path: file.file_path.clone(),
                content: content.clone(),
            })
        })
        .collect()
}
