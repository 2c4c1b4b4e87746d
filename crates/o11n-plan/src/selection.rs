//! Per-change acceptance state
//!
//! Selections are opt-out: every change starts accepted. A map is seeded from
//! one parse and carries that document's hash, so it can never be applied to
//! a different plan text.

use crate::document::PlanDocument;
use crate::hash::ContentHash;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Acceptance flags per file, index-aligned with each file's changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMap {
    plan_hash: Option<ContentHash>,
    entries: IndexMap<String, Vec<bool>>,
}

impl SelectionMap {
    /// Fresh map for `document`: every change of every file accepted
    #[must_use]
    pub fn init(document: &PlanDocument) -> Self {
        let entries = document
            .files
            .iter()
            .map(|file| (file.file_path.clone(), vec![true; file.changes.len()]))
            .collect();
        Self {
            plan_hash: Some(document.hash),
            entries,
        }
    }

    /// Hash of the document this map was seeded from
    ///
    /// `None` for an unbound map, which selects everything.
    #[inline]
    #[must_use]
    pub fn plan_hash(&self) -> Option<ContentHash> {
        self.plan_hash
    }

    /// Whether this map may be applied to `document`
    #[must_use]
    pub fn applies_to(&self, document: &PlanDocument) -> bool {
        self.plan_hash.map_or(true, |hash| hash == document.hash)
    }

    /// Flip one change; unknown paths and out-of-range indices are ignored
    ///
    /// Returns the new value when a flag was flipped.
    pub fn toggle(&mut self, path: &str, index: usize) -> Option<bool> {
        let flag = self.entries.get_mut(path)?.get_mut(index)?;
        *flag = !*flag;
        tracing::trace!(path, index, selected = *flag, "toggled change");
        Some(*flag)
    }

    /// Set every change of a file to the complement of "all accepted"
    pub fn toggle_all(&mut self, path: &str) {
        if let Some(flags) = self.entries.get_mut(path) {
            let all_selected = flags.iter().all(|&flag| flag);
            flags.iter_mut().for_each(|flag| *flag = !all_selected);
            tracing::trace!(path, selected = !all_selected, "toggled file");
        }
    }

    /// Set one change explicitly; returns `false` if the index does not exist
    pub fn set(&mut self, path: &str, index: usize, selected: bool) -> bool {
        match self.entries.get_mut(path).and_then(|flags| flags.get_mut(index)) {
            Some(flag) => {
                *flag = selected;
                true
            }
            None => false,
        }
    }

    /// Set every change of a file; returns `false` for an unknown path
    pub fn set_all(&mut self, path: &str, selected: bool) -> bool {
        match self.entries.get_mut(path) {
            Some(flags) => {
                flags.iter_mut().for_each(|flag| *flag = selected);
                true
            }
            None => false,
        }
    }

    /// Whether a change is accepted; unknown entries read as accepted
    #[must_use]
    pub fn is_selected(&self, path: &str, index: usize) -> bool {
        self.entries
            .get(path)
            .and_then(|flags| flags.get(index))
            .copied()
            .unwrap_or(true)
    }

    /// Whether every change of a file is accepted
    #[must_use]
    pub fn all_selected(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .map_or(true, |flags| flags.iter().all(|&flag| flag))
    }

    /// Flags for a file, if it is known
    #[must_use]
    pub fn flags(&self, path: &str) -> Option<&[bool]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Number of rejected changes across all files
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|&&flag| !flag)
            .count()
    }

    /// Number of files tracked
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files are tracked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
