//! Error types for plan filtering

use crate::hash::ContentHash;

/// Errors raised while rebuilding a filtered payload
///
/// Parsing itself never fails; filtering fails only when the selection state
/// does not belong to the document being filtered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Selections were seeded from a different plan text
    #[error("selections belong to plan {selections}, not {document}")]
    StaleSelections {
        /// Hash the selections were seeded from
        selections: ContentHash,
        /// Hash of the document being filtered
        document: ContentHash,
    },

    /// A file's flags do not line up with its parsed changes
    #[error("selection for {path} has {flags} flags for {changes} changes")]
    Misaligned {
        /// File path
        path: String,
        /// Number of flags held
        flags: usize,
        /// Number of parsed changes
        changes: usize,
    },
}

impl FilterError {
    /// Create a stale-selection error
    pub fn stale(selections: ContentHash, document: ContentHash) -> Self {
        Self::StaleSelections {
            selections,
            document,
        }
    }
}
