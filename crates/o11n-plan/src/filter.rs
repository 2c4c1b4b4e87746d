//! Plan filter
//!
//! Rebuilds a protocol payload that keeps only accepted changes. Files and
//! changes keep their document order; the header and every preamble pass
//! through verbatim, so filtering with all changes accepted is a no-op on the
//! parse tree.

use crate::document::{FileChangeBlock, PlanDocument};
use crate::error::FilterError;
use crate::grammar::{ACTION_MARKER, FILE_MARKER, PLAN_HEADING};
use crate::selection::SelectionMap;

/// Payload containing only the accepted changes of `document`
///
/// # Errors
/// - [`FilterError::StaleSelections`] if `selections` was seeded from another text
/// - [`FilterError::Misaligned`] if a file's flags do not match its change count
pub fn filter(document: &PlanDocument, selections: &SelectionMap) -> Result<String, FilterError> {
    if let Some(hash) = selections.plan_hash() {
        if hash != document.hash {
            return Err(FilterError::stale(hash, document.hash));
        }
        for file in &document.files {
            if let Some(flags) = selections.flags(&file.file_path) {
                if flags.len() != file.changes.len() {
                    return Err(FilterError::Misaligned {
                        path: file.file_path.clone(),
                        flags: flags.len(),
                        changes: file.changes.len(),
                    });
                }
            }
        }
    }
    Ok(filter_unchecked(document, selections))
}

/// Payload built without checking that `selections` belongs to `document`
///
/// Missing entries count as accepted.
#[must_use]
pub fn filter_unchecked(document: &PlanDocument, selections: &SelectionMap) -> String {
    let mut payload = String::with_capacity(document.source.len());
    payload.push_str(&document.header);
    let mut dropped = 0usize;

    for file in &document.files {
        dropped += push_file(&mut payload, file, selections);
    }

    tracing::debug!(
        files = document.files.len(),
        dropped,
        bytes = payload.len(),
        "filtered plan payload"
    );
    payload
}

fn push_file(payload: &mut String, file: &FileChangeBlock, selections: &SelectionMap) -> usize {
    payload.push_str(FILE_MARKER);
    payload.push(' ');
    payload.push_str(&file.file_path);
    payload.push('\n');
    payload.push_str(&file.preamble);

    let mut dropped = 0;
    for (index, change) in file.changes.iter().enumerate() {
        if selections.is_selected(&file.file_path, index) {
            payload.push_str(&change.text);
        } else {
            dropped += 1;
        }
    }
    dropped
}

/// Cheap structural check run before a commit
///
/// The text must mention the plan heading, a file marker and an action
/// directive. This is not a parse.
#[must_use]
pub fn is_committable(text: &str) -> bool {
    [PLAN_HEADING, FILE_MARKER, ACTION_MARKER]
        .iter()
        .all(|marker| text.contains(marker))
}
