//! Commit pipeline state
//!
//! ```text
//! Idle ──begin──→ Committing ──ok──→ Succeeded
//!                     │
//!                     └──err──→ Failed { message, at } ──(display window)──→ reads as Idle
//! ```
//!
//! The session drives the transitions; this module holds the state types and
//! the payload preparation step. A commit counts as in flight only while its
//! [`PendingCommit`] is alive, so dropping one (or cancelling the future that
//! owns it) returns the session to idle.

use crate::executor::ApplyReport;
use crate::types::FileNode;
use o11n_plan::{created_files, filter, ContentHash, CreatedFile, PlanDocument, SelectionMap};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Stored commit state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommitState {
    /// No commit has run, or the last one was cleared
    #[default]
    Idle,
    /// The executor has the payload
    Committing,
    /// The last commit applied
    Succeeded,
    /// The last commit failed
    Failed {
        /// Executor message, shown verbatim
        message: String,
        /// When the failure was recorded
        at: Instant,
    },
}

impl CommitState {
    /// What the state reads as at `now`
    ///
    /// A failure reads as [`CommitStatus::Failed`] for `display` after it was
    /// recorded, then as [`CommitStatus::Idle`].
    #[must_use]
    pub fn status_at(&self, now: Instant, display: Duration) -> CommitStatus<'_> {
        match self {
            Self::Idle => CommitStatus::Idle,
            Self::Committing => CommitStatus::Committing,
            Self::Succeeded => CommitStatus::Succeeded,
            Self::Failed { message, at } => {
                if now.saturating_duration_since(*at) < display {
                    CommitStatus::Failed(message)
                } else {
                    CommitStatus::Idle
                }
            }
        }
    }
}

/// Commit state as presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus<'a> {
    /// Ready
    Idle,
    /// In flight
    Committing,
    /// Applied
    Succeeded,
    /// Failed recently, with the executor message
    Failed(&'a str),
}

/// A commit that has passed the guard and awaits the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    /// Payload handed to the executor
    pub payload: String,
    /// Whether `payload` honours the selections
    pub filtered: bool,
    /// Hash of the plan the payload was built from
    pub plan_hash: ContentHash,
    /// Files the plan creates
    pub created: Vec<CreatedFile>,
    /// Repeated `### File` paths whose later blocks are not in the payload
    pub duplicates: Vec<String>,
    ticket: Arc<()>,
}

impl PendingCommit {
    /// Build the payload for `document`
    ///
    /// Falls back to the unfiltered plan text when the selections cannot be
    /// applied, so the attempt is never lost.
    #[must_use]
    pub fn prepare(document: &PlanDocument, selections: &SelectionMap) -> Self {
        let (payload, filtered) = match filter(document, selections) {
            Ok(payload) => (payload, true),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to unfiltered plan");
                (document.source.clone(), false)
            }
        };
        Self {
            payload,
            filtered,
            plan_hash: document.hash,
            created: created_files(document),
            duplicates: document.duplicates.clone(),
            ticket: Arc::new(()),
        }
    }

    /// Handle that stays live until this commit is finished or dropped
    pub(crate) fn ticket(&self) -> Weak<()> {
        Arc::downgrade(&self.ticket)
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Payload the executor applied
    pub payload: String,
    /// Whether the payload honoured the selections
    pub filtered: bool,
    /// File nodes added to the selection for newly created files
    pub new_files: Vec<FileNode>,
    /// Repeated `### File` paths whose later blocks were not applied
    pub skipped_duplicates: Vec<String>,
    /// Executor report
    pub report: ApplyReport,
}
