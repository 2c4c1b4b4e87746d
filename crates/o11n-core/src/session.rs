//! Session state and the commit pipeline
//!
//! A [`Session`] owns everything one user works with: the plan under review
//! and its selections, the files picked for context, project roots,
//! templates, instructions and mode. All mutation goes through `&mut self`,
//! so a session never needs a lock of its own.

use crate::commit::{CommitOutcome, CommitState, CommitStatus, PendingCommit};
use crate::config::O11nConfig;
use crate::error::{CommitError, ExecutorError};
use crate::executor::{ApplyExecutor, ApplyReport};
use crate::types::{CustomTemplate, FileNode, Mode, ProjectRoot};
use o11n_plan::{is_committable, PlanDocument, SelectionMap};
use o11n_prompt::{estimate_path_tokens, PromptRequest, TemplateSource, TokenCounter};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Weak;
use std::time::Instant;

static IDLE: CommitState = CommitState::Idle;

/// One user's working state
#[derive(Debug, Clone)]
pub struct Session {
    config: O11nConfig,
    document: PlanDocument,
    selections: SelectionMap,
    selected_files: Vec<FileNode>,
    projects: Vec<ProjectRoot>,
    templates: Vec<CustomTemplate>,
    instructions: String,
    mode: Mode,
    commit_state: CommitState,
    in_flight: Weak<()>,
    last_report: Option<ApplyReport>,
}

impl Session {
    /// Empty session
    #[must_use]
    pub fn new(config: O11nConfig) -> Self {
        Self {
            config,
            document: PlanDocument::parse(""),
            selections: SelectionMap::default(),
            selected_files: Vec::new(),
            projects: Vec::new(),
            templates: Vec::new(),
            instructions: String::new(),
            mode: Mode::default(),
            commit_state: CommitState::default(),
            in_flight: Weak::new(),
            last_report: None,
        }
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &O11nConfig {
        &self.config
    }

    // Plan review

    /// Replace the plan under review; selections reset to all accepted
    pub fn set_plan(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.document = PlanDocument::parse(&text);
        self.selections = SelectionMap::init(&self.document);
        tracing::debug!(
            hash = %self.document.hash.short(),
            files = self.document.files.len(),
            changes = self.document.change_count(),
            "plan updated"
        );
    }

    /// Drop the plan and its selections
    pub fn clear_plan(&mut self) {
        self.set_plan(String::new());
    }

    /// Raw plan text
    #[inline]
    #[must_use]
    pub fn plan_text(&self) -> &str {
        &self.document.source
    }

    /// Parsed plan
    #[inline]
    #[must_use]
    pub fn document(&self) -> &PlanDocument {
        &self.document
    }

    /// Current selections
    #[inline]
    #[must_use]
    pub fn selections(&self) -> &SelectionMap {
        &self.selections
    }

    /// Flip one change; returns the new value, or `None` if it does not exist
    pub fn toggle_change(&mut self, path: &str, index: usize) -> Option<bool> {
        self.selections.toggle(path, index)
    }

    /// Accept all changes of a file, or reject all if they were all accepted
    pub fn toggle_file(&mut self, path: &str) {
        self.selections.toggle_all(path);
    }

    /// Accept or reject one change; returns `false` if it does not exist
    pub fn set_change_selected(&mut self, path: &str, index: usize, selected: bool) -> bool {
        self.selections.set(path, index, selected)
    }

    /// Accept or reject every change of a file; returns `false` for an unknown path
    pub fn set_file_selected(&mut self, path: &str, selected: bool) -> bool {
        self.selections.set_all(path, selected)
    }

    // Context files

    /// Select `file`, or deselect it if its path is already selected
    ///
    /// Returns whether the path is selected afterwards.
    pub fn select_file(&mut self, file: FileNode) -> bool {
        if let Some(pos) = self.selected_files.iter().position(|f| f.path == file.path) {
            self.selected_files.remove(pos);
            false
        } else {
            self.selected_files.push(file);
            true
        }
    }

    /// Remove the file with `id`; returns whether one was removed
    pub fn deselect_file(&mut self, id: &str) -> bool {
        let before = self.selected_files.len();
        self.selected_files.retain(|f| f.id != id);
        before != self.selected_files.len()
    }

    /// Remove every file directly inside `folder`; returns how many were removed
    ///
    /// Files without a directory component belong to [`crate::types::ROOT_FOLDER`].
    pub fn deselect_folder(&mut self, folder: &str) -> usize {
        let before = self.selected_files.len();
        self.selected_files.retain(|f| f.folder() != folder);
        before - self.selected_files.len()
    }

    /// Selected files in selection order
    #[inline]
    #[must_use]
    pub fn selected_files(&self) -> &[FileNode] {
        &self.selected_files
    }

    /// Selected files grouped by folder, folders sorted
    #[must_use]
    pub fn files_by_folder(&self) -> BTreeMap<&str, Vec<&FileNode>> {
        let mut groups: BTreeMap<&str, Vec<&FileNode>> = BTreeMap::new();
        for file in &self.selected_files {
            groups.entry(file.folder()).or_default().push(file);
        }
        groups
    }

    /// Attach a token count to the selected file at `path`
    pub fn attach_token_size(&mut self, path: &str, tokens: usize) -> bool {
        match self.selected_files.iter_mut().find(|f| f.path == path) {
            Some(file) => {
                file.token_size = Some(tokens);
                true
            }
            None => false,
        }
    }

    /// Count tokens for selected files that have no count yet
    ///
    /// Files whose count fails keep no count. Returns how many were updated.
    pub async fn refresh_token_sizes(&mut self, counter: &dyn TokenCounter) -> usize {
        let mut updated = 0;
        for file in self.selected_files.iter_mut().filter(|f| f.token_size.is_none()) {
            if let Some(tokens) = estimate_path_tokens(counter, Path::new(&file.path)).await {
                file.token_size = Some(tokens);
                updated += 1;
            }
        }
        updated
    }

    /// Sum of known token counts across selected files
    #[must_use]
    pub fn total_tokens(&self) -> usize {
        self.selected_files.iter().filter_map(|f| f.token_size).sum()
    }

    // Projects and templates

    /// Add a project root; a root with a known path is replaced
    pub fn add_project(&mut self, root: ProjectRoot) {
        match self.projects.iter_mut().find(|p| p.path == root.path) {
            Some(existing) => *existing = root,
            None => self.projects.push(root),
        }
    }

    /// Known project roots
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &[ProjectRoot] {
        &self.projects
    }

    /// Mark the listing of `path` as loaded
    pub fn mark_project_loaded(&mut self, path: &str) -> bool {
        match self.projects.iter_mut().find(|p| p.path == path) {
            Some(root) => {
                root.loaded_children = true;
                true
            }
            None => false,
        }
    }

    /// Add a template
    pub fn add_template(&mut self, template: CustomTemplate) {
        self.templates.push(template);
    }

    /// Flip a template's active flag; returns the new value
    pub fn toggle_template(&mut self, id: &str) -> Option<bool> {
        let template = self.templates.iter_mut().find(|t| t.id == id)?;
        template.active = !template.active;
        Some(template.active)
    }

    /// Remove a template; returns whether one was removed
    pub fn remove_template(&mut self, id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        before != self.templates.len()
    }

    /// Known templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[CustomTemplate] {
        &self.templates
    }

    // Prompt inputs

    /// Replace the user instructions
    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.instructions = instructions.into();
    }

    /// User instructions
    #[inline]
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Switch mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Prompt inputs for the current state
    ///
    /// Talk mode never asks for the plan grammar.
    #[must_use]
    pub fn prompt_request(&self) -> PromptRequest {
        PromptRequest {
            files: self.selected_files.iter().map(|f| f.path.clone()).collect(),
            project_roots: self.projects.iter().map(|p| p.path.clone()).collect(),
            templates: self
                .templates
                .iter()
                .filter(|t| t.active)
                .map(|t| TemplateSource {
                    name: t.name.clone(),
                    path: t.path.clone(),
                })
                .collect(),
            instructions: self.instructions.clone(),
            include_file_tree: self.config.include_file_tree,
            include_formatting_instructions: self.config.include_formatting_instructions
                && self.mode != Mode::Talk,
        }
    }

    // Commit

    /// Whether a commit is in flight; one whose pending commit was dropped is not
    fn is_committing(&self) -> bool {
        self.commit_state == CommitState::Committing && self.in_flight.strong_count() > 0
    }

    /// Whether a commit may start now
    #[must_use]
    pub fn can_commit(&self) -> bool {
        !self.is_committing() && is_committable(self.plan_text())
    }

    /// Commit state; an abandoned commit reads as idle
    #[must_use]
    pub fn commit_state(&self) -> &CommitState {
        if self.commit_state == CommitState::Committing && !self.is_committing() {
            return &IDLE;
        }
        &self.commit_state
    }

    /// Commit state as it reads at `now`
    #[must_use]
    pub fn commit_status_at(&self, now: Instant) -> CommitStatus<'_> {
        self.commit_state()
            .status_at(now, self.config.failure_display())
    }

    /// Report of the last successful apply
    #[inline]
    #[must_use]
    pub fn last_report(&self) -> Option<&ApplyReport> {
        self.last_report.as_ref()
    }

    /// Pass the guard and build the payload
    ///
    /// The session stays in the committing state until
    /// [`finish_commit`](Self::finish_commit) or
    /// [`abort_commit`](Self::abort_commit) is called, or the returned
    /// [`PendingCommit`] is dropped.
    ///
    /// # Errors
    /// - [`CommitError::AlreadyCommitting`] while another commit is in flight
    /// - [`CommitError::InvalidPlan`] if the plan lacks the required markers
    pub fn begin_commit(&mut self) -> Result<PendingCommit, CommitError> {
        if self.is_committing() {
            return Err(CommitError::AlreadyCommitting);
        }
        if !is_committable(self.plan_text()) {
            return Err(CommitError::InvalidPlan);
        }

        let pending = PendingCommit::prepare(&self.document, &self.selections);
        self.commit_state = CommitState::Committing;
        self.in_flight = pending.ticket();
        tracing::info!(
            plan = %pending.plan_hash.short(),
            bytes = pending.payload.len(),
            filtered = pending.filtered,
            "commit started"
        );
        Ok(pending)
    }

    /// Give up on `pending` without an executor answer
    ///
    /// The plan and selections are kept; the session returns to idle.
    pub fn abort_commit(&mut self, pending: PendingCommit) {
        if self.in_flight.ptr_eq(&pending.ticket()) {
            self.commit_state = CommitState::Idle;
            self.in_flight = Weak::new();
            tracing::info!(plan = %pending.plan_hash.short(), "commit aborted");
        }
    }

    /// Record the executor's answer for `pending`
    ///
    /// On success project listings are marked stale, created files join the
    /// selection, the plan is cleared and the mode returns to plan. On failure
    /// the plan and selections are kept for a retry.
    ///
    /// # Errors
    /// Returns the executor error, after recording it as a failure at `now`
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        result: Result<ApplyReport, ExecutorError>,
        now: Instant,
    ) -> Result<CommitOutcome, CommitError> {
        self.in_flight = Weak::new();
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "commit failed");
                self.commit_state = CommitState::Failed {
                    message: e.to_string(),
                    at: now,
                };
                return Err(e.into());
            }
        };

        for root in &mut self.projects {
            root.loaded_children = false;
        }

        let mut new_files = Vec::new();
        for created in pending.created {
            if self.selected_files.iter().any(|f| f.path == created.path) {
                continue;
            }
            let node = FileNode::from(created);
            self.selected_files.push(node.clone());
            new_files.push(node);
        }

        // a plan replaced while the executor ran is left for review
        if !pending.duplicates.is_empty() {
            tracing::warn!(paths = ?pending.duplicates, "repeated file blocks were not applied");
        }

        if self.document.hash == pending.plan_hash {
            self.clear_plan();
        } else {
            tracing::debug!("plan changed during commit, keeping it");
        }
        self.mode = Mode::Plan;
        self.commit_state = CommitState::Succeeded;
        self.last_report = Some(report.clone());

        tracing::info!(
            created = new_files.len(),
            applied = report.success.len(),
            errors = report.errors.len(),
            "commit applied"
        );
        Ok(CommitOutcome {
            payload: pending.payload,
            filtered: pending.filtered,
            new_files,
            skipped_duplicates: pending.duplicates,
            report,
        })
    }

    /// Run the whole pipeline against `executor`
    ///
    /// Cancelling the returned future abandons the commit and leaves the
    /// session idle with its plan intact.
    ///
    /// # Errors
    /// See [`begin_commit`](Self::begin_commit) and
    /// [`finish_commit`](Self::finish_commit)
    pub async fn commit(
        &mut self,
        executor: &dyn ApplyExecutor,
    ) -> Result<CommitOutcome, CommitError> {
        let pending = self.begin_commit()?;
        let result = executor.apply(&pending.payload).await;
        self.finish_commit(pending, result, Instant::now())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(O11nConfig::default())
    }
}
