//! Testing utilities for the o11n workspace
//!
//! Plan text builders and scripted apply executors.

#![allow(missing_docs)]

use async_trait::async_trait;
use o11n_core::{ApplyExecutor, ApplyReport, ExecutorError, FileReport, O11nConfig, Session};
use o11n_plan::PlanDocument;
use std::sync::Mutex;

/// Builds plan text in protocol grammar
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    description: String,
    body: String,
}

impl PlanBuilder {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            body: String::new(),
        }
    }

    /// Start a file entry
    pub fn file(mut self, path: &str, action: &str) -> Self {
        self.body.push_str(&format!("### File {path}\n### Action {action}\n"));
        self
    }

    /// Add a search/replace change to the current file
    pub fn change(mut self, description: &str, search: &str, content: &str) -> Self {
        self.body.push_str(&format!(
            "#### Change\n**Description**: {description}\n**Search**:\n```\n{search}\n```\n**Content**:\n```\n{content}\n```\n"
        ));
        self
    }

    /// Add a creation payload to the current file
    pub fn content(mut self, lang: &str, content: &str) -> Self {
        self.body
            .push_str(&format!("**Content**:\n```{lang}\n{content}\n```\n"));
        self
    }

    pub fn build(self) -> String {
        format!("# Plan\n{}\n## Files\n{}", self.description, self.body)
    }

    pub fn parse(self) -> PlanDocument {
        PlanDocument::parse(&self.build())
    }
}

/// Two files, two changes each
pub fn two_file_plan() -> String {
    PlanBuilder::new("Rename helpers.")
        .file("src/a.rs", "modify")
        .change("a first", "fn a1() {}", "fn alpha1() {}")
        .change("a second", "fn a2() {}", "fn alpha2() {}")
        .file("src/b.rs", "modify")
        .change("b first", "fn b1() {}", "fn beta1() {}")
        .change("b second", "fn b2() {}", "fn beta2() {}")
        .build()
}

/// One created file with content `hello` and no change markers
pub fn create_file_plan(path: &str) -> String {
    PlanBuilder::new("Add a file.")
        .file(path, "create")
        .content("", "hello")
        .build()
}

pub fn setup_session() -> Session {
    Session::new(O11nConfig::default())
}

/// Succeeds, recording every payload it receives
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    payloads: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> Option<String> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ApplyExecutor for RecordingExecutor {
    async fn apply(&self, payload: &str) -> Result<ApplyReport, ExecutorError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        let success = PlanDocument::parse(payload)
            .files
            .iter()
            .map(|file| FileReport::new(file.file_path.clone(), "applied"))
            .collect();
        Ok(ApplyReport {
            success,
            errors: Vec::new(),
        })
    }
}

/// Always rejects with a fixed message
#[derive(Debug, Clone)]
pub struct FailingExecutor {
    message: String,
}

impl FailingExecutor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ApplyExecutor for FailingExecutor {
    async fn apply(&self, _payload: &str) -> Result<ApplyReport, ExecutorError> {
        Err(ExecutorError::rejected(self.message.clone()))
    }
}

/// Never answers; for cancelling a commit mid-flight
#[derive(Debug, Clone, Copy, Default)]
pub struct StalledExecutor;

#[async_trait]
impl ApplyExecutor for StalledExecutor {
    async fn apply(&self, _payload: &str) -> Result<ApplyReport, ExecutorError> {
        std::future::pending().await
    }
}
