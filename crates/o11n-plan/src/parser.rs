//! Plan parser
//!
//! A single pass over the lines of the plan text. The scanner keeps one of
//! three states (outside any file, in a file preamble, in a change) plus a
//! fence flag, and records byte offsets; the records are sliced out of the
//! source afterwards so that preamble + changes reproduce each file body
//! exactly.
//!
//! A fence left open runs to the end of the text: every marker after it,
//! `### File` included, is content of the block that opened it. Rejecting that
//! change therefore drops the later files from a filtered payload as well.

use crate::document::{Action, ChangeBlock, FileChangeBlock, PlanDocument};
use crate::grammar::{self, Marker, CONTENT_MARKER};
use crate::hash::ContentHash;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideFile,
    InPreamble,
    InChange,
}

#[derive(Debug)]
struct RawChange {
    start: usize,
    descriptions: Vec<String>,
}

#[derive(Debug)]
struct RawSegment {
    path: String,
    marker_start: usize,
    body_start: usize,
    action: Option<Action>,
    changes: Vec<RawChange>,
}

#[derive(Debug)]
enum Description {
    NotStarted,
    Collecting(String),
    Done(String),
}

#[derive(Debug)]
struct Scanner {
    state: State,
    in_fence: bool,
    description: Description,
    segments: Vec<RawSegment>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::OutsideFile,
            in_fence: false,
            description: Description::NotStarted,
            segments: Vec::new(),
        }
    }

    fn line(&mut self, start: usize, raw: &str) {
        let line = grammar::strip_terminator(raw);
        let marker = grammar::classify(line);

        if marker == Some(Marker::Fence) {
            self.in_fence = !self.in_fence;
        }
        let marker = if self.in_fence { None } else { marker };

        match (self.state, marker) {
            (_, Some(Marker::File(path))) => {
                if let Description::Collecting(_) = self.description {
                    self.description = Description::Done(String::new());
                }
                self.segments.push(RawSegment {
                    path: path.to_string(),
                    marker_start: start,
                    body_start: start + raw.len(),
                    action: None,
                    changes: Vec::new(),
                });
                self.state = State::InPreamble;
            }
            (State::InPreamble | State::InChange, Some(Marker::Change)) => {
                if let Some(segment) = self.segments.last_mut() {
                    segment.changes.push(RawChange {
                        start,
                        descriptions: Vec::new(),
                    });
                }
                self.state = State::InChange;
            }
            (State::InPreamble, Some(Marker::Action(verb))) => {
                if let Some(segment) = self.segments.last_mut() {
                    segment.action.get_or_insert_with(|| Action::from_verb(verb));
                }
            }
            (State::InChange, None) if !self.in_fence => {
                if let Some(text) = grammar::description(line) {
                    if let Some(change) = self
                        .segments
                        .last_mut()
                        .and_then(|segment| segment.changes.last_mut())
                    {
                        change.descriptions.push(text.to_string());
                    }
                }
            }
            (State::OutsideFile, Some(Marker::PlanHeading(rest))) => {
                if let Description::NotStarted = self.description {
                    self.description = Description::Collecting(format!("{rest}\n"));
                } else {
                    self.collect_description(raw);
                }
            }
            (State::OutsideFile, Some(Marker::FilesHeading)) => {
                if let Description::Collecting(text) = &mut self.description {
                    let text = std::mem::take(text);
                    self.description = Description::Done(text);
                }
            }
            (State::OutsideFile, _) => self.collect_description(raw),
            _ => {}
        }
    }

    fn collect_description(&mut self, raw: &str) {
        if let Description::Collecting(text) = &mut self.description {
            text.push_str(raw);
        }
    }

    fn finish(self, source: &str) -> PlanDocument {
        let description = match self.description {
            Description::Done(text) => text.trim().to_string(),
            Description::NotStarted | Description::Collecting(_) => String::new(),
        };
        let header_end = self
            .segments
            .first()
            .map_or(source.len(), |segment| segment.marker_start);

        let ends: Vec<usize> = self
            .segments
            .iter()
            .skip(1)
            .map(|segment| segment.marker_start)
            .chain(std::iter::once(source.len()))
            .collect();

        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(self.segments.len());
        let mut duplicates = Vec::new();

        for (segment, end) in self.segments.into_iter().zip(ends) {
            if !seen.insert(segment.path.clone()) {
                tracing::warn!(path = %segment.path, "duplicate file entry in plan; keeping the first");
                duplicates.push(segment.path);
                continue;
            }
            files.push(build_file(source, segment, end));
        }

        let document = PlanDocument {
            source: source.to_string(),
            hash: ContentHash::compute(source.as_bytes()),
            header: source[..header_end].to_string(),
            description,
            files,
            duplicates,
        };
        tracing::debug!(
            hash = %document.hash.short(),
            files = document.files.len(),
            changes = document.change_count(),
            "parsed plan document"
        );
        document
    }
}

fn build_file(source: &str, segment: RawSegment, end: usize) -> FileChangeBlock {
    let preamble_end = segment.changes.first().map_or(end, |change| change.start);
    let starts: Vec<usize> = segment.changes.iter().map(|change| change.start).collect();

    let changes = segment
        .changes
        .into_iter()
        .enumerate()
        .map(|(i, change)| {
            let change_end = starts.get(i + 1).copied().unwrap_or(end);
            ChangeBlock {
                text: source[change.start..change_end].to_string(),
                descriptions: change.descriptions,
            }
        })
        .collect();

    let creation_content = match segment.action {
        Some(Action::Create) => grammar::fenced_after(&source[segment.body_start..end], CONTENT_MARKER),
        _ => None,
    };

    FileChangeBlock {
        file_path: segment.path,
        preamble: source[segment.body_start..preamble_end].to_string(),
        changes,
        action: segment.action,
        creation_content,
    }
}

/// Parse plan text into a [`PlanDocument`]
///
/// Malformed input degrades to partial structures: missing headings leave the
/// description empty, a text without `### File` markers has no files, and a
/// file without `#### Change` markers keeps its whole body as preamble.
#[must_use]
pub fn parse(text: &str) -> PlanDocument {
    let mut scanner = Scanner::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        scanner.line(offset, raw);
        offset += raw.len();
    }
    scanner.finish(text)
}
