//! Plan grammar markers
//!
//! All markers are line-anchored and case-sensitive. A marker line inside a
//! fenced code block is ordinary content.

/// Heading that opens the plan description
pub const PLAN_HEADING: &str = "# Plan";
/// Heading that closes the plan description
pub const FILES_HEADING: &str = "## Files";
/// Opens a file segment: `### File <path>`
pub const FILE_MARKER: &str = "### File";
/// Action directive inside a file preamble: `### Action <verb>`
pub const ACTION_MARKER: &str = "### Action";
/// Opens a change segment
pub const CHANGE_MARKER: &str = "#### Change";
/// Per-change description line: `**Description**: <text>`
pub const DESCRIPTION_MARKER: &str = "**Description**:";
/// Precedes the fenced text a change replaces
pub const SEARCH_MARKER: &str = "**Search**:";
/// Precedes the fenced replacement or creation text
pub const CONTENT_MARKER: &str = "**Content**:";
/// Code fence delimiter
pub const FENCE: &str = "```";

/// Classified marker line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker<'a> {
    PlanHeading(&'a str),
    FilesHeading,
    File(&'a str),
    Action(&'a str),
    Change,
    Fence,
}

/// Strip `prefix` when it is followed by whitespace or the end of the line
fn keyword<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Classify one line (without its line terminator)
pub(crate) fn classify(line: &str) -> Option<Marker<'_>> {
    if line.trim_start().starts_with(FENCE) {
        return Some(Marker::Fence);
    }
    if line.starts_with(CHANGE_MARKER) {
        return Some(Marker::Change);
    }
    if let Some(rest) = keyword(line, FILE_MARKER) {
        let path = rest.trim();
        return (!path.is_empty()).then_some(Marker::File(path));
    }
    if let Some(rest) = keyword(line, ACTION_MARKER) {
        let verb = rest.split_whitespace().next()?;
        return Some(Marker::Action(verb));
    }
    if keyword(line, FILES_HEADING).is_some() {
        return Some(Marker::FilesHeading);
    }
    keyword(line, PLAN_HEADING).map(Marker::PlanHeading)
}

/// Trimmed text after `**Description**:`, if the line carries one
pub(crate) fn description(line: &str) -> Option<&str> {
    let text = line.trim_start().strip_prefix(DESCRIPTION_MARKER)?.trim();
    (!text.is_empty()).then_some(text)
}

/// Line without its `\n` / `\r\n` terminator
pub(crate) fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Inner text of the first fenced block that follows a `marker` line
///
/// Blank lines may separate the marker from the opening fence; anything else
/// in between means the marker has no payload. The opening fence's language
/// tag and the closing fence are dropped. An unterminated fence yields `None`.
pub(crate) fn fenced_after(text: &str, marker: &str) -> Option<String> {
    #[derive(PartialEq)]
    enum State {
        Seeking { in_fence: bool },
        AwaitingFence,
        Collecting,
    }

    let mut state = State::Seeking { in_fence: false };
    let mut body = String::new();

    for raw in text.split_inclusive('\n') {
        let line = strip_terminator(raw);
        let is_fence = line.trim_start().starts_with(FENCE);
        state = match state {
            State::Seeking { in_fence } if is_fence => State::Seeking {
                in_fence: !in_fence,
            },
            State::Seeking { in_fence: false } => match line.trim_start().strip_prefix(marker) {
                Some(rest) if rest.trim().is_empty() => State::AwaitingFence,
                _ => State::Seeking { in_fence: false },
            },
            State::Seeking { in_fence: true } => State::Seeking { in_fence: true },
            State::AwaitingFence if is_fence => State::Collecting,
            State::AwaitingFence if line.trim().is_empty() => State::AwaitingFence,
            State::AwaitingFence => match line.trim_start().strip_prefix(marker) {
                Some(rest) if rest.trim().is_empty() => State::AwaitingFence,
                _ => State::Seeking { in_fence: false },
            },
            State::Collecting if is_fence => return Some(body),
            State::Collecting => {
                body.push_str(line);
                body.push('\n');
                State::Collecting
            }
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_markers() {
        assert_eq!(classify("### File src/a.rs"), Some(Marker::File("src/a.rs")));
        assert_eq!(classify("### File   spaced.rs  "), Some(Marker::File("spaced.rs")));
        assert_eq!(classify("### Action create"), Some(Marker::Action("create")));
        assert_eq!(classify("#### Change 2: tidy"), Some(Marker::Change));
        assert_eq!(classify("# Plan"), Some(Marker::PlanHeading("")));
        assert_eq!(classify("## Files"), Some(Marker::FilesHeading));
        assert_eq!(classify("  ```rust"), Some(Marker::Fence));
    }

    #[test]
    fn classify_is_case_sensitive_and_anchored() {
        assert_eq!(classify("### file a.rs"), None);
        assert_eq!(classify(" ### File a.rs"), None);
        assert_eq!(classify("### Files a.rs"), None);
        assert_eq!(classify("### File"), None);
        assert_eq!(classify("#### change"), None);
        assert_eq!(classify("## Plan"), None);
        assert_eq!(classify("# Planning"), None);
    }

    #[test]
    fn description_lines() {
        assert_eq!(description("**Description**: add a flag "), Some("add a flag"));
        assert_eq!(description("  **Description**:x"), Some("x"));
        assert_eq!(description("**Description**:   "), None);
        assert_eq!(description("Description: nope"), None);
    }

    #[test]
    fn fenced_after_extracts_inner_text() {
        let text = "**Content**:\n\n```ts\nconst a = 1;\nconst b = 2;\n```\ntrailing\n";
        assert_eq!(
            fenced_after(text, CONTENT_MARKER).as_deref(),
            Some("const a = 1;\nconst b = 2;\n")
        );
    }

    #[test]
    fn fenced_after_requires_closing_fence() {
        assert_eq!(fenced_after("**Content**:\n```\nhello\n", CONTENT_MARKER), None);
    }

    #[test]
    fn fenced_after_ignores_markers_inside_other_fences() {
        let text = "```md\n**Content**:\n```\n**Content**:\n```\nreal\n```\n";
        assert_eq!(fenced_after(text, CONTENT_MARKER).as_deref(), Some("real\n"));
    }

    #[test]
    fn fenced_after_needs_fence_right_after_marker() {
        let text = "**Content**:\nprose first\n```\nx\n```\n";
        assert_eq!(fenced_after(text, CONTENT_MARKER), None);
    }
}
