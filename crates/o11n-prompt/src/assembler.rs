//! Prompt assembly
//!
//! A prompt is built from five sections in a fixed order:
//!
//! 1. `<file_map>`: tree over the selected files, or the project roots
//! 2. `<file_contents>`: every selected non-image file, fenced by language
//! 3. active custom templates
//! 4. formatting instructions describing the plan grammar
//! 5. `<user_instructions>`: always last, always present
//!
//! Files are read one after another in request order. A file that cannot be
//! read is embedded as a placeholder comment.

use crate::cache::PromptCache;
use crate::error::PromptError;
use crate::language::{is_image, language_for_path};
use crate::tree::render_tree;
use o11n_plan::ContentHash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Plan grammar the generation step is asked to follow
pub const FORMATTING_INSTRUCTIONS: &str = "\
Respond with a plan in exactly this format:

# Plan
<one paragraph describing the overall change>
## Files
### File <path>
### Action <create|modify|rewrite|delete>
#### Change
**Description**: <what this change does>
**Search**:
```<language>
<exact lines to replace>
```
**Content**:
```<language>
<replacement lines>
```

Repeat `### File` for every file and `#### Change` for every independent edit.
For `create` and `rewrite`, give the full file under `**Content**:` and omit `**Search**:`.";

/// Custom template embedded in the prompt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateSource {
    /// Display name
    pub name: String,
    /// File holding the template text
    pub path: String,
}

/// Everything a prompt is built from
///
/// Two equal requests produce the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Selected file paths, in selection order
    pub files: Vec<String>,
    /// Project root paths, used for the file map when no file is selected
    pub project_roots: Vec<String>,
    /// Active templates, in order
    pub templates: Vec<TemplateSource>,
    /// Free-text user instructions
    pub instructions: String,
    /// Emit the `<file_map>` section
    pub include_file_tree: bool,
    /// Emit the formatting instructions
    pub include_formatting_instructions: bool,
}

impl PromptRequest {
    /// Request with the file map and formatting instructions enabled
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            include_file_tree: true,
            include_formatting_instructions: true,
            ..Self::default()
        }
    }

    /// Add a selected file
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Add a project root
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<String>) -> Self {
        self.project_roots.push(path.into());
        self
    }

    /// Add an active template
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.templates.push(TemplateSource {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Toggle the file map
    #[must_use]
    pub fn with_file_tree(mut self, include: bool) -> Self {
        self.include_file_tree = include;
        self
    }

    /// Toggle the formatting instructions
    #[must_use]
    pub fn with_formatting_instructions(mut self, include: bool) -> Self {
        self.include_formatting_instructions = include;
        self
    }

    /// Cache key for this request
    ///
    /// # Errors
    /// Returns an error if the request cannot be serialized
    pub fn cache_key(&self) -> Result<ContentHash, PromptError> {
        Ok(ContentHash::compute_serializable(self)?)
    }
}

/// Builds prompts, reusing recent results for identical requests
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    cache: PromptCache,
}

impl PromptAssembler {
    /// Assembler with the given cache
    #[must_use]
    pub fn new(cache: PromptCache) -> Self {
        Self { cache }
    }

    /// Assembler whose results live for `ttl`
    #[must_use]
    pub fn with_ttl(capacity: u64, ttl: Duration) -> Self {
        Self::new(PromptCache::with_ttl(capacity, ttl))
    }

    /// The underlying cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &PromptCache {
        &self.cache
    }

    /// Build the prompt for `request`
    ///
    /// An identical request within the cache TTL returns the earlier string
    /// without touching the file system, even if files changed meanwhile.
    ///
    /// # Errors
    /// Returns an error if the request cannot be hashed
    pub async fn build(&self, request: &PromptRequest) -> Result<Arc<str>, PromptError> {
        let key = request.cache_key()?;
        Ok(self
            .cache
            .get_or_build(key, || assemble(request))
            .await)
    }
}

/// Build the prompt for `request` without caching
pub async fn assemble(request: &PromptRequest) -> String {
    let mut lines: Vec<String> = Vec::new();

    if request.include_file_tree {
        let paths: &[String] = if request.files.is_empty() {
            &request.project_roots
        } else {
            &request.files
        };
        if !paths.is_empty() {
            lines.push("<file_map>".into());
            lines.push(render_tree(paths));
            lines.push("</file_map>".into());
            lines.push(String::new());
        }
    }

    let embedded: Vec<&String> = request.files.iter().filter(|p| !is_image(p)).collect();
    if !embedded.is_empty() {
        lines.push("<file_contents>".into());
        for path in embedded {
            let content = read_or_placeholder(path).await;
            lines.push(format!("File: {path}"));
            lines.push(format!("```{}", language_for_path(path)));
            lines.push(content);
            lines.push("```".into());
            lines.push(String::new());
        }
        lines.push("</file_contents>".into());
        lines.push(String::new());
    }

    for template in &request.templates {
        let content = read_or_placeholder(&template.path).await;
        lines.push(format!("<template name=\"{}\">", template.name));
        lines.push(content);
        lines.push("</template>".into());
        lines.push(String::new());
    }

    if request.include_formatting_instructions {
        lines.push("<formatting_instructions>".into());
        lines.push(FORMATTING_INSTRUCTIONS.into());
        lines.push("</formatting_instructions>".into());
        lines.push(String::new());
    }

    lines.push("<user_instructions>".into());
    lines.push(request.instructions.clone());
    lines.push("</user_instructions>".into());

    let prompt = lines.join("\n");
    tracing::debug!(
        files = request.files.len(),
        templates = request.templates.len(),
        bytes = prompt.len(),
        "assembled prompt"
    );
    prompt
}

async fn read_or_placeholder(path: &str) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(mut content) => {
            if content.ends_with('\n') {
                content.pop();
            }
            content
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "embedding placeholder for unreadable file");
            format!("/* Error reading file: {e} */")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn instructions_only() {
        let request = PromptRequest::new("do it")
            .with_file_tree(false)
            .with_formatting_instructions(false);
        assert_eq!(
            assemble(&request).await,
            "<user_instructions>\ndo it\n</user_instructions>"
        );
    }

    #[tokio::test]
    async fn empty_instructions_still_emit_section() {
        let prompt = assemble(&PromptRequest::default()).await;
        assert_eq!(prompt, "<user_instructions>\n\n</user_instructions>");
    }

    #[tokio::test]
    async fn roots_map_when_nothing_selected() {
        let request = PromptRequest::new("")
            .with_project_root("/work/api")
            .with_project_root("/work/web")
            .with_formatting_instructions(false);
        let prompt = assemble(&request).await;
        assert!(prompt.starts_with("<file_map>\n/work\n├── api\n└── web\n</file_map>\n\n"));
        assert!(!prompt.contains("<file_contents>"));
    }

    #[tokio::test]
    async fn unreadable_file_becomes_placeholder() {
        let request = PromptRequest::new("")
            .with_file("/definitely/missing.rs")
            .with_file_tree(false)
            .with_formatting_instructions(false);
        let prompt = assemble(&request).await;
        assert!(prompt.contains("File: /definitely/missing.rs\n```rust\n/* Error reading file: "));
        assert!(prompt.ends_with("</user_instructions>"));
    }

    #[test]
    fn cache_key_tracks_request() {
        let a = PromptRequest::new("x").with_file("a.rs");
        let b = PromptRequest::new("y").with_file("a.rs");
        assert_eq!(a.cache_key().unwrap(), a.clone().cache_key().unwrap());
        assert_ne!(a.cache_key().unwrap(), b.cache_key().unwrap());
    }
}
