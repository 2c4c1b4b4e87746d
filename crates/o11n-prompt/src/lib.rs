//! o11n Prompt Assembly
//!
//! Builds the context document sent to a generation step: a file map, the
//! contents of selected files, active templates, the plan grammar and the
//! user's instructions.
//!
//! # Example
//!
//! ```rust
//! use o11n_prompt::render_tree;
//!
//! let map = render_tree(&["/a/b/x.ts", "/a/c/z.ts"]);
//! assert_eq!(map, "/a\n├── b\n│   └── x.ts\n└── c\n    └── z.ts");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assembler;
pub mod cache;
pub mod error;
pub mod language;
pub mod tokens;
pub mod tree;

pub use assembler::{assemble, PromptAssembler, PromptRequest, TemplateSource, FORMATTING_INSTRUCTIONS};
pub use cache::{CacheStats, PromptCache};
pub use error::{PromptError, TokenCountError};
pub use language::{is_image, language_for_path};
pub use tokens::{estimate_path_tokens, estimate_tokens, ApproxTokenCounter, TokenCounter};
pub use tree::render_tree;
