//! o11n Plan Protocol
//!
//! Turns the semi-structured plan returned by a generation step into
//! addressable records, tracks which changes the user accepts, and rebuilds
//! the payload handed to the apply executor.
//!
//! # Pipeline
//!
//! ```text
//! plan text → parse → PlanDocument ─┬─→ SelectionMap::init → toggle / toggle_all
//!                                   └─→ filter(document, selections) → payload
//!                                   └─→ created_files(document)      → new files
//! ```
//!
//! # Grammar
//!
//! ````text
//! # Plan
//! <description>
//! ## Files
//! ### File <path>
//! ### Action <verb>
//! <notes>
//! #### Change
//! **Description**: <text>
//! **Search**:
//! ```lang
//! ...
//! ```
//! **Content**:
//! ```lang
//! ...
//! ```
//! ````
//!
//! # Example
//!
//! ```rust
//! use o11n_plan::{filter, PlanDocument, SelectionMap};
//!
//! let text = "### File a.rs\n#### Change\n**Description**: one\n#### Change\n**Description**: two\n";
//! let document = PlanDocument::parse(text);
//! let mut selections = SelectionMap::init(&document);
//! selections.toggle("a.rs", 1);
//!
//! let payload = filter(&document, &selections).unwrap();
//! assert_eq!(payload, "### File a.rs\n#### Change\n**Description**: one\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod created;
pub mod document;
pub mod error;
pub mod filter;
pub mod grammar;
pub mod hash;
pub mod parser;
pub mod selection;

pub use created::{created_files, CreatedFile};
pub use document::{Action, ChangeBlock, FileChangeBlock, FileSummary, PlanDocument, PlanSummary};
pub use error::FilterError;
pub use filter::{filter, filter_unchecked, is_committable};
pub use hash::{ContentHash, HashError};
pub use parser::parse;
pub use selection::SelectionMap;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with plan documents
    pub use crate::{
        created_files, filter, is_committable, Action, ChangeBlock, FileChangeBlock, PlanDocument,
        SelectionMap,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn select_filter_and_detect_new_files() {
        let text = "# Plan\nAdd a module.\n## Files\n\
                    ### File src/lib.rs\n### Action modify\n#### Change\n**Description**: declare module\n\
                    ### File src/greet.rs\n### Action create\n**Content**:\n```rust\npub fn hi() {}\n```\n";
        let document = PlanDocument::parse(text);
        assert!(is_committable(text));
        assert_eq!(document.description, "Add a module.");

        let mut selections = SelectionMap::init(&document);
        selections.toggle_all("src/lib.rs");
        let payload = filter(&document, &selections).unwrap();
        assert!(!payload.contains("declare module"));
        assert!(payload.contains("pub fn hi() {}"));

        let created = created_files(&document);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].path, "src/greet.rs");
    }
}
