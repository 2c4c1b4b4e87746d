//! o11n Core
//!
//! The session object tying plan review, prompt inputs and the commit
//! pipeline together.
//!
//! # Architecture
//!
//! ```text
//! set_plan ──→ PlanDocument + SelectionMap ──toggle──→ begin_commit
//!                                                          │ payload
//!                                                          ▼
//!                                                   ApplyExecutor::apply
//!                                                          │ report / error
//!                                                          ▼
//!                                                    finish_commit
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commit;
pub mod config;
pub mod error;
pub mod executor;
pub mod session;
pub mod types;

pub use commit::{CommitOutcome, CommitState, CommitStatus, PendingCommit};
pub use config::{ExecutorConfig, O11nConfig};
pub use error::{CommitError, ConfigError, ExecutorError, O11nError};
pub use executor::{ApplyExecutor, ApplyReport, FileReport};
pub use session::Session;
pub use types::{format_file_size, CustomTemplate, FileNode, Mode, ParseModeError, ProjectRoot};

/// Result type for o11n operations
pub type Result<T> = std::result::Result<T, O11nError>;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a session
    pub use crate::{
        ApplyExecutor, ApplyReport, CommitError, CommitOutcome, CommitStatus, FileNode, Mode,
        O11nConfig, ProjectRoot, Session,
    };
    pub use o11n_plan::{PlanDocument, SelectionMap};
    pub use o11n_prompt::{PromptAssembler, PromptRequest};
}
