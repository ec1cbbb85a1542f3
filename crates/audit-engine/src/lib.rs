//! Repository hygiene audit.
//!
//! Joins the files on disk, grouped by extension, with the attribute rules,
//! the ignore rules and the list of files tracked by version control.
//! Tracked files that are ignored get untracked; extensions with no
//! attribute rule are reported.

pub mod config;
pub mod error;
pub mod gateway;
pub mod reconcile;
pub mod tree;

pub use config::AuditConfig;
pub use error::AuditError;
pub use gateway::{GitGateway, TrackedFileSet, VersionControlGateway};
pub use reconcile::{
    apply, apply_with, reconcile, run_audit, run_audit_with, AuditReport, Reconciliation,
};
pub use tree::{extension_key, ExtensionIndex, TreeIndexer};

pub type Result<T> = std::result::Result<T, AuditError>;
