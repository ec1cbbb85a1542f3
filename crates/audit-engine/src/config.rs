use std::ffi::OsString;
use std::path::{Path, PathBuf};

use audit_rules::IgnoreOptions;

use crate::tree::TreeIndexer;

/// Rules file looked up under the root when none is given.
pub const DEFAULT_RULES_FILE: &str = ".gitattributes";
/// Ignore file looked up under the root when none is given.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Everything one audit run needs to know.
///
/// Built by the caller; nothing here is read from the environment.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Root of the working tree.
    pub root: PathBuf,
    /// Rules file override. `None` means `<root>/.gitattributes`.
    pub rules_file: Option<PathBuf>,
    /// Ignore file override. `None` means `<root>/.gitignore`.
    pub ignore_file: Option<PathBuf>,
    /// Report removals without untracking anything.
    pub dry_run: bool,
    /// Directory names pruned from the tree walk.
    pub skip_dirs: Vec<OsString>,
    /// Options for compiling the ignore file.
    pub ignore_options: IgnoreOptions,
}

impl AuditConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules_file: None,
            ignore_file: None,
            dry_run: false,
            skip_dirs: Vec::new(),
            ignore_options: IgnoreOptions::default(),
        }
    }

    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    pub fn skip_dir(mut self, name: impl Into<OsString>) -> Self {
        self.skip_dirs.push(name.into());
        self
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_options.ignore_case = yes;
        self
    }

    /// The rules file this run reads.
    pub fn rules_path(&self) -> PathBuf {
        resolve(&self.root, self.rules_file.as_deref(), DEFAULT_RULES_FILE)
    }

    /// The ignore file this run reads.
    pub fn ignore_path(&self) -> PathBuf {
        resolve(&self.root, self.ignore_file.as_deref(), DEFAULT_IGNORE_FILE)
    }

    /// A tree indexer for the root with the configured pruning.
    pub fn indexer(&self) -> TreeIndexer {
        self.skip_dirs
            .iter()
            .fold(TreeIndexer::new(&self.root), |indexer, name| {
                indexer.skip_dir(name)
            })
    }
}

fn resolve(root: &Path, given: Option<&Path>, default: &str) -> PathBuf {
    match given {
        Some(path) => path.to_path_buf(),
        None => root.join(default),
    }
}
