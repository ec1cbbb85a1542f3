//! Declarative rule sources for a repository audit.
//!
//! Two files drive the audit:
//! - `.gitattributes`, read as `*.<ext> <command>...` declarations ([`RuleSet`])
//! - `.gitignore`, compiled into an [`IgnoreSpec`] with gitignore semantics

pub mod attributes;
pub mod ignore;

use std::path::Path;

pub use attributes::RuleSet;
pub use error::RulesError;
pub use ignore::{IgnoreOptions, IgnorePattern, IgnoreSpec};

mod error {
    use std::path::PathBuf;

    #[derive(Debug, thiserror::Error)]
    pub enum RulesError {
        #[error("unable to read '{path}': {source}")]
        ConfigNotFound {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
    }
}

/// Read a whole rule file, mapping any failure to [`RulesError::ConfigNotFound`].
pub(crate) fn read_rule_file(path: &Path) -> Result<Vec<u8>, RulesError> {
    std::fs::read(path).map_err(|source| RulesError::ConfigNotFound {
        path: path.to_path_buf(),
        source,
    })
}
