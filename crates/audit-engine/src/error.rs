use std::path::PathBuf;

use audit_rules::RulesError;
use audit_utils::UtilError;

/// Errors from an audit run. Every variant is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("cannot read directory '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed: {stderr}")]
    ExternalTool { command: String, stderr: String },

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Util(#[from] UtilError),
}
