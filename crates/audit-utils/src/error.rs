use std::path::PathBuf;

/// Base error type for audit-utils operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("path '{path}' is outside of '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("subprocess failed: {command}: {source}")]
    Subprocess {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
