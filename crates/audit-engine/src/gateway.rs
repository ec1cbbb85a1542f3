//! Boundary to the version-control tool.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use audit_utils::subprocess::{CommandOutput, GitCommand};
use bstr::{BStr, BString, ByteSlice};

use crate::error::AuditError;
use crate::Result;

/// Root-relative paths that version control reports as tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFileSet {
    paths: HashSet<BString>,
}

impl TrackedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<BString>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &BStr) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<P: Into<BString>> FromIterator<P> for TrackedFileSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Operations the audit needs from version control.
pub trait VersionControlGateway {
    /// Paths tracked in the repository at `root`.
    fn list_tracked_files(&self, root: &Path) -> Result<TrackedFileSet>;

    /// Stop tracking `path` (root-relative) in the repository at `root`.
    fn untrack(&self, root: &Path, path: &BStr) -> Result<()>;
}

/// [`VersionControlGateway`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitGateway {
    program: OsString,
    remove_from_disk: bool,
}

impl GitGateway {
    pub fn new() -> Self {
        Self {
            program: OsString::from("git"),
            remove_from_disk: false,
        }
    }

    /// Use a different executable in place of `git`.
    pub fn with_program(mut self, program: impl AsRef<OsStr>) -> Self {
        self.program = program.as_ref().to_os_string();
        self
    }

    /// Delete untracked files from the working tree as well (`git rm`
    /// without `--cached`).
    pub fn remove_from_disk(mut self, yes: bool) -> Self {
        self.remove_from_disk = yes;
        self
    }

    /// Paths are passed as literal names, never as glob pathspecs.
    fn command(&self, root: &Path) -> GitCommand {
        GitCommand::with_program(&self.program)
            .repo(root)
            .arg("--literal-pathspecs")
    }

    fn rm_args(&self) -> Vec<&'static str> {
        let mut args = vec!["rm"];
        if !self.remove_from_disk {
            args.push("--cached");
        }
        args.extend(["--quiet", "--"]);
        args
    }
}

impl Default for GitGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a non-zero exit into [`AuditError::ExternalTool`].
fn check(cmd: &GitCommand, output: CommandOutput) -> Result<CommandOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(AuditError::ExternalTool {
            command: cmd.command_string(),
            stderr: output.stderr_text(),
        })
    }
}

impl VersionControlGateway for GitGateway {
    fn list_tracked_files(&self, root: &Path) -> Result<TrackedFileSet> {
        let cmd = self.command(root).args(["ls-files", "-z"]);
        let output = check(&cmd, cmd.run()?)?;
        let tracked: TrackedFileSet = output
            .stdout_records()
            .map(|record| BString::from(record.as_bytes()))
            .collect();
        tracing::debug!(root = %root.display(), tracked = tracked.len(), "listed tracked files");
        Ok(tracked)
    }

    fn untrack(&self, root: &Path, path: &BStr) -> Result<()> {
        let cmd = self
            .command(root)
            .args(self.rm_args())
            .arg(path.to_os_str_lossy());
        check(&cmd, cmd.run()?)?;
        Ok(())
    }
}
