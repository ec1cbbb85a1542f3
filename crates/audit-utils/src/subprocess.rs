use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use bstr::{BStr, ByteSlice};

use crate::error::UtilError;
use crate::Result;

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct CommandOutput {
    /// The exit status.
    pub status: ExitStatus,
    /// Captured stdout.
    pub stdout: Vec<u8>,
    /// Captured stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns true if the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Split stdout on NUL terminators, as produced by `-z` style output.
    pub fn stdout_records(&self) -> impl Iterator<Item = &BStr> {
        self.stdout
            .split_str(b"\0")
            .filter(|record| !record.is_empty())
            .map(BStr::new)
    }

    /// Stderr as trimmed, lossily decoded text for diagnostics.
    pub fn stderr_text(&self) -> String {
        self.stderr.trim().to_str_lossy().into_owned()
    }
}

/// Builder for running the version-control tool.
///
/// Defaults to the `git` binary found on `PATH`. Stdin is closed; stdout
/// and stderr are captured so callers can surface the tool's own
/// diagnostics.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl GitCommand {
    /// Create a builder for `git`.
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Create a builder for an arbitrary program.
    pub fn with_program(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    /// Run against the repository at `root` (`git -C <root>`).
    pub fn repo(self, root: impl AsRef<Path>) -> Self {
        self.arg("-C").arg(root.as_ref())
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Self {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// The command line, for error messages.
    pub fn command_string(&self) -> String {
        let mut s = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            s.push(' ');
            s.push_str(&arg.to_string_lossy());
        }
        s
    }

    /// Run the command to completion, capturing output.
    ///
    /// Only a failure to launch or wait on the process is an error here; a
    /// non-zero exit is reported through [`CommandOutput::success`].
    pub fn run(&self) -> Result<CommandOutput> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| UtilError::Subprocess {
                command: self.command_string(),
                source: e,
            })?;
        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new()
    }
}
