//! Shared harness for repo-audit integration tests.
//!
//! Runs the built binary and real `git` with a pinned environment so that
//! user and system configuration never leak into results.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured output from running a command.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Path to the compiled `repo-audit` binary.
pub fn audit_bin() -> PathBuf {
    let mut path = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    path.push("repo-audit");
    path
}

fn pin_env(cmd: &mut Command, dir: &Path) {
    cmd.env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test Committer")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .env("LC_ALL", "C")
        .env("LANG", "C")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", dir.parent().unwrap_or(dir))
        .env_remove("REPO_AUDIT_ROOT")
        .env_remove("RUST_LOG");
}

fn capture(cmd: &mut Command, what: &str) -> CommandResult {
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("failed to run {what}: {e}"));
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// Run C git in `dir`.
pub fn git(dir: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd, dir);
    capture(&mut cmd, "git")
}

/// Run `repo-audit` in `dir`.
pub fn audit(dir: &Path, args: &[&str]) -> CommandResult {
    audit_with_env(dir, args, &[])
}

/// Run `repo-audit` in `dir` with extra environment variables.
pub fn audit_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> CommandResult {
    let mut cmd = Command::new(audit_bin());
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd, dir);
    for (key, val) in env {
        cmd.env(key, val);
    }
    capture(&mut cmd, "repo-audit")
}

/// Write `content` to `rel` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Tracked paths, one per line as `git ls-files` prints them.
pub fn tracked(dir: &Path) -> Vec<String> {
    git(dir, &["ls-files"])
        .stdout
        .lines()
        .map(str::to_owned)
        .collect()
}

/// A repository where `a.log` and `b.txt` are committed, `*.log` is
/// ignored afterwards, `c.png` is untracked and only `.txt` has a rule.
pub fn setup_scenario_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    write_file(dir, "a.log", "log\n");
    write_file(dir, "b.txt", "text\n");
    write_file(dir, ".gitattributes", "*.txt text\n");
    git(dir, &["add", "a.log", "b.txt", ".gitattributes"]);
    git(dir, &["commit", "-q", "-m", "initial"]);
    write_file(dir, ".gitignore", "*.log\n");
    write_file(dir, "c.png", "png\n");
}

/// Assert exit code, including both streams on failure.
pub fn assert_exit(result: &CommandResult, expected: i32) {
    assert_eq!(
        result.exit_code, expected,
        "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
        result.stdout, result.stderr
    );
}

/// Install a `git` wrapper in `bin_dir` that fails any command naming
/// `fail_path` and hands everything else to the real git.
///
/// Returns a `PATH` value with `bin_dir` first.
#[cfg(unix)]
pub fn failing_git_path(bin_dir: &Path, fail_path: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let real = Command::new("sh")
        .args(["-c", "command -v git"])
        .output()
        .expect("failed to locate git");
    let real = String::from_utf8_lossy(&real.stdout).trim().to_string();
    assert!(!real.is_empty(), "git not found on PATH");

    let script = format!(
        "#!/bin/sh\n\
         for arg in \"$@\"; do\n\
         \x20 if [ \"$arg\" = '{fail_path}' ]; then echo 'fatal: cannot remove {fail_path}' >&2; exit 1; fi\n\
         done\n\
         exec '{real}' \"$@\"\n"
    );
    let wrapper = bin_dir.join("git");
    fs::create_dir_all(bin_dir).unwrap();
    fs::write(&wrapper, script).unwrap();
    fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755)).unwrap();

    let path = std::env::var("PATH").unwrap_or_default();
    format!("{}:{path}", bin_dir.display())
}
