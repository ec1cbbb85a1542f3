mod common;

use common::*;

#[test]
fn scenario_output() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["--skip-git-dir"]);
    assert_exit(&result, 0);

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines[0], dir.path().to_str().unwrap());
    assert_eq!(
        &lines[1..],
        [
            "rm 'a.log'",
            "unmanaged: .gitattributes",
            "unmanaged: .gitignore",
            "unmanaged: .log",
            "unmanaged: .png",
        ]
    );
    assert_eq!(tracked(dir.path()), [".gitattributes", "b.txt"]);
    assert!(dir.path().join("a.log").exists());
}

#[test]
fn second_run_is_quiet() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    assert_exit(&audit(dir.path(), &["--skip-git-dir"]), 0);
    let again = audit(dir.path(), &["--skip-git-dir"]);
    assert_exit(&again, 0);
    assert!(!again.stdout.contains("rm '"), "stdout: {}", again.stdout);
}

#[test]
fn root_argument_from_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    std::fs::create_dir(&repo).unwrap();
    setup_scenario_repo(&repo);

    let result = audit(dir.path(), &["repo", "--skip-git-dir"]);
    assert_exit(&result, 0);
    assert_eq!(result.stdout.lines().next(), repo.to_str());
    assert_eq!(tracked(&repo), [".gitattributes", "b.txt"]);
}

#[test]
fn root_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    std::fs::create_dir(&repo).unwrap();
    setup_scenario_repo(&repo);

    let result = audit_with_env(
        dir.path(),
        &["--skip-git-dir"],
        &[("REPO_AUDIT_ROOT", repo.to_str().unwrap())],
    );
    assert_exit(&result, 0);
    assert_eq!(tracked(&repo), [".gitattributes", "b.txt"]);
}

#[test]
fn root_from_dotenv_file() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    std::fs::create_dir(&repo).unwrap();
    setup_scenario_repo(&repo);
    write_file(dir.path(), ".env", "REPO_AUDIT_ROOT=repo\n");

    let result = audit(dir.path(), &["--skip-git-dir"]);
    assert_exit(&result, 0);
    assert_eq!(result.stdout.lines().next(), repo.to_str());
    assert_eq!(tracked(&repo), [".gitattributes", "b.txt"]);
}

#[test]
fn dry_run_keeps_index() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["--dry-run", "--skip-git-dir"]);
    assert_exit(&result, 0);
    assert!(result.stdout.contains("rm 'a.log'"));
    assert_eq!(tracked(dir.path()), [".gitattributes", "a.log", "b.txt"]);
}

#[test]
fn remove_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["--remove-from-disk", "--skip-git-dir"]);
    assert_exit(&result, 0);
    assert!(!dir.path().join("a.log").exists());
}

#[test]
fn exit_code_flag_reports_unmanaged() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    assert_exit(&audit(dir.path(), &["--skip-git-dir", "--exit-code"]), 1);

    write_file(
        dir.path(),
        ".gitattributes",
        "*.txt text\n*.log text\n*.png binary\n*.gitignore text\n*.gitattributes text\n",
    );
    assert_exit(&audit(dir.path(), &["--skip-git-dir", "--exit-code"]), 0);
}

#[test]
fn json_report() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["--json", "--skip-git-dir"]);
    assert_exit(&result, 0);

    let report: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(report["root"], dir.path().to_str().unwrap());
    assert_eq!(report["removed"], serde_json::json!(["a.log"]));
    assert_eq!(
        report["unmanaged"],
        serde_json::json!([".gitattributes", ".gitignore", ".log", ".png"])
    );
}

#[test]
fn missing_rules_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());
    std::fs::remove_file(dir.path().join(".gitattributes")).unwrap();

    let result = audit(dir.path(), &["--skip-git-dir"]);
    assert_exit(&result, 128);
    assert!(result.stderr.starts_with("fatal: "), "stderr: {}", result.stderr);
    assert!(result.stderr.contains(".gitattributes"));
    assert_eq!(tracked(dir.path()), [".gitattributes", "a.log", "b.txt"]);
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = audit(dir.path(), &["does-not-exist"]);
    assert_exit(&result, 128);
    assert!(result.stderr.starts_with("fatal: "), "stderr: {}", result.stderr);
}

#[test]
fn not_a_repository_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), ".gitattributes", "");
    write_file(dir.path(), ".gitignore", "");

    let result = audit_with_env(
        dir.path(),
        &[],
        &[("GIT_CEILING_DIRECTORIES", dir.path().parent().unwrap().to_str().unwrap())],
    );
    assert_exit(&result, 128);
    assert!(result.stderr.contains("ls-files"), "stderr: {}", result.stderr);
}

#[test]
fn custom_rule_files_and_ignore_case() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());
    write_file(dir.path(), "B.TXT", "upper\n");
    git(dir.path(), &["add", "B.TXT"]);
    write_file(dir.path(), "ci/attrs", "*.txt text\n*.TXT text\n");
    write_file(dir.path(), "ci/ignore", "b.txt\n");

    let result = audit(
        dir.path(),
        &[
            "--skip-git-dir",
            "--rules",
            "ci/attrs",
            "--ignore",
            "ci/ignore",
            "--ignore-case",
        ],
    );
    assert_exit(&result, 0);
    assert!(result.stdout.contains("rm 'B.TXT'"));
    assert!(result.stdout.contains("rm 'b.txt'"));
    assert!(!result.stdout.contains("rm 'a.log'"));
}

#[test]
fn help_exits_zero_and_bad_flag_exits_128() {
    let dir = tempfile::tempdir().unwrap();
    let help = audit(dir.path(), &["--help"]);
    assert_exit(&help, 0);
    assert!(help.stdout.contains("--dry-run"));

    assert_exit(&audit(dir.path(), &["--no-such-flag"]), 128);
}

#[test]
fn verbose_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["-v", "--skip-git-dir"]);
    assert_exit(&result, 0);
    assert!(result.stderr.contains("untracked ignored file"), "stderr: {}", result.stderr);
    assert!(!result.stdout.contains("untracked ignored file"));
}

#[cfg(unix)]
#[test]
fn earlier_removals_are_printed_when_a_later_one_fails() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    std::fs::create_dir(&repo).unwrap();
    git(&repo, &["init", "-q"]);
    write_file(&repo, "a.log", "");
    write_file(&repo, "b.log", "");
    write_file(&repo, ".gitattributes", "*.log text\n");
    git(&repo, &["add", "-A"]);
    write_file(&repo, ".gitignore", "*.log\n");

    let path = failing_git_path(&dir.path().join("bin"), "b.log");
    let result = audit_with_env(&repo, &["--skip-git-dir"], &[("PATH", path.as_str())]);

    assert_exit(&result, 128);
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(&lines[1..], ["rm 'a.log'"]);
    assert!(result.stderr.starts_with("fatal: "), "stderr: {}", result.stderr);
    assert!(result.stderr.contains("cannot remove b.log"));
    assert_eq!(tracked(&repo), [".gitattributes", "b.log"]);
}

#[test]
fn verbose_names_the_deciding_pattern() {
    let dir = tempfile::tempdir().unwrap();
    setup_scenario_repo(dir.path());

    let result = audit(dir.path(), &["-v", "--skip-git-dir"]);
    assert_exit(&result, 0);
    assert!(
        result.stderr.contains("path=a.log pattern=*.log line=1"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn glob_characters_in_names_are_matched_literally() {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    write_file(dir.path(), "x[1].log", "");
    write_file(dir.path(), "x1.log", "");
    write_file(dir.path(), ".gitattributes", "");
    git(dir.path(), &["add", "-A"]);
    write_file(dir.path(), ".gitignore", "*.log\n!x1.log\n");

    let result = audit(dir.path(), &["--skip-git-dir"]);
    assert_exit(&result, 0);
    assert!(result.stdout.contains("rm 'x[1].log'"));
    assert!(!result.stdout.contains("rm 'x1.log'"));
    assert_eq!(tracked(dir.path()), [".gitattributes", "x1.log"]);
}
