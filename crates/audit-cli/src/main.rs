mod logging;
mod report;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use audit_engine::{run_audit_with, AuditConfig, GitGateway};
use clap::{error::ErrorKind, ArgAction, Parser};

/// Exit status when `--exit-code` is given and unmanaged extensions exist.
const EXIT_UNMANAGED: i32 = 1;

#[derive(Parser)]
#[command(
    name = "repo-audit",
    about = "Untrack ignored files and report extensions without .gitattributes rules",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Root of the working tree to audit
    #[arg(env = "REPO_AUDIT_ROOT", value_name = "ROOT")]
    root: Option<PathBuf>,

    /// Attribute rules file (default: <ROOT>/.gitattributes)
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Ignore rules file (default: <ROOT>/.gitignore)
    #[arg(long, value_name = "FILE")]
    ignore: Option<PathBuf>,

    /// Show what would be untracked without touching the index
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Delete untracked files from the working tree too
    #[arg(long)]
    remove_from_disk: bool,

    /// Do not descend into .git directories
    #[arg(long)]
    skip_git_dir: bool,

    /// Match ignore patterns case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Raise the log level (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Exit with status 1 when unmanaged extensions are found
    #[arg(long)]
    exit_code: bool,
}

fn main() {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(128),
            }
        }
    };

    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("fatal: {e}");
            process::exit(128);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let root = absolute_root(cli.root.as_deref().unwrap_or(Path::new(".")))?;
    tracing::debug!(root = %root.display(), "resolved audit root");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !cli.json {
        report::write_root(&root, &mut out)?;
        out.flush()?;
    }

    let mut config = AuditConfig::new(&root)
        .dry_run(cli.dry_run)
        .ignore_case(cli.ignore_case);
    if let Some(rules) = cli.rules {
        config = config.rules_file(rules);
    }
    if let Some(ignore) = cli.ignore {
        config = config.ignore_file(ignore);
    }
    if cli.skip_git_dir {
        config = config.skip_dir(".git");
    }
    let gateway = GitGateway::new().remove_from_disk(cli.remove_from_disk);

    // Each removal is printed as soon as git has untracked it.
    let json = cli.json;
    let mut write_error = None;
    let report = run_audit_with(&config, &gateway, |path| {
        if json || write_error.is_some() {
            return;
        }
        if let Err(e) = report::write_removal(path, &mut out) {
            write_error = Some(e);
        }
    })?;
    if let Some(e) = write_error {
        return Err(e.into());
    }

    if json {
        report::write_json(&report, &mut out)?;
    } else {
        report::write_unmanaged(&report, &mut out)?;
    }

    if cli.exit_code && report.has_unmanaged() {
        Ok(EXIT_UNMANAGED)
    } else {
        Ok(0)
    }
}

/// `root` joined onto the current directory, with `.` components removed.
fn absolute_root(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        return Ok(root.components().collect());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(root).components().collect())
}
