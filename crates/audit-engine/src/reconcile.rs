//! Joining the rule, tree, ignore and tracking views into actions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use audit_rules::{IgnoreSpec, RuleSet};
use bstr::{BStr, BString, ByteSlice};
use serde::{Serialize, Serializer};

use crate::config::AuditConfig;
use crate::gateway::{TrackedFileSet, VersionControlGateway};
use crate::tree::ExtensionIndex;
use crate::Result;

/// What an audit decided, before anything is executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Tracked paths matched by the ignore rules, in index order.
    pub removals: Vec<BString>,
    /// Extension keys present in the tree with no attribute rule.
    pub unmanaged: BTreeSet<BString>,
}

/// Outcome of an audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub root: PathBuf,
    /// Paths untracked by this run.
    #[serde(serialize_with = "lossy_seq")]
    pub removed: Vec<BString>,
    /// Paths a dry run would have untracked.
    #[serde(serialize_with = "lossy_seq")]
    pub would_remove: Vec<BString>,
    #[serde(serialize_with = "lossy_seq")]
    pub unmanaged: BTreeSet<BString>,
}

impl AuditReport {
    pub fn has_unmanaged(&self) -> bool {
        !self.unmanaged.is_empty()
    }
}

fn lossy_seq<'a, T, S>(paths: &'a T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    &'a T: IntoIterator<Item = &'a BString>,
    S: Serializer,
{
    serializer.collect_seq(paths.into_iter().map(|p| p.to_str_lossy()))
}

/// Decide removals and unmanaged extensions. Performs no I/O.
///
/// A path is removed when it is both tracked and ignored. Every extension
/// key in the tree without a rule is unmanaged, whether or not its files
/// are tracked or ignored.
pub fn reconcile(
    rules: &RuleSet,
    index: &ExtensionIndex,
    ignore: &IgnoreSpec,
    tracked: &TrackedFileSet,
) -> Reconciliation {
    let mut plan = Reconciliation::default();
    for (key, paths) in index.iter() {
        for path in paths {
            let path = path.as_bstr();
            if !tracked.contains(path) {
                continue;
            }
            let Some(pattern) = ignore.matching_pattern(path, false) else {
                continue;
            };
            if pattern.negated {
                continue;
            }
            tracing::debug!(
                path = %path,
                pattern = %pattern.raw,
                line = pattern.line,
                "tracked file is ignored"
            );
            plan.removals.push(BString::from(path.as_bytes()));
        }
        if !key.is_empty() && !rules.contains(key) {
            plan.unmanaged.insert(BString::from(key.as_bytes()));
        }
    }
    plan
}

/// Execute the removals of `plan` against `gateway`.
///
/// Removals run in order; the first failure is returned and the rest are
/// not attempted. With `dry_run` the gateway is never called.
pub fn apply(
    plan: &Reconciliation,
    gateway: &dyn VersionControlGateway,
    root: &Path,
    dry_run: bool,
) -> Result<AuditReport> {
    apply_with(plan, gateway, root, dry_run, |_| {})
}

/// Like [`apply`], calling `on_removed` for each path as soon as it has
/// been untracked (or, on a dry run, selected).
///
/// When a later removal fails, the callback has already seen every path
/// that was untracked before it.
pub fn apply_with(
    plan: &Reconciliation,
    gateway: &dyn VersionControlGateway,
    root: &Path,
    dry_run: bool,
    mut on_removed: impl FnMut(&BStr),
) -> Result<AuditReport> {
    let mut report = AuditReport {
        root: root.to_path_buf(),
        removed: Vec::new(),
        would_remove: Vec::new(),
        unmanaged: plan.unmanaged.clone(),
    };

    for path in &plan.removals {
        if dry_run {
            tracing::info!(path = %path, "would untrack ignored file");
            on_removed(path.as_bstr());
            report.would_remove.push(path.clone());
            continue;
        }
        if let Err(e) = gateway.untrack(root, path.as_bstr()) {
            tracing::warn!(
                path = %path,
                untracked = report.removed.len(),
                "untrack failed, stopping"
            );
            return Err(e);
        }
        tracing::info!(path = %path, "untracked ignored file");
        on_removed(path.as_bstr());
        report.removed.push(path.clone());
    }

    Ok(report)
}

/// Run a complete audit.
///
/// Rule files are read before the tree is touched, so a missing rules or
/// ignore file fails the run without any removal.
pub fn run_audit(config: &AuditConfig, gateway: &dyn VersionControlGateway) -> Result<AuditReport> {
    run_audit_with(config, gateway, |_| {})
}

/// [`run_audit`] with a per-removal callback, see [`apply_with`].
pub fn run_audit_with(
    config: &AuditConfig,
    gateway: &dyn VersionControlGateway,
    on_removed: impl FnMut(&BStr),
) -> Result<AuditReport> {
    let rules = RuleSet::from_file(&config.rules_path())?;
    let ignore = IgnoreSpec::from_file(&config.ignore_path(), config.ignore_options)?;
    let index = config.indexer().index()?;
    let tracked = gateway.list_tracked_files(&config.root)?;

    let plan = reconcile(&rules, &index, &ignore, &tracked);
    tracing::debug!(
        removals = plan.removals.len(),
        unmanaged = plan.unmanaged.len(),
        "reconciled"
    );
    apply_with(&plan, gateway, &config.root, config.dry_run, on_removed)
}
