//! Working-tree index keyed by file extension.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use audit_utils::path::{basename, relative_to_root};
use bstr::{BStr, BString, ByteSlice};

use crate::error::AuditError;
use crate::Result;

/// Extension key of a file name.
///
/// Leading dots belong to the stem, so `.gitignore` keys as itself. After
/// that, the last `.` followed by at least one byte starts the key
/// (`a.tar.gz` keys as `.gz`). Names without such a suffix (`Makefile`,
/// `foo.`) key as the whole name.
pub fn extension_key(file_name: &BStr) -> BString {
    let stem_start = file_name
        .iter()
        .position(|&b| b != b'.')
        .unwrap_or(file_name.len());
    match file_name[stem_start..].rfind_byte(b'.') {
        Some(pos) if stem_start + pos + 1 < file_name.len() => {
            BString::from(&file_name[stem_start + pos..])
        }
        _ => BString::from(file_name.as_bytes()),
    }
}

/// Files of a tree grouped by extension key.
///
/// Paths are root-relative with `/` separators, in traversal order within
/// each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionIndex {
    entries: BTreeMap<BString, Vec<BString>>,
}

impl ExtensionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under the key derived from its basename.
    pub fn insert(&mut self, path: BString) {
        let key = extension_key(basename(path.as_bstr()));
        self.entries.entry(key).or_default().push(path);
    }

    /// Paths recorded under `key`.
    pub fn get(&self, key: &BStr) -> Option<&[BString]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &BStr) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys with their paths, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&BStr, &[BString])> {
        self.entries
            .iter()
            .map(|(k, paths)| (k.as_bstr(), paths.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files indexed.
    pub fn file_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Recursive walk of a working tree.
///
/// Nothing is filtered unless a directory name is registered with
/// [`TreeIndexer::skip_dir`]. Symlinks are recorded as files and never
/// followed.
#[derive(Debug, Clone)]
pub struct TreeIndexer {
    root: PathBuf,
    skip_dirs: Vec<OsString>,
}

impl TreeIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_dirs: Vec::new(),
        }
    }

    /// Prune every directory called `name`, at any depth.
    pub fn skip_dir(mut self, name: impl Into<OsString>) -> Self {
        self.skip_dirs.push(name.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and build the index.
    pub fn index(&self) -> Result<ExtensionIndex> {
        let mut index = ExtensionIndex::new();
        self.walk(&self.root, &mut index)?;
        tracing::debug!(
            root = %self.root.display(),
            files = index.file_count(),
            extensions = index.len(),
            "indexed working tree"
        );
        Ok(index)
    }

    fn walk(&self, dir: &Path, index: &mut ExtensionIndex) -> Result<()> {
        let fs_error = |source| AuditError::Filesystem {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(dir)
            .map_err(fs_error)?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(fs_error)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(fs_error)?;

            if file_type.is_dir() {
                if self.skip_dirs.iter().any(|name| *name == entry.file_name()) {
                    tracing::trace!(path = %path.display(), "skipping directory");
                    continue;
                }
                self.walk(&path, index)?;
            } else {
                index.insert(relative_to_root(&self.root, &path)?);
            }
        }
        Ok(())
    }
}
