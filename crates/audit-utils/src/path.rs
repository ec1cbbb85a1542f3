//! Root-relative, forward-slash path handling.
//!
//! Paths are carried as byte strings so that non-UTF-8 file names survive
//! unchanged between the filesystem walk, the ignore matcher and the
//! version-control tool.

use std::path::Path;

use bstr::{BStr, BString, ByteSlice, ByteVec};

use crate::error::UtilError;
use crate::Result;

/// Whether `c` separates path components on this platform.
///
/// On Unix a backslash is an ordinary file-name byte.
#[cfg(windows)]
#[inline]
fn is_dir_sep(c: u8) -> bool {
    c == b'/' || c == b'\\'
}

#[cfg(not(windows))]
#[inline]
fn is_dir_sep(c: u8) -> bool {
    c == b'/'
}

/// Convert a native path into bytes with every separator rewritten to `/`.
pub fn to_slash(path: &Path) -> BString {
    #[cfg(unix)]
    let raw: BString = {
        use std::os::unix::ffi::OsStrExt;
        BString::from(path.as_os_str().as_bytes())
    };
    #[cfg(not(unix))]
    let raw: BString = BString::from(path.to_string_lossy().as_bytes());

    let mut out = BString::new(Vec::with_capacity(raw.len()));
    for &b in raw.iter() {
        out.push_byte(if is_dir_sep(b) { b'/' } else { b });
    }
    out
}

/// Path of `path` relative to `root`, slash-separated with no leading slash.
pub fn relative_to_root(root: &Path, path: &Path) -> Result<BString> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| UtilError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let mut out = to_slash(rel);
    while out.first() == Some(&b'/') {
        out.remove(0);
    }
    Ok(out)
}

/// Final component of a slash-separated path.
pub fn basename(path: &BStr) -> &BStr {
    match path.rfind_byte(b'/') {
        Some(pos) => BStr::new(&path[pos + 1..]),
        None => path,
    }
}

/// Every proper ancestor directory of `path`, shallowest first.
///
/// `a/b/c.txt` yields `a` then `a/b`.
pub fn ancestors(path: &BStr) -> impl Iterator<Item = &BStr> {
    path.iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'/' && i > 0)
        .map(move |(i, _)| BStr::new(&path[..i]))
}
