//! Gitignore pattern matching.
//!
//! Compiles the lines of a root `.gitignore` into an [`IgnoreSpec`] and
//! answers whether a root-relative path is ignored:
//! - blank lines and `#` comments are inert; `\#` and `\!` escape them
//! - a trailing `/` restricts a pattern to directories
//! - a pattern containing `/` (leading or inside) is anchored to the root,
//!   otherwise it matches the basename at any depth
//! - `!` re-includes, and the last matching pattern wins
//! - a path inside an ignored directory stays ignored, whatever follows

use std::path::Path;

use audit_utils::path::{ancestors, basename};
use audit_utils::wildmatch::{WildmatchFlags, WildmatchPattern};
use bstr::{BStr, BString, ByteSlice};

use crate::{read_rule_file, RulesError};

/// Options applied to every pattern at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoreOptions {
    /// Match case-insensitively, like `core.ignorecase`.
    pub ignore_case: bool,
}

/// A single compiled ignore pattern.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    /// The compiled wildmatch pattern.
    pub pattern: WildmatchPattern,
    /// The line as written in the file, trailing whitespace removed.
    pub raw: BString,
    /// 1-based line number in the source text.
    pub line: usize,
    /// Whether the pattern is negated (`!`).
    pub negated: bool,
    /// Whether the pattern only matches directories.
    pub directory_only: bool,
    /// Whether the pattern is matched against the full path rather than the basename.
    pub anchored: bool,
}

impl IgnorePattern {
    fn matches_path(&self, path: &BStr, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }
        if self.anchored {
            self.pattern.matches(path)
        } else {
            self.pattern.matches(basename(path))
        }
    }
}

/// Compiled ignore rules. Matching is pure: it never touches the filesystem.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSpec {
    /// Patterns in file order; the last match wins.
    patterns: Vec<IgnorePattern>,
}

impl IgnoreSpec {
    /// A spec with no patterns; nothing is ignored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile raw gitignore content.
    pub fn compile(content: &[u8]) -> Self {
        Self::compile_with(content, IgnoreOptions::default())
    }

    /// Compile raw gitignore content with explicit options.
    pub fn compile_with(content: &[u8], options: IgnoreOptions) -> Self {
        let mut flags = WildmatchFlags::PATHNAME;
        if options.ignore_case {
            flags |= WildmatchFlags::CASEFOLD;
        }
        let patterns = content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| parse_ignore_line(line, i + 1, flags))
            .collect();
        Self { patterns }
    }

    /// Read and compile an ignore file.
    pub fn from_file(path: &Path, options: IgnoreOptions) -> Result<Self, RulesError> {
        let content = read_rule_file(path)?;
        let spec = Self::compile_with(&content, options);
        tracing::debug!(path = %path.display(), patterns = spec.len(), "compiled ignore rules");
        Ok(spec)
    }

    /// Whether `path` is ignored. A trailing `/` marks it as a directory.
    pub fn matches(&self, path: &BStr) -> bool {
        match path.strip_suffix(b"/") {
            Some(dir) => self.is_ignored(BStr::new(dir), true),
            None => self.is_ignored(path, false),
        }
    }

    /// Whether `path` is ignored, given whether it names a directory.
    pub fn is_ignored(&self, path: &BStr, is_dir: bool) -> bool {
        self.matching_pattern(path, is_dir)
            .map_or(false, |pat| !pat.negated)
    }

    /// The pattern that decides `path`, if any.
    ///
    /// A returned negated pattern means the path was explicitly re-included.
    pub fn matching_pattern(&self, path: &BStr, is_dir: bool) -> Option<&IgnorePattern> {
        for dir in ancestors(path) {
            if let Some(pat) = self.last_match(dir, true) {
                if !pat.negated {
                    return Some(pat);
                }
            }
        }
        self.last_match(path, is_dir)
    }

    fn last_match(&self, path: &BStr, is_dir: bool) -> Option<&IgnorePattern> {
        self.patterns
            .iter()
            .rev()
            .find(|pat| pat.matches_path(path, is_dir))
    }

    /// Compiled patterns in file order.
    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Number of patterns compiled.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Parse a single line from a gitignore file.
fn parse_ignore_line(line: &[u8], number: usize, flags: WildmatchFlags) -> Option<IgnorePattern> {
    if line.is_empty() || line[0] == b'#' {
        return None;
    }

    // Strip trailing spaces unless escaped with a backslash.
    let mut line = line;
    while line.last() == Some(&b' ') && !(line.len() > 1 && line[line.len() - 2] == b'\\') {
        line = &line[..line.len() - 1];
    }
    if line.is_empty() {
        return None;
    }
    let raw = BString::from(line);

    let negated = line[0] == b'!';
    if negated {
        line = &line[1..];
    }

    if line.len() > 1 && line[0] == b'\\' && (line[1] == b'#' || line[1] == b'!') {
        line = &line[1..];
    }

    let directory_only = line.last() == Some(&b'/');
    if directory_only {
        line = &line[..line.len() - 1];
    }

    let anchored = line.contains(&b'/');
    if line.first() == Some(&b'/') {
        line = &line[1..];
    }
    if line.is_empty() {
        return None;
    }

    Some(IgnorePattern {
        pattern: WildmatchPattern::new(BStr::new(line), flags),
        raw,
        line: number,
        negated,
        directory_only,
        anchored,
    })
}
