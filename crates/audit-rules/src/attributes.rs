//! Extension handling rules from `.gitattributes`.
//!
//! Only one declaration shape is recognized: `*.<ext> <cmd1> [<cmd2> ...]`,
//! where `<ext>` is made of word characters. Everything else in the file
//! (comments, path patterns, multi-part globs like `*.tar.gz`) is skipped
//! without complaint so that hand-edited files never break an audit.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use bstr::{BStr, BString, ByteSlice};
use regex::bytes::Regex;

use crate::{read_rule_file, RulesError};

/// `*` + dot-prefixed word extension + whitespace + non-empty remainder.
const DECLARATION: &str = r"^\*(\.\w+)\s+((?s-u:.)+)$";

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DECLARATION).expect("declaration pattern is valid"))
}

/// Mapping from extension (e.g. `.png`) to its ordered command tokens.
///
/// At most one entry exists per extension; a later declaration replaces
/// an earlier one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<BString, Vec<BString>>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a rules file.
    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let content = read_rule_file(path)?;
        let rules = Self::parse(&content);
        tracing::debug!(path = %path.display(), extensions = rules.len(), "loaded attribute rules");
        Ok(rules)
    }

    /// Parse declarations from raw file content.
    pub fn parse(content: &[u8]) -> Self {
        let mut set = Self::new();
        for line in content.lines() {
            set.parse_line(line);
        }
        set
    }

    fn parse_line(&mut self, line: &[u8]) {
        let line = line.trim();
        let Some(caps) = declaration_regex().captures(line) else {
            return;
        };
        let (Some(ext), Some(rest)) = (caps.get(1), caps.get(2)) else {
            return;
        };

        // Literal single-space split: consecutive spaces yield empty tokens.
        let commands: Vec<BString> = rest
            .as_bytes()
            .split(|&b| b == b' ')
            .map(BString::from)
            .collect();

        let ext = BString::from(ext.as_bytes());
        tracing::trace!(extension = %ext, commands = commands.len(), "attribute declaration");
        self.insert(ext, commands);
    }

    /// Declare `commands` for `extension`, returning the replaced tokens.
    pub fn insert(&mut self, extension: BString, commands: Vec<BString>) -> Option<Vec<BString>> {
        self.rules.insert(extension, commands)
    }

    /// Command tokens declared for `extension`.
    pub fn get(&self, extension: &BStr) -> Option<&[BString]> {
        self.rules.get(extension).map(Vec::as_slice)
    }

    pub fn contains(&self, extension: &BStr) -> bool {
        self.rules.contains_key(extension)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate declarations in extension order.
    pub fn iter(&self) -> impl Iterator<Item = (&BStr, &[BString])> {
        self.rules
            .iter()
            .map(|(ext, cmds)| (ext.as_bstr(), cmds.as_slice()))
    }
}
