//! Glob matching with gitignore `wildmatch` semantics.
//!
//! Supports `*`, `?`, bracket expressions (ranges, `!`/`^` negation and POSIX
//! classes), backslash escapes, and `**` spanning directories when the
//! pattern is matched in [`WildmatchFlags::PATHNAME`] mode.

use bstr::{BStr, BString, ByteSlice};

bitflags::bitflags! {
    /// Flags controlling wildmatch behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WildmatchFlags: u32 {
        /// Case-insensitive matching (ASCII only).
        const CASEFOLD = 0x01;
        /// `*` and `?` never match `/`; only `**` crosses directories.
        const PATHNAME = 0x02;
    }
}

/// Outcome of one matching attempt.
///
/// The two abort variants let an outer `*` stop retrying early: once the
/// text is exhausted nothing further can match, and a single `*` that would
/// have to swallow a `/` can only be rescued by an enclosing `**`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Match,
    NoMatch,
    AbortAll,
    AbortToStarStar,
}

/// Byte at `i`, or NUL past the end. Patterns and paths never contain NUL.
#[inline]
fn at(s: &[u8], i: usize) -> u8 {
    s.get(i).copied().unwrap_or(0)
}

#[inline]
fn fold(c: u8, flags: WildmatchFlags) -> u8 {
    if flags.contains(WildmatchFlags::CASEFOLD) {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

fn is_glob_special(c: u8) -> bool {
    matches!(c, b'*' | b'?' | b'[' | b'\\')
}

fn match_at(pattern: &[u8], text: &[u8], flags: WildmatchFlags) -> Outcome {
    let pathname = flags.contains(WildmatchFlags::PATHNAME);
    let mut p = 0;
    let mut t = 0;

    while p < pattern.len() {
        let p_ch = fold(pattern[p], flags);
        let t_ch = fold(at(text, t), flags);
        if t >= text.len() && p_ch != b'*' {
            return Outcome::AbortAll;
        }

        match p_ch {
            b'\\' => {
                p += 1;
                if t_ch != at(pattern, p) {
                    return Outcome::NoMatch;
                }
            }
            b'?' => {
                if pathname && t_ch == b'/' {
                    return Outcome::NoMatch;
                }
            }
            b'*' => {
                p += 1;
                let match_slash = if at(pattern, p) == b'*' {
                    let before = p.checked_sub(2);
                    while at(pattern, p) == b'*' {
                        p += 1;
                    }
                    let after = at(pattern, p);
                    let starts_segment = before.map_or(true, |i| pattern[i] == b'/');
                    let ends_segment = after == 0
                        || after == b'/'
                        || (after == b'\\' && at(pattern, p + 1) == b'/');
                    if !pathname {
                        true
                    } else if starts_segment && ends_segment {
                        // "**/" may also match zero directories.
                        if after == b'/'
                            && match_at(&pattern[p + 1..], &text[t..], flags) == Outcome::Match
                        {
                            return Outcome::Match;
                        }
                        true
                    } else {
                        false
                    }
                } else {
                    !pathname
                };

                if p >= pattern.len() {
                    if !match_slash && text[t..].contains(&b'/') {
                        return Outcome::AbortToStarStar;
                    }
                    return Outcome::Match;
                }

                if !match_slash && pattern[p] == b'/' {
                    // A lone `*` before `/` can only consume the rest of this segment.
                    match text[t..].find_byte(b'/') {
                        Some(offset) => {
                            t += offset + 1;
                            p += 1;
                            continue;
                        }
                        None => return Outcome::AbortAll,
                    }
                }

                return star_scan(&pattern[p..], &text[t..], flags, match_slash);
            }
            b'[' => {
                p += 1;
                match match_bracket(pattern, &mut p, t_ch, flags) {
                    Some(true) => {}
                    Some(false) => return Outcome::NoMatch,
                    None => return Outcome::AbortAll,
                }
            }
            _ => {
                if t_ch != p_ch {
                    return Outcome::NoMatch;
                }
            }
        }

        p += 1;
        t += 1;
    }

    if t < text.len() {
        Outcome::NoMatch
    } else {
        Outcome::Match
    }
}

/// Try the remainder of the pattern at every position a `*` could stop at.
fn star_scan(rest: &[u8], text: &[u8], flags: WildmatchFlags, match_slash: bool) -> Outcome {
    let literal = at(rest, 0);
    let skip_to_literal = !rest.is_empty() && !is_glob_special(literal);
    let literal = fold(literal, flags);

    let mut t = 0;
    while t < text.len() {
        if skip_to_literal {
            while t < text.len() && fold(text[t], flags) != literal {
                if !match_slash && text[t] == b'/' {
                    return Outcome::AbortToStarStar;
                }
                t += 1;
            }
            if t >= text.len() {
                return Outcome::AbortAll;
            }
        }

        let outcome = match_at(rest, &text[t..], flags);
        if outcome != Outcome::NoMatch {
            if !match_slash || outcome != Outcome::AbortToStarStar {
                return outcome;
            }
        } else if !match_slash && text[t] == b'/' {
            return Outcome::AbortToStarStar;
        }
        t += 1;
    }

    Outcome::AbortAll
}

/// Evaluate a bracket expression starting just after `[`.
///
/// On return `p` points at the closing `]`. `None` means the expression is
/// malformed (unterminated or an unknown `[:class:]`).
fn match_bracket(pattern: &[u8], p: &mut usize, t_ch: u8, flags: WildmatchFlags) -> Option<bool> {
    let casefold = flags.contains(WildmatchFlags::CASEFOLD);

    let mut p_ch = at(pattern, *p);
    if p_ch == b'^' {
        p_ch = b'!';
    }
    let negated = p_ch == b'!';
    if negated {
        *p += 1;
        p_ch = at(pattern, *p);
    }

    let mut prev_ch = 0u8;
    let mut matched = false;

    loop {
        if p_ch == 0 {
            return None;
        }

        if p_ch == b'\\' {
            *p += 1;
            p_ch = at(pattern, *p);
            if p_ch == 0 {
                return None;
            }
            if t_ch == fold(p_ch, flags) {
                matched = true;
            }
        } else if p_ch == b'-'
            && prev_ch != 0
            && at(pattern, *p + 1) != 0
            && at(pattern, *p + 1) != b']'
        {
            *p += 1;
            p_ch = at(pattern, *p);
            if p_ch == b'\\' {
                *p += 1;
                p_ch = at(pattern, *p);
                if p_ch == 0 {
                    return None;
                }
            }
            if (prev_ch..=p_ch).contains(&t_ch) {
                matched = true;
            } else if casefold && t_ch.is_ascii_lowercase() {
                if (prev_ch..=p_ch).contains(&t_ch.to_ascii_uppercase()) {
                    matched = true;
                }
            }
            // A finished range cannot start another one.
            p_ch = 0;
        } else if p_ch == b'[' && at(pattern, *p + 1) == b':' {
            let class_start = *p + 2;
            let mut end = class_start;
            while at(pattern, end) != 0 && at(pattern, end) != b']' {
                end += 1;
            }
            if at(pattern, end) == 0 {
                return None;
            }
            if end == class_start || pattern[end - 1] != b':' {
                // No ":]" terminator: the '[' is an ordinary member.
                if t_ch == b'[' {
                    matched = true;
                }
            } else {
                let class = &pattern[class_start..end - 1];
                if match_char_class(class, t_ch, flags)? {
                    matched = true;
                }
                *p = end;
                p_ch = 0;
            }
        } else if t_ch == fold(p_ch, flags) {
            matched = true;
        }

        prev_ch = p_ch;
        *p += 1;
        p_ch = at(pattern, *p);
        if p_ch == b']' {
            break;
        }
    }

    let slash_blocked = flags.contains(WildmatchFlags::PATHNAME) && t_ch == b'/';
    Some(matched != negated && !slash_blocked)
}

/// Test `ch` against a POSIX class name. `None` for unknown classes.
fn match_char_class(class: &[u8], ch: u8, flags: WildmatchFlags) -> Option<bool> {
    let hit = match class {
        b"alnum" => ch.is_ascii_alphanumeric(),
        b"alpha" => ch.is_ascii_alphabetic(),
        b"blank" => ch == b' ' || ch == b'\t',
        b"cntrl" => ch.is_ascii_control(),
        b"digit" => ch.is_ascii_digit(),
        b"graph" => ch.is_ascii_graphic(),
        b"lower" => ch.is_ascii_lowercase(),
        b"print" => ch.is_ascii_graphic() || ch == b' ',
        b"punct" => ch.is_ascii_punctuation(),
        b"space" => ch.is_ascii_whitespace(),
        b"upper" => {
            ch.is_ascii_uppercase()
                || (flags.contains(WildmatchFlags::CASEFOLD) && ch.is_ascii_lowercase())
        }
        b"xdigit" => ch.is_ascii_hexdigit(),
        _ => return None,
    };
    Some(hit)
}

/// Compiled wildmatch pattern for repeated matching.
///
/// Patterns without any glob metacharacter are compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildmatchPattern {
    pattern: BString,
    flags: WildmatchFlags,
    literal: bool,
}

impl WildmatchPattern {
    /// Compile a pattern.
    pub fn new(pattern: &BStr, flags: WildmatchFlags) -> Self {
        Self {
            pattern: pattern.into(),
            flags,
            literal: !pattern.iter().any(|&b| is_glob_special(b)),
        }
    }

    /// Match against text. Returns true if the pattern matches.
    pub fn matches(&self, text: &BStr) -> bool {
        if self.literal {
            return if self.flags.contains(WildmatchFlags::CASEFOLD) {
                self.pattern.eq_ignore_ascii_case(text)
            } else {
                self.pattern.as_bytes() == text.as_bytes()
            };
        }
        wildmatch(self.pattern.as_ref(), text, self.flags)
    }

    /// The pattern source.
    pub fn as_bstr(&self) -> &BStr {
        self.pattern.as_ref()
    }

    pub fn flags(&self) -> WildmatchFlags {
        self.flags
    }

    /// True when the pattern contains no glob metacharacters.
    pub fn is_literal(&self) -> bool {
        self.literal
    }
}

/// Match `text` against `pattern` under `flags`.
pub fn wildmatch(pattern: &BStr, text: &BStr, flags: WildmatchFlags) -> bool {
    match_at(pattern.as_bytes(), text.as_bytes(), flags) == Outcome::Match
}
