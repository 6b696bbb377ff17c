//! Helper functions for diff parsing.

use regex::Regex;
use std::sync::LazyLock;

/// Brace form of a numstat rename, e.g. `src/{old => new}/lib.rs`.
static BRACE_RENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.*)\{(?P<old>.*) => (?P<new>.*)\}(?P<suffix>.*)$")
        .expect("Invalid rename regex")
});

/// Parse the file path from the remainder of a "diff --git" line.
///
/// Handles various formats:
/// - "a/path/to/file b/path/to/file" (normal)
/// - "a/path/to/file b/path/to/renamed" (rename)
/// - "\"a/with space\" \"b/with space\"" (quoted)
///
/// Returns the unquoted "b/" path, falling back to the "a/" path when no
/// "b/" side is present. Returns None if neither side can be found.
pub(super) fn parse_diff_git_line(rest: &str) -> Option<String> {
    let rest = rest.trim_end();

    // Identical sides are by far the most common case, and splitting them in
    // half is the only unambiguous answer when the path contains " b/".
    if let Some(path) = split_symmetric(rest) {
        return Some(path);
    }

    if let Some(path) = rightmost_b_side(rest) {
        return Some(path);
    }

    let first = rest.split_whitespace().next()?;
    let first = unquote_path(first);
    first
        .strip_prefix("a/")
        .map(|p| p.to_string())
        .filter(|p| !p.is_empty())
}

/// `a/P b/P` -> `P` when both sides carry the same path.
fn split_symmetric(rest: &str) -> Option<String> {
    if rest.len() % 2 == 0 {
        return None;
    }
    let half = rest.len() / 2;
    if !rest.is_char_boundary(half) || !rest.is_char_boundary(half + 1) {
        return None;
    }
    let (a_side, b_side) = (&rest[..half], &rest[half + 1..]);
    if rest.as_bytes()[half] != b' ' {
        return None;
    }

    let a_path = unquote_path(a_side);
    let b_path = unquote_path(b_side);
    let a_path = a_path.strip_prefix("a/")?;
    let b_path = b_path.strip_prefix("b/")?;
    (a_path == b_path && !b_path.is_empty()).then(|| b_path.to_string())
}

/// Path following the rightmost ` b/` or ` "b/` segment.
fn rightmost_b_side(rest: &str) -> Option<String> {
    for (idx, _) in rest.rmatch_indices("b/") {
        let before = &rest[..idx];
        let segment = if before.ends_with(" \"") {
            &rest[idx - 1..]
        } else if before.ends_with(' ') {
            &rest[idx..]
        } else {
            continue;
        };

        let unquoted = unquote_path(segment);
        let path = unquoted
            .strip_prefix("b/")
            .unwrap_or(&unquoted)
            .trim_matches(|c: char| c.is_whitespace() || c == '"');
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }
    None
}

/// Undo git's C-style path quoting.
///
/// Git wraps paths with special characters in double quotes and escapes
/// control characters, quotes, backslashes and non-ASCII bytes (as octal).
/// Unquoted input is returned trimmed but otherwise untouched.
pub(super) fn unquote_path(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Resolve numstat rename notation to the post-image path.
///
/// - `old => new` becomes `new`
/// - `src/{old => new}/lib.rs` becomes `src/new/lib.rs`
/// - `src/{ => nested}/lib.rs` becomes `src/nested/lib.rs`
pub(super) fn resolve_rename(path: &str) -> String {
    if let Some(caps) = BRACE_RENAME_REGEX.captures(path) {
        let joined = format!("{}{}{}", &caps["prefix"], &caps["new"], &caps["suffix"]);
        return joined.replace("//", "/");
    }

    match path.split_once(" => ") {
        Some((_, new)) => new.to_string(),
        None => path.to_string(),
    }
}

/// Parse the start lines of a hunk header.
///
/// Format: "@@ -old_start,old_len +new_start,new_len @@ optional context".
/// The lengths are optional. Returns `(old_start, new_start)`; if either
/// start fails to parse both default to 0.
pub(super) fn parse_hunk_header(line: &str) -> (usize, usize) {
    let mut tokens = line.split_whitespace().skip(1);
    let old_start = tokens.next().and_then(|t| parse_range_start(t, '-'));
    let new_start = tokens.next().and_then(|t| parse_range_start(t, '+'));

    match (old_start, new_start) {
        (Some(old), Some(new)) => (old, new),
        _ => (0, 0),
    }
}

/// Parse the start line from a range token like "-12,4" or "+7".
fn parse_range_start(token: &str, marker: char) -> Option<usize> {
    let range = token.strip_prefix(marker)?;
    let start = range.split(',').next().unwrap_or(range);
    start.parse().ok()
}
