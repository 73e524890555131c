//! Byte-stable textual canonicalization of paths and argument strings.
//!
//! Every stored path uses the Windows textual model: `\` separators, rooted
//! when it starts with a drive prefix (`C:`) or a separator. Full-path
//! resolution is a pure string operation, so the functions here behave the
//! same on every host and never fail: input that cannot be resolved is
//! passed through trimmed.

use super::tokens::canonicalize_tokens;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Separator used by every canonical path.
pub const SEPARATOR: char = '\\';

/// Characters that make a path unresolvable (the full-path step is skipped).
const INVALID_PATH_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

/// Replaces every `/` with `\`.
#[must_use]
pub fn normalize_separators(value: &str) -> String {
    value.replace('/', "\\")
}

/// Returns true for `C:…`, `\…` and `/…` paths.
#[must_use]
pub fn is_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    match bytes {
        [b'\\' | b'/', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Resolves a rooted path to its absolute canonical text.
///
/// Collapses repeated separators, drops trailing whitespace of segments and
/// `.` segments, and applies `..` without ever climbing above the root.
/// Returns `None` when the path is not rooted or contains characters no file
/// system path may contain.
#[must_use]
pub fn full_path(path: &str) -> Option<String> {
    let value = normalize_separators(path.trim());
    if !is_rooted(&value)
        || value
            .chars()
            .any(|c| INVALID_PATH_CHARS.contains(&c) || c.is_control())
    {
        return None;
    }

    let (prefix, rest) = split_root(&value);
    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(SEPARATOR) {
        match segment.trim_end() {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut full = prefix;
    if !segments.is_empty() {
        if !full.ends_with(SEPARATOR) {
            full.push(SEPARATOR);
        }
        full.push_str(&segments.join("\\"));
    }
    Some(full)
}

/// Splits a rooted, separator-normalized path into its root and remainder.
fn split_root(value: &str) -> (String, &str) {
    if let Some(unc) = value.strip_prefix("\\\\") {
        let mut parts = unc.splitn(3, SEPARATOR);
        let server = parts.next().unwrap_or_default();
        let share = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        let mut prefix = String::from("\\\\");
        prefix.push_str(server);
        if !share.is_empty() {
            prefix.push(SEPARATOR);
            prefix.push_str(share);
        }
        return (prefix, rest);
    }

    if let Some(rest) = value.strip_prefix(SEPARATOR) {
        return (SEPARATOR.to_string(), rest);
    }

    // Drive prefix; a drive-relative `C:foo` is treated as `C:\foo`.
    let (drive, rest) = value.split_at(2);
    (format!("{drive}\\"), rest)
}

/// Length of the root prefix of a canonical path (`C:\` → 3, `\` → 1).
fn root_len(path: &str) -> usize {
    if !is_rooted(path) {
        return 0;
    }
    let (prefix, _) = split_root(path);
    prefix.len().min(path.len())
}

/// General-purpose path normalization used by the tokenizer, resolver and
/// scanner: trimmed, `\` separators, absolute form when rooted, no trailing
/// separator unless the path is a bare root.
///
/// Relative paths keep their relative form.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let value = normalize_separators(trimmed);
    let Some(full) = full_path(&value) else {
        return value;
    };

    let root = root_len(&full);
    let stripped = full.trim_end_matches(SEPARATOR);
    if stripped.len() < root {
        full
    } else {
        stripped.to_string()
    }
}

/// Canonical form of a possibly tokenized path.
///
/// Trims, normalizes separators, resolves rooted paths, re-cases known
/// tokens (`{gamesroot}` → `{GamesRoot}`) and strips trailing separators
/// while never collapsing a bare drive root. Idempotent.
#[must_use]
pub fn normalize_token_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut value = normalize_separators(trimmed);
    if is_rooted(&value)
        && let Some(full) = full_path(&value)
    {
        value = full;
    }

    value = canonicalize_tokens(&value);

    loop {
        let before = value.len();
        while value.len() > 3 && value.ends_with(SEPARATOR) {
            value.pop();
        }
        value.truncate(value.trim_end().len());
        if value.len() == before {
            break;
        }
    }

    value
}

/// Collapses unquoted whitespace runs to a single space.
///
/// Whitespace inside `"…"` is kept verbatim. An unbalanced quote leaves the
/// rest of the string in quoted state, which is accepted.
#[must_use]
pub fn normalize_arguments(arguments: &str) -> String {
    let trimmed = arguments.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut in_quotes = false;
    let mut previous_space = false;

    for ch in trimmed.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            out.push(ch);
            previous_space = false;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !previous_space {
                out.push(' ');
                previous_space = true;
            }
            continue;
        }

        out.push(ch);
        previous_space = false;
    }

    out.trim().to_string()
}

/// Case-folds a canonical path for identity purposes, keeping the canonical
/// spelling of tokens.
fn fold_identity_path(path: &str) -> String {
    canonicalize_tokens(&normalize_token_path(path).to_lowercase())
}

/// Builds `target=<T>|args=<A>|workdir=<W>`, the hashing input of a launch
/// identity.
///
/// Paths are folded to lower case outside of tokens; arguments keep their
/// case.
#[must_use]
pub fn build_identity_string(target: &str, arguments: &str, working_directory: &str) -> String {
    format!(
        "target={}|args={}|workdir={}",
        fold_identity_path(target),
        normalize_arguments(arguments),
        fold_identity_path(working_directory)
    )
}

/// SHA-256 of the UTF-8 bytes of `value`, lower-case hex.
#[must_use]
pub fn compute_sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Case-insensitive comparison of two normalized paths.
#[must_use]
pub fn paths_equal(left: &str, right: &str) -> bool {
    eq_ignore_case(&normalize_path(left), &normalize_path(right))
}

/// Unicode-aware case-insensitive string equality.
#[must_use]
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right) || left.to_lowercase() == right.to_lowercase()
}

/// Case-insensitive substring test. An empty needle never matches.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Returns the remainder of `path` below `root` when `path` equals `root`
/// (empty remainder) or is nested under it. Both inputs must already be
/// normalized.
#[must_use]
pub fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if path.is_empty() || root.is_empty() {
        return None;
    }
    let head = path.get(..root.len())?;
    if !eq_ignore_case(head, root) {
        return None;
    }
    let rest = &path[root.len()..];
    if rest.is_empty() {
        return Some(rest);
    }
    if root.ends_with(SEPARATOR) {
        return Some(rest);
    }
    rest.strip_prefix(SEPARATOR)
}

/// True when `path` equals `folder` or lies strictly inside it.
#[must_use]
pub fn is_within(path: &str, folder: &str) -> bool {
    strip_root(&normalize_path(path), &normalize_path(folder)).is_some()
}

/// Directory part of a canonical path (`C:\a\b.exe` → `C:\a`).
///
/// Returns `None` for a bare root or a path without separators.
#[must_use]
pub fn parent(path: &str) -> Option<String> {
    let normalized = normalize_path(path);
    let root = root_len(&normalized);
    if normalized.len() <= root {
        return None;
    }
    let index = normalized.rfind(SEPARATOR)?;
    if index < root {
        return Some(normalized[..root].to_string());
    }
    Some(normalized[..index].to_string())
}

/// Last segment of a canonical path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['\\', '/']);
    trimmed
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(trimmed)
}

/// File name without its last extension.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    }
}

/// Path below `root` of a directory, empty when it is the root itself or
/// not nested under it.
#[must_use]
pub fn relative_to(root: &str, directory: &str) -> String {
    let root = normalize_path(root);
    let directory = normalize_path(directory);
    strip_root(&directory, &root)
        .map(|rest| rest.trim_start_matches(SEPARATOR).to_string())
        .unwrap_or_default()
}

/// Number of directory segments in a relative path.
#[must_use]
pub fn depth(relative: &str) -> usize {
    relative.split(['\\', '/']).filter(|s| !s.is_empty()).count()
}

/// Maps a canonical path onto the host file system.
#[must_use]
pub fn to_fs_path(canonical: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(canonical)
    } else {
        PathBuf::from(canonical.replace(SEPARATOR, "/"))
    }
}

/// Canonical text of a host path.
#[must_use]
pub fn from_fs_path(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}
