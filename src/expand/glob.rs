//! Glob expansion against a [`VirtualFilesystem`].
//!
//! Patterns are forensic paths whose segments may contain `*`, `?` and
//! `[..]` wildcards, plus the recursive segment `**` with an optional
//! depth bound (`**2`). Matching never touches the real filesystem
//! directly; every probe goes through the capability trait.

use anyhow::{bail, Context, Result};
use glob::Pattern;

use crate::constants::DEFAULT_GLOB_DEPTH;
use crate::vfs::{self, VirtualFilesystem};

/// Expand a glob pattern into the existing paths it matches, unordered.
///
/// A pattern without wildcards acts as an existence filter: the path is
/// returned iff it exists. Unreadable directories contribute no matches;
/// only a malformed pattern is an error.
pub fn glob(fs: &dyn VirtualFilesystem, pattern: &str) -> Result<Vec<String>> {
    if !pattern.starts_with('/') {
        bail!("glob pattern must be a rooted forensic path: {pattern}");
    }

    // The root is the empty prefix; joining appends "/segment".
    let mut prefixes = vec![String::new()];
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if prefixes.is_empty() {
            break;
        }
        prefixes = if let Some(depth) = recursive_depth(segment) {
            let mut collected = Vec::new();
            for prefix in &prefixes {
                descendants(fs, prefix, depth, &mut collected);
            }
            collected
        } else if has_wildcards(segment) {
            let matcher = Pattern::new(segment)
                .with_context(|| format!("invalid glob segment: {segment}"))?;
            let mut matched = Vec::new();
            for prefix in &prefixes {
                if let Ok(entries) = fs.list_directory(directory(prefix)) {
                    for entry in entries {
                        if matcher.matches(&entry) {
                            matched.push(vfs::join(prefix, &entry));
                        }
                    }
                }
            }
            matched
        } else {
            prefixes
                .iter()
                .map(|prefix| vfs::join(prefix, segment))
                .filter(|candidate| vfs::exists(fs, candidate))
                .collect()
        };
    }

    Ok(prefixes
        .into_iter()
        .map(|path| if path.is_empty() { "/".to_string() } else { path })
        .collect())
}

/// `**` or `**N` segments recurse; everything else matches one level.
fn recursive_depth(segment: &str) -> Option<usize> {
    let rest = segment.strip_prefix("**")?;
    if rest.is_empty() {
        Some(DEFAULT_GLOB_DEPTH)
    } else {
        rest.parse().ok()
    }
}

fn has_wildcards(segment: &str) -> bool {
    segment.chars().any(|c| matches!(c, '*' | '?' | '['))
}

fn directory(prefix: &str) -> &str {
    if prefix.is_empty() {
        "/"
    } else {
        prefix
    }
}

/// Collect every path below `path`, directories and files alike, up to
/// `depth` levels down.
fn descendants(fs: &dyn VirtualFilesystem, path: &str, depth: usize, out: &mut Vec<String>) {
    if depth == 0 {
        return;
    }
    if let Ok(entries) = fs.list_directory(directory(path)) {
        for entry in entries {
            let child = vfs::join(path, &entry);
            out.push(child.clone());
            descendants(fs, &child, depth - 1, out);
        }
    }
}
