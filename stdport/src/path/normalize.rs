//! Grammar-neutral normalization machinery.
//!
//! The POSIX and Windows grammars differ in how they parse anchors and which
//! bytes count as separators, but share the component-level algorithms:
//! collapsing `.`/`..`, locating extensions, and rebuilding paths. Those live
//! here, operating on raw bytes; the grammar modules wrap them in the
//! [`PathValue`](super::PathValue) API.

use super::types::PathKind;

pub(crate) const CURDIR: &[u8] = b".";
pub(crate) const PARDIR: &[u8] = b"..";

/// The operations the realpath engine and the shared helpers need from a
/// concrete path grammar.
pub(crate) trait Grammar {
    /// The preferred separator.
    const SEP: u8;

    /// Returns `true` for every byte the grammar accepts as a separator.
    fn is_sep(b: u8) -> bool;

    /// Returns the byte lengths of the drive and root prefixes.
    fn anchor(kind: PathKind, path: &[u8]) -> (usize, usize);

    /// Returns `true` if the path is absolute under this grammar.
    fn is_abs(kind: PathKind, path: &[u8]) -> bool;

    /// Joins one component onto a base path.
    fn join_raw(kind: PathKind, base: &[u8], part: &[u8]) -> Vec<u8>;

    /// Lexically normalizes a path.
    fn normpath_raw(kind: PathKind, path: &[u8]) -> Vec<u8>;

    /// Makes `path` absolute against `cwd` before symlink resolution.
    fn absolutize(kind: PathKind, cwd: &[u8], path: &[u8]) -> Vec<u8>;

    /// Returns the key under which a path is remembered during resolution.
    fn fold(kind: PathKind, path: &[u8]) -> Vec<u8>;

    /// Returns the anchor resolution continues from after meeting an
    /// anchored symlink target. `current` is the path resolved so far.
    fn rebase(kind: PathKind, current: &[u8], target_anchor: &[u8]) -> Vec<u8>;

    /// Returns the total anchor length (`drive + root`).
    fn anchor_len(kind: PathKind, path: &[u8]) -> usize {
        let (drive, root) = Self::anchor(kind, path);
        drive + root
    }
}

/// Collapses `.`, empty and `name/..` components of an anchor-free tail.
///
/// A `..` that would climb above an anchored path is dropped; on a relative
/// path it is kept.
pub(crate) fn collapse<F>(tail: &[u8], is_sep: F, rooted: bool) -> Vec<&[u8]>
where
    F: Fn(u8) -> bool,
{
    let mut out: Vec<&[u8]> = Vec::new();
    for comp in tail.split(|&b| is_sep(b)) {
        if comp.is_empty() || comp == CURDIR {
            continue;
        }
        if comp != PARDIR {
            out.push(comp);
            continue;
        }
        match out.last() {
            Some(&last) if last != PARDIR => {
                out.pop();
            }
            None if rooted => {}
            _ => out.push(comp),
        }
    }
    out
}

/// Concatenates components with `sep`.
pub(crate) fn join_components(prefix: &[u8], comps: &[&[u8]], sep: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + comps.iter().map(|c| c.len() + 1).sum::<usize>());
    out.extend_from_slice(prefix);
    for (i, comp) in comps.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.extend_from_slice(comp);
    }
    out
}

/// Returns the index at which the extension of `path` starts, or
/// `path.len()` when there is none.
///
/// The extension is everything from the last dot of the last component,
/// unless that component consists only of leading dots.
pub(crate) fn ext_index<F>(path: &[u8], is_sep: F) -> usize
where
    F: Fn(u8) -> bool,
{
    let sep_index = path.iter().rposition(|&b| is_sep(b));
    let Some(dot_index) = path.iter().rposition(|&b| b == b'.') else {
        return path.len();
    };
    let name_start = match sep_index {
        Some(i) if i > dot_index => return path.len(),
        Some(i) => i + 1,
        None => 0,
    };
    if path[name_start..dot_index].iter().any(|&b| b != b'.') {
        dot_index
    } else {
        path.len()
    }
}

/// Strips trailing separators from `head` unless it consists only of them.
pub(crate) fn trim_trailing_seps<F>(head: &[u8], is_sep: F) -> &[u8]
where
    F: Fn(u8) -> bool,
{
    if head.iter().all(|&b| is_sep(b)) {
        return head;
    }
    let end = head.iter().rposition(|&b| !is_sep(b)).map_or(0, |i| i + 1);
    &head[..end]
}
