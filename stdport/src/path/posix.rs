//! The POSIX path grammar.
//!
//! Paths are `/`-separated with no drive. Exactly two leading slashes form a
//! distinct root (`//`), which is preserved; any other number of leading
//! slashes collapses to `/`.
//!
//! # Examples
//!
//! ```
//! use stdport::path::posix;
//!
//! assert_eq!(posix::normpath("/usr//local/./lib/../bin"), "/usr/local/bin");
//! assert_eq!(posix::join("/etc", ["ssh", "sshd_config"]).unwrap(), "/etc/ssh/sshd_config");
//! ```

use super::canonicalize::{self, RealpathMode};
use super::expand;
use super::normalize::{collapse, ext_index, join_components, trim_trailing_seps, Grammar, CURDIR, PARDIR};
use super::probe::{Environment, FileSystem};
use super::types::{PathKind, PathValue};
use crate::error::{Error, Result};

const SEP: u8 = b'/';

/// Marker type implementing the POSIX grammar.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Posix;

fn is_sep(b: u8) -> bool {
    b == SEP
}

fn is_abs_raw(path: &[u8]) -> bool {
    path.first() == Some(&SEP)
}

fn root_len(path: &[u8]) -> usize {
    match path {
        [b'/', b'/', b'/', ..] => 1,
        [b'/', b'/', ..] => 2,
        [b'/', ..] => 1,
        _ => 0,
    }
}

impl Grammar for Posix {
    const SEP: u8 = SEP;

    fn is_sep(b: u8) -> bool {
        is_sep(b)
    }

    fn anchor(_kind: PathKind, path: &[u8]) -> (usize, usize) {
        (0, root_len(path))
    }

    fn is_abs(_kind: PathKind, path: &[u8]) -> bool {
        is_abs_raw(path)
    }

    fn join_raw(_kind: PathKind, base: &[u8], part: &[u8]) -> Vec<u8> {
        if is_abs_raw(part) {
            return part.to_vec();
        }
        let mut out = base.to_vec();
        if !out.is_empty() && out.last() != Some(&SEP) {
            out.push(SEP);
        }
        out.extend_from_slice(part);
        out
    }

    fn normpath_raw(_kind: PathKind, path: &[u8]) -> Vec<u8> {
        if path.is_empty() {
            return CURDIR.to_vec();
        }
        let root = root_len(path);
        let comps = collapse(&path[root..], is_sep, root > 0);
        let out = join_components(&path[..root], &comps, SEP);
        if out.is_empty() {
            CURDIR.to_vec()
        } else {
            out
        }
    }

    fn absolutize(kind: PathKind, cwd: &[u8], path: &[u8]) -> Vec<u8> {
        if is_abs_raw(path) {
            path.to_vec()
        } else {
            Self::join_raw(kind, cwd, path)
        }
    }

    fn fold(_kind: PathKind, path: &[u8]) -> Vec<u8> {
        path.to_vec()
    }

    fn rebase(_kind: PathKind, _current: &[u8], _target_anchor: &[u8]) -> Vec<u8> {
        vec![SEP]
    }
}

/// Splits a path into `(drive, root, tail)`.
///
/// The drive is always empty. `drive + root + tail` reproduces the input.
///
/// # Examples
///
/// ```
/// use stdport::path::posix;
///
/// let (drive, root, tail) = posix::splitroot("//host/share");
/// assert_eq!((drive.as_bytes(), root.as_bytes(), tail.as_bytes()), (&b""[..], &b"//"[..], &b"host/share"[..]));
/// ```
pub fn splitroot(path: impl Into<PathValue>) -> (PathValue, PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let root = root_len(bytes);
    (
        kind.wrap(Vec::new()),
        kind.wrap(bytes[..root].to_vec()),
        kind.wrap(bytes[root..].to_vec()),
    )
}

/// Splits a path into `(drive, rest)`. The drive is always empty.
pub fn splitdrive(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    (path.kind().wrap(Vec::new()), path)
}

/// Case normalization is the identity on POSIX.
pub fn normcase(path: impl Into<PathValue>) -> PathValue {
    path.into()
}

/// Returns `true` if the path starts with `/`.
pub fn isabs(path: impl Into<PathValue>) -> bool {
    is_abs_raw(path.into().as_bytes())
}

/// Joins path components left to right.
///
/// A component starting with `/` discards everything before it.
///
/// # Errors
///
/// Returns a type error when text and byte components are mixed.
pub fn join<P, I>(base: P, parts: I) -> Result<PathValue>
where
    P: Into<PathValue>,
    I: IntoIterator,
    I::Item: Into<PathValue>,
{
    let base = base.into();
    let parts: Vec<PathValue> = parts.into_iter().map(Into::into).collect();
    let kind = PathKind::common(std::iter::once(&base).chain(&parts))?;
    let joined = parts.iter().fold(base.as_bytes().to_vec(), |acc, part| {
        Posix::join_raw(kind, &acc, part.as_bytes())
    });
    Ok(kind.wrap(joined))
}

fn split_raw(path: &[u8]) -> (&[u8], &[u8]) {
    let cut = path.iter().rposition(|&b| is_sep(b)).map_or(0, |i| i + 1);
    let (head, tail) = path.split_at(cut);
    (trim_trailing_seps(head, is_sep), tail)
}

/// Splits a path into `(head, tail)` at the last separator.
///
/// `tail` never contains a separator. Trailing separators are stripped from
/// `head` unless it is the root.
pub fn split(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let (head, tail) = split_raw(path.as_bytes());
    (kind.wrap(head.to_vec()), kind.wrap(tail.to_vec()))
}

/// Returns the final component of a path.
pub fn basename(path: impl Into<PathValue>) -> PathValue {
    split(path).1
}

/// Returns the directory component of a path.
pub fn dirname(path: impl Into<PathValue>) -> PathValue {
    split(path).0
}

/// Splits a path into `(root, ext)` where `ext` is empty or starts with a dot.
///
/// Leading dots of the last component do not start an extension.
///
/// # Examples
///
/// ```
/// use stdport::path::posix;
///
/// let (root, ext) = posix::splitext("archive.tar.gz");
/// assert_eq!(root, "archive.tar");
/// assert_eq!(ext, ".gz");
/// assert_eq!(posix::splitext(".bashrc").1, "");
/// ```
pub fn splitext(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let cut = ext_index(bytes, is_sep);
    (kind.wrap(bytes[..cut].to_vec()), kind.wrap(bytes[cut..].to_vec()))
}

/// Lexically normalizes a path.
///
/// Collapses redundant separators, `.` components and `name/..` pairs. A
/// `..` directly under the root is dropped. Does not consult the filesystem,
/// so the result may differ from [`realpath`] when symlinks are involved.
pub fn normpath(path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    kind.wrap(Posix::normpath_raw(kind, path.as_bytes()))
}

fn cwd_bytes<F: FileSystem + ?Sized>(fs: &F, kind: PathKind) -> Result<Vec<u8>> {
    let cwd = fs.getcwd()?;
    Ok(kind.os_bytes(cwd.as_os_str()))
}

fn abspath_raw<F: FileSystem + ?Sized>(fs: &F, kind: PathKind, path: &[u8]) -> Result<Vec<u8>> {
    let joined = if is_abs_raw(path) {
        path.to_vec()
    } else {
        Posix::join_raw(kind, &cwd_bytes(fs, kind)?, path)
    };
    Ok(Posix::normpath_raw(kind, &joined))
}

/// Returns a normalized absolute version of the path.
///
/// # Errors
///
/// Returns an I/O error when the working directory cannot be determined.
pub fn abspath<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> Result<PathValue> {
    let path = path.into();
    let kind = path.kind();
    Ok(kind.wrap(abspath_raw(fs, kind, path.as_bytes())?))
}

/// Returns a relative path from `start` (default `.`) to `path`.
///
/// # Errors
///
/// Returns a value error for an empty `path`, a type error when kinds are
/// mixed, and an I/O error when the working directory is unavailable.
pub fn relpath<F: FileSystem + ?Sized>(
    fs: &F,
    path: impl Into<PathValue>,
    start: Option<PathValue>,
) -> Result<PathValue> {
    let path = path.into();
    let kind = PathKind::common(std::iter::once(&path).chain(start.as_ref()))?;
    if path.is_empty() {
        return Err(Error::value_error("no path specified"));
    }
    let start_bytes = start.as_ref().map_or(CURDIR, PathValue::as_bytes);

    let start_abs = abspath_raw(fs, kind, start_bytes)?;
    let path_abs = abspath_raw(fs, kind, path.as_bytes())?;
    let start_list: Vec<&[u8]> = start_abs.split(|&b| is_sep(b)).filter(|c| !c.is_empty()).collect();
    let path_list: Vec<&[u8]> = path_abs.split(|&b| is_sep(b)).filter(|c| !c.is_empty()).collect();

    let common = start_list
        .iter()
        .zip(&path_list)
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel: Vec<&[u8]> = vec![PARDIR; start_list.len() - common];
    rel.extend_from_slice(&path_list[common..]);
    if rel.is_empty() {
        return Ok(kind.wrap(CURDIR.to_vec()));
    }
    Ok(kind.wrap(join_components(&[], &rel, SEP)))
}

/// Returns the longest common sub-path of every path in `paths`.
///
/// # Errors
///
/// Returns a value error for an empty sequence or when absolute and relative
/// paths are mixed, and a type error when kinds are mixed.
///
/// # Examples
///
/// ```
/// use stdport::path::posix;
///
/// assert_eq!(posix::commonpath(["/usr/lib", "/usr/local/lib"]).unwrap(), "/usr");
/// assert!(posix::commonpath(["/usr", "usr"]).is_err());
/// ```
pub fn commonpath<I>(paths: I) -> Result<PathValue>
where
    I: IntoIterator,
    I::Item: Into<PathValue>,
{
    let paths: Vec<PathValue> = paths.into_iter().map(Into::into).collect();
    if paths.is_empty() {
        return Err(Error::value_error("commonpath() arg is an empty iterable"));
    }
    let kind = PathKind::common(&paths)?;

    let absolute = is_abs_raw(paths[0].as_bytes());
    if paths.iter().any(|p| is_abs_raw(p.as_bytes()) != absolute) {
        return Err(Error::value_error("Can't mix absolute and relative paths"));
    }

    let split: Vec<Vec<&[u8]>> = paths
        .iter()
        .map(|p| {
            p.as_bytes()
                .split(|&b| is_sep(b))
                .filter(|c| !c.is_empty() && *c != CURDIR)
                .collect()
        })
        .collect();
    let first = &split[0];
    let common = split[1..].iter().fold(first.len(), |len, comps| {
        first
            .iter()
            .zip(comps)
            .take(len)
            .take_while(|(a, b)| a == b)
            .count()
    });

    let prefix: &[u8] = if absolute { b"/" } else { b"" };
    Ok(kind.wrap(join_components(prefix, &first[..common], SEP)))
}

/// Returns the canonical path, resolving every symlink component.
///
/// See [`RealpathMode`] for how probe failures and symlink loops are handled.
///
/// # Errors
///
/// In lenient mode only a failing working-directory lookup is reported. The
/// strict modes also report probe failures, loops and non-directory
/// intermediate components.
pub fn realpath<F: FileSystem + ?Sized>(
    fs: &F,
    path: impl Into<PathValue>,
    mode: RealpathMode,
) -> Result<PathValue> {
    let path = path.into();
    let kind = path.kind();
    let resolved = canonicalize::resolve::<Posix, F>(fs, kind, path.as_bytes(), mode, None)?;
    Ok(kind.wrap(resolved))
}

/// Returns `true` if `path` is a mount point.
///
/// A path is a mount point when it is not a symlink and its parent lives on
/// a different device or is the same inode. Probe failures yield `false`.
pub fn ismount<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    let path = path.into();
    let kind = path.kind();
    let Ok(st) = fs.lstat(&path.to_path_buf()) else {
        return false;
    };
    if st.is_symlink {
        return false;
    }
    let parent = Posix::join_raw(kind, path.as_bytes(), PARDIR);
    let Ok(parent_st) = fs.lstat(&kind.wrap(parent).to_path_buf()) else {
        return false;
    };
    st.dev != parent_st.dev || st.ino == parent_st.ino
}

/// Expands a leading `~` or `~user`.
///
/// Unresolvable references leave the path unchanged.
pub fn expanduser<E: Environment + ?Sized>(env: &E, path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    match expand::posix_user(env, kind, path.as_bytes()) {
        Some(expanded) => kind.wrap(expanded),
        None => path,
    }
}

/// Expands `$NAME` and `${NAME}` references.
///
/// Unknown variables are left unchanged.
pub fn expandvars<E: Environment + ?Sized>(env: &E, path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    match expand::posix_vars(env, kind, path.as_bytes()) {
        Some(expanded) => kind.wrap(expanded),
        None => path,
    }
}
