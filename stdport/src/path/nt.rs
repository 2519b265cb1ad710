//! The Windows (NT) path grammar.
//!
//! A path is `[drive][root][tail]`. The drive is a letter drive (`C:`), a UNC
//! share (`\\server\share`, `\\?\UNC\server\share`) or a device prefix
//! (`\\?\C:`, `\\.\PhysicalDrive0`). `/` is accepted as an alternate
//! separator everywhere; results built by this module use `\`.
//!
//! # Examples
//!
//! ```
//! use stdport::path::nt;
//!
//! assert_eq!(nt::normpath("C:/Users//me/../you"), "C:\\Users\\you");
//! assert!(nt::isabs("\\\\server\\share"));
//! assert!(!nt::isabs("\\Windows"));
//! ```

use super::canonicalize::{self, RealpathMode};
use super::expand;
use super::normalize::{collapse, ext_index, join_components, Grammar, CURDIR, PARDIR};
use super::probe::{Environment, FileSystem};
use super::types::{PathKind, PathValue};
use crate::error::{Error, Result};

const SEP: u8 = b'\\';
const ALTSEP: u8 = b'/';
const UNC_PREFIX: &[u8] = b"\\\\?\\UNC\\";

/// Marker type implementing the NT grammar.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Nt;

fn is_sep(b: u8) -> bool {
    b == SEP || b == ALTSEP
}

fn to_sep(b: u8) -> u8 {
    if b == ALTSEP {
        SEP
    } else {
        b
    }
}

fn find_sep(path: &[u8], from: usize) -> Option<usize> {
    path.get(from..)?
        .iter()
        .position(|&b| is_sep(b))
        .map(|i| from + i)
}

/// Returns the byte lengths of the drive and root of `path`.
fn splitroot_raw(kind: PathKind, path: &[u8]) -> (usize, usize) {
    let first = path.first().copied().map(to_sep);
    let second = path.get(1).copied().map(to_sep);

    if first == Some(SEP) {
        if second != Some(SEP) {
            return (0, 1);
        }
        let is_unc = path.len() >= UNC_PREFIX.len()
            && path[..UNC_PREFIX.len()]
                .iter()
                .map(|&b| to_sep(b).to_ascii_uppercase())
                .eq(UNC_PREFIX.iter().copied());
        let start = if is_unc { UNC_PREFIX.len() } else { 2 };

        // A missing or empty server or share segment is not a drive.
        let Some(index) = find_sep(path, start) else {
            return (0, 0);
        };
        if index == start {
            return (0, 0);
        }
        return match find_sep(path, index + 1) {
            None if index + 1 == path.len() => (0, 0),
            None => (path.len(), 0),
            Some(index2) if index2 == index + 1 => (0, 0),
            Some(index2) => (index2, 1),
        };
    }

    let letter = kind.char_len(path);
    if letter > 0 && path.get(letter) == Some(&b':') {
        let root = usize::from(path.get(letter + 1).copied().is_some_and(is_sep));
        return (letter + 1, root);
    }
    (0, 0)
}

fn is_abs_raw(kind: PathKind, path: &[u8]) -> bool {
    let first = path.first().copied().map(to_sep);
    let second = path.get(1).copied().map(to_sep);
    if first == Some(SEP) && second == Some(SEP) {
        return true;
    }
    let letter = kind.char_len(path);
    letter > 0
        && path.get(letter) == Some(&b':')
        && path.get(letter + 1).copied().is_some_and(is_sep)
}

fn normcase_raw(kind: PathKind, path: &[u8]) -> Vec<u8> {
    let unified: Vec<u8> = path.iter().map(|&b| to_sep(b)).collect();
    kind.lowercase(&unified)
}

/// Splits at the last separator after the anchor, stripping the separators
/// between head and tail.
pub(crate) fn split_raw(kind: PathKind, path: &[u8]) -> (&[u8], &[u8]) {
    let anchor = Nt::anchor_len(kind, path);
    let rest = &path[anchor..];
    let cut = rest.iter().rposition(|&b| is_sep(b)).map_or(0, |i| i + 1);
    let head_end = rest[..cut]
        .iter()
        .rposition(|&b| !is_sep(b))
        .map_or(0, |i| i + 1);
    (&path[..anchor + head_end], &rest[cut..])
}

impl Grammar for Nt {
    const SEP: u8 = SEP;

    fn is_sep(b: u8) -> bool {
        is_sep(b)
    }

    fn anchor(kind: PathKind, path: &[u8]) -> (usize, usize) {
        splitroot_raw(kind, path)
    }

    fn is_abs(kind: PathKind, path: &[u8]) -> bool {
        is_abs_raw(kind, path)
    }

    fn join_raw(kind: PathKind, base: &[u8], part: &[u8]) -> Vec<u8> {
        let (bd, br) = splitroot_raw(kind, base);
        let (pd, pr) = splitroot_raw(kind, part);
        let (p_drive, p_root, p_path) = (&part[..pd], &part[pd..pd + pr], &part[pd + pr..]);

        let mut drive = &base[..bd];
        let mut root = &base[bd..bd + br];
        let mut path = base[bd + br..].to_vec();

        if !p_root.is_empty() {
            if !p_drive.is_empty() || drive.is_empty() {
                drive = p_drive;
            }
            root = p_root;
            path = p_path.to_vec();
        } else if !p_drive.is_empty()
            && p_drive != drive
            && kind.lowercase(p_drive) != kind.lowercase(drive)
        {
            drive = p_drive;
            root = p_root;
            path = p_path.to_vec();
        } else {
            if !p_drive.is_empty() {
                drive = p_drive;
            }
            if path.last().is_some_and(|&b| !is_sep(b)) {
                path.push(SEP);
            }
            path.extend_from_slice(p_path);
        }

        let mut out = Vec::with_capacity(drive.len() + root.len() + path.len() + 1);
        out.extend_from_slice(drive);
        // A UNC drive needs a separator before a relative tail.
        if !path.is_empty()
            && root.is_empty()
            && drive.last().is_some_and(|&b| b != b':' && !is_sep(b))
        {
            out.push(SEP);
        }
        out.extend_from_slice(root);
        out.extend_from_slice(&path);
        out
    }

    fn normpath_raw(kind: PathKind, path: &[u8]) -> Vec<u8> {
        let unified: Vec<u8> = path.iter().map(|&b| to_sep(b)).collect();
        let (drive, root) = splitroot_raw(kind, &unified);
        let mut prefix = unified[..drive + root].to_vec();
        let mut tail = &unified[drive + root..];

        // Leading separators of a malformed UNC path collapse into a root.
        if prefix.is_empty() && tail.first() == Some(&SEP) {
            prefix.push(SEP);
            let skip = tail.iter().take_while(|&&b| b == SEP).count();
            tail = &tail[skip..];
        }

        let rooted = prefix.last() == Some(&SEP);
        let comps = collapse(tail, is_sep, rooted);
        if prefix.is_empty() && comps.is_empty() {
            return CURDIR.to_vec();
        }
        join_components(&prefix, &comps, SEP)
    }

    fn absolutize(kind: PathKind, cwd: &[u8], path: &[u8]) -> Vec<u8> {
        if is_abs_raw(kind, path) {
            Self::normpath_raw(kind, path)
        } else {
            Self::normpath_raw(kind, &Self::join_raw(kind, cwd, path))
        }
    }

    fn fold(kind: PathKind, path: &[u8]) -> Vec<u8> {
        normcase_raw(kind, path)
    }

    fn rebase(kind: PathKind, current: &[u8], target_anchor: &[u8]) -> Vec<u8> {
        let (drive, _) = splitroot_raw(kind, target_anchor);
        let mut out: Vec<u8> = if drive > 0 {
            target_anchor.iter().map(|&b| to_sep(b)).collect()
        } else {
            let (current_drive, _) = splitroot_raw(kind, current);
            current[..current_drive].to_vec()
        };
        if out.last() != Some(&SEP) {
            out.push(SEP);
        }
        out
    }
}

/// Splits a path into `(drive, root, tail)`.
///
/// `drive + root + tail` reproduces the input exactly, alternate separators
/// included. A UNC path missing its server or share segment has no drive
/// and is returned entirely as tail.
///
/// # Examples
///
/// ```
/// use stdport::path::nt;
///
/// let (drive, root, tail) = nt::splitroot("\\\\server\\share\\dir\\file");
/// assert_eq!(drive, "\\\\server\\share");
/// assert_eq!(root, "\\");
/// assert_eq!(tail, "dir\\file");
///
/// let (drive, root, tail) = nt::splitroot("C:relative");
/// assert_eq!((drive.to_string(), root.to_string(), tail.to_string()),
///            ("C:".to_string(), String::new(), "relative".to_string()));
/// ```
pub fn splitroot(path: impl Into<PathValue>) -> (PathValue, PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let (drive, root) = splitroot_raw(kind, bytes);
    (
        kind.wrap(bytes[..drive].to_vec()),
        kind.wrap(bytes[drive..drive + root].to_vec()),
        kind.wrap(bytes[drive + root..].to_vec()),
    )
}

/// Splits a path into `(drive, rest)`.
pub fn splitdrive(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let (drive, _) = splitroot_raw(kind, bytes);
    (
        kind.wrap(bytes[..drive].to_vec()),
        kind.wrap(bytes[drive..].to_vec()),
    )
}

/// Converts `/` to `\` and lowercases.
pub fn normcase(path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    kind.wrap(normcase_raw(kind, path.as_bytes()))
}

/// Returns `true` for UNC and device paths and for paths with both a drive
/// and a root. A root without a drive (`\x`) is relative to the current
/// drive and therefore not absolute.
pub fn isabs(path: impl Into<PathValue>) -> bool {
    let path = path.into();
    is_abs_raw(path.kind(), path.as_bytes())
}

/// Joins path components left to right.
///
/// A component with a root replaces the accumulated path but keeps its
/// drive; a component on a different drive replaces everything.
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
        Nt::join_raw(kind, &acc, part.as_bytes())
    });
    Ok(kind.wrap(joined))
}

/// Splits a path into `(head, tail)` at the last separator after the anchor.
pub fn split(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let (head, tail) = split_raw(kind, path.as_bytes());
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

/// Splits a path into `(root, ext)`. Both separators end a component.
pub fn splitext(path: impl Into<PathValue>) -> (PathValue, PathValue) {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let cut = ext_index(bytes, is_sep);
    (kind.wrap(bytes[..cut].to_vec()), kind.wrap(bytes[cut..].to_vec()))
}

/// Lexically normalizes a path, converting separators to `\`.
pub fn normpath(path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    kind.wrap(Nt::normpath_raw(kind, path.as_bytes()))
}

fn abspath_raw<F: FileSystem + ?Sized>(fs: &F, kind: PathKind, path: &[u8]) -> Result<Vec<u8>> {
    if is_abs_raw(kind, path) {
        return Ok(Nt::normpath_raw(kind, path));
    }
    let cwd = fs.getcwd()?;
    Ok(Nt::absolutize(kind, &kind.os_bytes(cwd.as_os_str()), path))
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

fn components(rest: &[u8]) -> Vec<&[u8]> {
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(|&b| b == SEP).collect()
    }
}

/// Returns a relative path from `start` (default `.`) to `path`.
///
/// Components are compared case-insensitively.
///
/// # Errors
///
/// Returns a value error for an empty `path` or when the two paths are on
/// different drives, and a type error when kinds are mixed.
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
    let (start_drive, start_root) = splitroot_raw(kind, &start_abs);
    let (path_drive, path_root) = splitroot_raw(kind, &path_abs);

    if normcase_raw(kind, &start_abs[..start_drive]) != normcase_raw(kind, &path_abs[..path_drive]) {
        return Err(Error::value_error(format!(
            "path is on mount '{}', start on mount '{}'",
            kind.wrap(path_abs[..path_drive].to_vec()),
            kind.wrap(start_abs[..start_drive].to_vec()),
        )));
    }

    let start_list = components(&start_abs[start_drive + start_root..]);
    let path_list = components(&path_abs[path_drive + path_root..]);
    let common = start_list
        .iter()
        .zip(&path_list)
        .take_while(|(a, b)| normcase_raw(kind, a) == normcase_raw(kind, b))
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
/// Components are compared case-insensitively; the result keeps the
/// spelling of the first path.
///
/// # Errors
///
/// Returns a value error for an empty sequence, when absolute and relative
/// paths are mixed, or when the drives differ. Returns a type error when
/// kinds are mixed.
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

    let folded: Vec<Vec<u8>> = paths.iter().map(|p| normcase_raw(kind, p.as_bytes())).collect();
    let anchors: Vec<(&[u8], &[u8], &[u8])> = folded
        .iter()
        .map(|p| {
            let (d, r) = splitroot_raw(kind, p);
            (&p[..d], &p[d..d + r], &p[d + r..])
        })
        .collect();

    if anchors.iter().any(|(_, r, _)| *r != anchors[0].1) {
        return Err(Error::value_error("Can't mix absolute and relative paths"));
    }
    if anchors.iter().any(|(d, _, _)| *d != anchors[0].0) {
        return Err(Error::value_error("Paths don't have the same drive"));
    }

    fn keep(c: &&[u8]) -> bool {
        !c.is_empty() && *c != CURDIR
    }

    let split_paths: Vec<Vec<&[u8]>> = anchors
        .iter()
        .map(|(_, _, tail)| tail.split(|&b| b == SEP).filter(keep).collect())
        .collect();
    let first_split = &split_paths[0];
    let common = split_paths[1..].iter().fold(first_split.len(), |len, comps| {
        first_split
            .iter()
            .zip(comps)
            .take(len)
            .take_while(|(a, b)| a == b)
            .count()
    });

    let first: Vec<u8> = paths[0].as_bytes().iter().map(|&b| to_sep(b)).collect();
    let (d, r) = splitroot_raw(kind, &first);
    let spelled: Vec<&[u8]> = first[d + r..].split(|&b| b == SEP).filter(keep).collect();
    Ok(kind.wrap(join_components(&first[..d + r], &spelled[..common], SEP)))
}

/// Returns the canonical path, resolving every symlink component.
///
/// The input is made absolute and normalized first.
///
/// # Errors
///
/// See [`posix::realpath`](super::posix::realpath).
pub fn realpath<F: FileSystem + ?Sized>(
    fs: &F,
    path: impl Into<PathValue>,
    mode: RealpathMode,
) -> Result<PathValue> {
    let path = path.into();
    let kind = path.kind();
    let resolved = canonicalize::resolve::<Nt, F>(fs, kind, path.as_bytes(), mode, None)?;
    Ok(kind.wrap(resolved))
}

/// Returns `true` if the absolute form of `path` is a drive root or a UNC
/// share root.
pub fn ismount<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    let path = path.into();
    let kind = path.kind();
    let Ok(absolute) = abspath_raw(fs, kind, path.as_bytes()) else {
        return false;
    };
    let (drive, root) = splitroot_raw(kind, &absolute);
    let rest_empty = absolute.len() == drive + root;
    if drive > 0 && is_sep(absolute[0]) {
        return rest_empty;
    }
    root > 0 && rest_empty
}

const RESERVED_CHARS: &[char] = &['"', '*', ':', '<', '>', '?', '|', '/', '\\'];

const RESERVED_NAMES: &[&str] = &["CON", "PRN", "AUX", "NUL", "CONIN$", "CONOUT$"];

fn is_reserved_name(name: &str) -> bool {
    if name.ends_with(['.', ' ']) {
        return name != "." && name != "..";
    }
    if name.chars().any(|c| (c as u32) < 32 || RESERVED_CHARS.contains(&c)) {
        return true;
    }
    let stem = name.split('.').next().unwrap_or_default().trim_end_matches(' ').to_uppercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return true;
    }
    let mut chars = stem.chars();
    let prefix: String = chars.by_ref().take(3).collect();
    let digit = chars.next();
    (prefix == "COM" || prefix == "LPT")
        && chars.next().is_none()
        && digit.is_some_and(|d| matches!(d, '1'..='9' | '\u{b9}' | '\u{b2}' | '\u{b3}'))
}

/// Returns `true` if any component of the path is reserved by Windows.
///
/// Reserved are DOS device names (`NUL`, `COM1`, `nul.txt`), names ending
/// in a dot or space, and names containing wildcards, `:`, `|`, quotes or
/// control characters.
///
/// # Examples
///
/// ```
/// use stdport::path::nt;
///
/// assert!(nt::isreserved("C:\\logs\\con.txt"));
/// assert!(nt::isreserved("trailing. "));
/// assert!(!nt::isreserved("C:\\logs\\console.txt"));
/// ```
pub fn isreserved(path: impl Into<PathValue>) -> bool {
    let path = path.into();
    let kind = path.kind();
    let bytes = path.as_bytes();
    let anchor = Nt::anchor_len(kind, bytes);
    let tail = kind.wrap(bytes[anchor..].to_vec());
    let text = tail.to_string_lossy().replace('/', "\\");
    text.rsplit('\\').any(is_reserved_name)
}

/// Expands a leading `~` or `~user` from `USERPROFILE` or
/// `HOMEDRIVE`/`HOMEPATH`.
pub fn expanduser<E: Environment + ?Sized>(env: &E, path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    match expand::nt_user(env, kind, path.as_bytes()) {
        Some(expanded) => kind.wrap(expanded),
        None => path,
    }
}

/// Expands `%NAME%`, `$NAME` and `${NAME}` references outside single quotes.
pub fn expandvars<E: Environment + ?Sized>(env: &E, path: impl Into<PathValue>) -> PathValue {
    let path = path.into();
    let kind = path.kind();
    match expand::nt_vars(env, kind, path.as_bytes()) {
        Some(expanded) => kind.wrap(expanded),
        None => path,
    }
}
