//! `~` and environment-variable expansion.
//!
//! Each function returns `None` when the input is left untouched, so callers
//! can hand back the original value without re-wrapping it.

use std::sync::LazyLock;

use regex::bytes::Regex;

use super::normalize::Grammar;
use super::nt::{self, Nt};
use super::probe::Environment;
use super::types::PathKind;

/// `$name` or `${name}` with ASCII word characters.
static POSIX_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)\$(\w+|\{[^}]*\})").expect("variable reference pattern is valid")
});

fn lookup<E: Environment + ?Sized>(env: &E, kind: PathKind, name: &[u8]) -> Option<Vec<u8>> {
    let name = std::str::from_utf8(name).ok()?;
    env.var(name).map(|value| kind.os_bytes(&value))
}

/// Expands `~` and `~user` at the start of a POSIX path.
///
/// `~` uses `HOME`, falling back to the account home directory.
pub(crate) fn posix_user<E: Environment + ?Sized>(
    env: &E,
    kind: PathKind,
    path: &[u8],
) -> Option<Vec<u8>> {
    if path.first() != Some(&b'~') {
        return None;
    }
    let end = path[1..]
        .iter()
        .position(|&b| b == b'/')
        .map_or(path.len(), |i| i + 1);

    let home = if end == 1 {
        match env.var("HOME") {
            Some(home) => kind.os_bytes(&home),
            None => kind.os_bytes(env.home_dir()?.as_os_str()),
        }
    } else {
        let user = std::str::from_utf8(&path[1..end]).ok()?;
        kind.os_bytes(env.user_home(user)?.as_os_str())
    };

    let trimmed = home
        .iter()
        .rposition(|&b| b != b'/')
        .map_or(&home[..0], |i| &home[..=i]);
    let mut out = trimmed.to_vec();
    out.extend_from_slice(&path[end..]);
    if out.is_empty() {
        out.push(b'/');
    }
    Some(out)
}

/// Expands `$name` and `${name}` in a POSIX path. Unknown names are kept.
pub(crate) fn posix_vars<E: Environment + ?Sized>(
    env: &E,
    kind: PathKind,
    path: &[u8],
) -> Option<Vec<u8>> {
    if !path.contains(&b'$') {
        return None;
    }
    let mut out = Vec::with_capacity(path.len());
    let mut last = 0;
    for caps in POSIX_VAR.captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let mut name = name.as_bytes();
        if name.starts_with(b"{") && name.ends_with(b"}") {
            name = &name[1..name.len() - 1];
        }
        if let Some(value) = lookup(env, kind, name) {
            out.extend_from_slice(&path[last..whole.start()]);
            out.extend_from_slice(&value);
            last = whole.end();
        }
    }
    out.extend_from_slice(&path[last..]);
    Some(out)
}

/// Expands `~` and `~user` at the start of a Windows path.
///
/// The home directory comes from `USERPROFILE`, else `HOMEDRIVE` +
/// `HOMEPATH`. Another user's home is guessed as a sibling of the current
/// one, which only works when the current home ends in `USERNAME`.
pub(crate) fn nt_user<E: Environment + ?Sized>(
    env: &E,
    kind: PathKind,
    path: &[u8],
) -> Option<Vec<u8>> {
    if path.first() != Some(&b'~') {
        return None;
    }
    let end = path[1..]
        .iter()
        .position(|&b| Nt::is_sep(b))
        .map_or(path.len(), |i| i + 1);

    let mut home = match env.var("USERPROFILE") {
        Some(profile) => kind.os_bytes(&profile),
        None => {
            let homepath = kind.os_bytes(&env.var("HOMEPATH")?);
            let drive = env
                .var("HOMEDRIVE")
                .map(|d| kind.os_bytes(&d))
                .unwrap_or_default();
            Nt::join_raw(kind, &drive, &homepath)
        }
    };

    if end != 1 {
        let target = &path[1..end];
        let current = env.var("USERNAME").map(|u| kind.os_bytes(&u));
        if current.as_deref() != Some(target) {
            let (parent, base) = nt::split_raw(kind, &home);
            if current.as_deref() != Some(base) {
                return None;
            }
            home = Nt::join_raw(kind, parent, target);
        }
    }

    home.extend_from_slice(&path[end..]);
    Some(home)
}

fn is_varchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn find_from(path: &[u8], from: usize, needle: u8) -> Option<usize> {
    path.get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

/// Expands `%name%`, `$name` and `${name}` in a Windows path.
///
/// `%%` and `$$` produce a literal character. Text between single quotes
/// is copied verbatim. Unknown names and unterminated references are kept.
pub(crate) fn nt_vars<E: Environment + ?Sized>(
    env: &E,
    kind: PathKind,
    path: &[u8],
) -> Option<Vec<u8>> {
    if !path.contains(&b'$') && !path.contains(&b'%') {
        return None;
    }
    let n = path.len();
    let mut out = Vec::with_capacity(n);
    let mut i = 0;

    while i < n {
        match path[i] {
            b'\'' => match find_from(path, i + 1, b'\'') {
                Some(close) => {
                    out.extend_from_slice(&path[i..=close]);
                    i = close + 1;
                }
                None => {
                    out.extend_from_slice(&path[i..]);
                    i = n;
                }
            },
            b'%' if path.get(i + 1) == Some(&b'%') => {
                out.push(b'%');
                i += 2;
            }
            b'%' => match find_from(path, i + 1, b'%') {
                Some(close) => {
                    let name = &path[i + 1..close];
                    match lookup(env, kind, name) {
                        Some(value) => out.extend_from_slice(&value),
                        None => out.extend_from_slice(&path[i..=close]),
                    }
                    i = close + 1;
                }
                None => {
                    out.extend_from_slice(&path[i..]);
                    i = n;
                }
            },
            b'$' if path.get(i + 1) == Some(&b'$') => {
                out.push(b'$');
                i += 2;
            }
            b'$' if path.get(i + 1) == Some(&b'{') => match find_from(path, i + 2, b'}') {
                Some(close) => {
                    let name = &path[i + 2..close];
                    match lookup(env, kind, name) {
                        Some(value) => out.extend_from_slice(&value),
                        None => out.extend_from_slice(&path[i..=close]),
                    }
                    i = close + 1;
                }
                None => {
                    out.extend_from_slice(&path[i..]);
                    i = n;
                }
            },
            b'$' => {
                let start = i + 1;
                let end = path[start..]
                    .iter()
                    .position(|&b| !is_varchar(b))
                    .map_or(n, |p| start + p);
                match lookup(env, kind, &path[start..end]) {
                    Some(value) => out.extend_from_slice(&value),
                    None => out.extend_from_slice(&path[i..end]),
                }
                i = end;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Some(out)
}
