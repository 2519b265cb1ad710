//! Symlink-aware canonicalization.
//!
//! `realpath` walks the components of an absolute path left to right using an
//! explicit work stack instead of recursion. When a component turns out to be
//! a symlink, the components of its target are pushed back on top of the
//! stack, preceded by a [`Pending::Resolved`] marker. Popping that marker
//! means the whole target has been expanded, so the resolved path is cached
//! in `seen` for the link. A link found in `seen` without a cached value is
//! still being expanded, which means a loop.
//!
//! Stack depth is bounded by the total number of components, not by the
//! length of symlink chains, and every distinct link is expanded at most once.

use std::collections::HashMap;
use std::io;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::normalize::{Grammar, CURDIR, PARDIR};
use super::probe::FileSystem;
use super::types::{bytes_to_path, PathKind};
use crate::error::{Error, Result};

/// How `realpath` reacts to filesystem errors and symlink loops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RealpathMode {
    /// Best effort: failing components are kept verbatim, loops stop expanding.
    #[default]
    Lenient,
    /// Every probe failure, loop and non-directory component is an error.
    Strict,
    /// Like `Strict`, but components that do not exist are tolerated.
    AllowMissing,
}

impl RealpathMode {
    fn is_strict(self) -> bool {
        !matches!(self, Self::Lenient)
    }

    fn tolerates(self, err: &io::Error) -> bool {
        match self {
            Self::Lenient => true,
            Self::Strict => false,
            Self::AllowMissing => err.kind() == io::ErrorKind::NotFound,
        }
    }
}

/// An entry of the resolution work stack.
#[derive(Debug)]
enum Pending {
    /// A component still to be resolved.
    Part(Vec<u8>),
    /// The target of the symlink at this path has been fully expanded.
    Resolved(Vec<u8>),
}

fn render(kind: PathKind, bytes: &[u8]) -> String {
    kind.wrap(bytes.to_vec()).to_string_lossy().into_owned()
}

/// Resolves all symlinks in `path` under grammar `G`.
///
/// `max_links`, when set, replaces cycle detection through `seen` with a cap
/// on the number of links followed.
pub(crate) fn resolve<G, F>(
    fs: &F,
    kind: PathKind,
    path: &[u8],
    mode: RealpathMode,
    max_links: Option<usize>,
) -> Result<Vec<u8>>
where
    G: Grammar,
    F: FileSystem + ?Sized,
{
    let strict = mode.is_strict();

    let full = if G::is_abs(kind, path) {
        G::absolutize(kind, &[], path)
    } else {
        let cwd = fs.getcwd().map_err(|source| Error::Os {
            path: render(kind, path),
            source,
        })?;
        G::absolutize(kind, &kind.os_bytes(cwd.as_os_str()), path)
    };

    let anchor_len = G::anchor_len(kind, &full);
    let mut resolved = G::rebase(kind, &[], &full[..anchor_len]);

    let mut stack: Vec<Pending> = full[anchor_len..]
        .split(|&b| G::is_sep(b))
        .rev()
        .map(|part| Pending::Part(part.to_vec()))
        .collect();
    let mut part_count = stack.len();

    let mut seen: HashMap<Vec<u8>, Option<Vec<u8>>> = HashMap::new();
    let mut link_count = 0usize;

    while part_count > 0 {
        let Some(entry) = stack.pop() else {
            break;
        };
        let name = match entry {
            Pending::Resolved(link) => {
                seen.insert(G::fold(kind, &link), Some(resolved.clone()));
                continue;
            }
            Pending::Part(name) => name,
        };
        part_count -= 1;

        if name.is_empty() || name == CURDIR {
            continue;
        }
        if name == PARDIR {
            pop_component::<G>(kind, &mut resolved);
            continue;
        }

        let newpath = push_component::<G>(&resolved, &name);
        let probe_path = bytes_to_path(&newpath);

        let st = match fs.lstat(&probe_path) {
            Ok(st) => st,
            Err(source) if mode.tolerates(&source) => {
                log::trace!("realpath: keeping {} unresolved: {source}", render(kind, &newpath));
                resolved = newpath;
                continue;
            }
            Err(source) => {
                return Err(Error::Os {
                    path: render(kind, &newpath),
                    source,
                });
            }
        };

        if !st.is_symlink {
            if strict && part_count > 0 && !st.is_dir {
                return Err(Error::NotADirectory {
                    path: render(kind, &newpath),
                });
            }
            resolved = newpath;
            continue;
        }

        let key = G::fold(kind, &newpath);
        if let Some(max) = max_links {
            link_count += 1;
            if link_count > max {
                if strict {
                    return Err(Error::SymlinkLoop {
                        path: render(kind, &newpath),
                    });
                }
                log::debug!("realpath: more than {max} links at {}", render(kind, &newpath));
                resolved = newpath;
                continue;
            }
        } else if let Some(cached) = seen.get(&key) {
            if let Some(target) = cached {
                resolved.clone_from(target);
                continue;
            }
            if strict {
                return Err(Error::SymlinkLoop {
                    path: render(kind, &newpath),
                });
            }
            log::debug!("realpath: symlink loop at {}", render(kind, &newpath));
            resolved = newpath;
            continue;
        }

        let target = match fs.readlink(&probe_path) {
            Ok(target) => kind.os_bytes(target.as_os_str()),
            Err(source) if mode.tolerates(&source) => {
                log::trace!("realpath: cannot read link {}: {source}", render(kind, &newpath));
                resolved = newpath;
                continue;
            }
            Err(source) => {
                return Err(Error::Os {
                    path: render(kind, &newpath),
                    source,
                });
            }
        };

        let target_anchor = G::anchor_len(kind, &target);
        if target_anchor > 0 {
            resolved = G::rebase(kind, &resolved, &target[..target_anchor]);
        }

        if max_links.is_none() {
            seen.insert(key, None);
            stack.push(Pending::Resolved(newpath));
        }

        let before = stack.len();
        stack.extend(
            target[target_anchor..]
                .split(|&b| G::is_sep(b))
                .rev()
                .map(|part| Pending::Part(part.to_vec())),
        );
        part_count += stack.len() - before;
    }

    Ok(resolved)
}

/// Drops the last component of an anchored path, never the anchor itself.
fn pop_component<G: Grammar>(kind: PathKind, path: &mut Vec<u8>) {
    let anchor = G::anchor_len(kind, path);
    let cut = path[anchor..]
        .iter()
        .rposition(|&b| G::is_sep(b))
        .map_or(anchor, |i| anchor + i);
    path.truncate(cut);
}

/// Appends one component to an anchored path.
fn push_component<G: Grammar>(path: &[u8], name: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(path.len() + name.len() + 1);
    out.extend_from_slice(path);
    if !out.last().is_some_and(|&b| G::is_sep(b)) {
        out.push(G::SEP);
    }
    out.extend_from_slice(name);
    out
}
