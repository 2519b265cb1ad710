//! In-memory filesystem and environment used by unit tests.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use super::probe::{Environment, FileStat, FileSystem};

#[derive(Debug, Clone)]
enum Entry {
    Dir,
    File,
    Link(PathBuf),
}

/// A filesystem keyed by literal path strings.
///
/// Lookups do not interpret separators, so the same double works for both
/// grammars as long as tests spell paths the way the engine builds them.
#[derive(Debug, Clone)]
pub(crate) struct MemoryFileSystem {
    cwd: PathBuf,
    entries: HashMap<PathBuf, (Entry, u64)>,
    next_ino: u64,
}

impl MemoryFileSystem {
    pub(crate) fn new(cwd: &str) -> Self {
        Self {
            cwd: PathBuf::from(cwd),
            entries: HashMap::new(),
            next_ino: 1,
        }
        .dir(cwd)
    }

    fn insert(mut self, path: &str, entry: Entry) -> Self {
        self.entries.insert(PathBuf::from(path), (entry, self.next_ino));
        self.next_ino += 1;
        self
    }

    pub(crate) fn dir(self, path: &str) -> Self {
        self.insert(path, Entry::Dir)
    }

    pub(crate) fn file(self, path: &str) -> Self {
        self.insert(path, Entry::File)
    }

    pub(crate) fn link(self, path: &str, target: &str) -> Self {
        self.insert(path, Entry::Link(PathBuf::from(target)))
    }

    fn stat_entry(entry: &Entry, ino: u64) -> FileStat {
        FileStat {
            mode: 0,
            is_symlink: matches!(entry, Entry::Link(_)),
            is_dir: matches!(entry, Entry::Dir),
            is_file: matches!(entry, Entry::File),
            dev: 1,
            ino,
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn lstat(&self, path: &Path) -> io::Result<FileStat> {
        self.entries
            .get(path)
            .map(|(entry, ino)| Self::stat_entry(entry, *ino))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let mut current = path.to_path_buf();
        for _ in 0..40 {
            match self.entries.get(&current) {
                Some((Entry::Link(target), _)) => {
                    current = match current.parent() {
                        Some(parent) => parent.join(target),
                        None => target.clone(),
                    };
                }
                Some((entry, ino)) => return Ok(Self::stat_entry(entry, *ino)),
                None => return Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }
        Err(io::Error::new(io::ErrorKind::Other, "too many levels of symbolic links"))
    }

    fn readlink(&self, path: &Path) -> io::Result<PathBuf> {
        match self.entries.get(path) {
            Some((Entry::Link(target), _)) => Ok(target.clone()),
            Some(_) => Err(io::Error::from(io::ErrorKind::InvalidInput)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn getcwd(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

/// An environment with fixed variables and home directories.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryEnvironment {
    vars: HashMap<String, OsString>,
    home: Option<PathBuf>,
    users: HashMap<String, PathBuf>,
}

impl MemoryEnvironment {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), OsString::from(value));
        self
    }

    pub(crate) fn home(mut self, path: &str) -> Self {
        self.home = Some(PathBuf::from(path));
        self
    }

    pub(crate) fn user(mut self, name: &str, path: &str) -> Self {
        self.users.insert(name.to_string(), PathBuf::from(path));
        self
    }
}

impl Environment for MemoryEnvironment {
    fn var(&self, name: &str) -> Option<OsString> {
        self.vars.get(name).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn user_home(&self, user: &str) -> Option<PathBuf> {
        self.users.get(user).cloned()
    }
}
