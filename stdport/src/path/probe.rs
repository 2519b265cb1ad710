//! Filesystem and environment probes.
//!
//! The path engine never touches the operating system directly. Everything
//! it needs (`lstat`, `stat`, `readlink`, `getcwd`, and environment lookups)
//! goes through the [`FileSystem`] and [`Environment`] traits, so resolution
//! can run against the real host or against a test double.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The subset of `stat` results the path engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStat {
    /// Raw mode bits (0 where the platform has none).
    pub mode: u32,
    /// The entry is a symbolic link (only meaningful for `lstat`).
    pub is_symlink: bool,
    /// The entry is a directory.
    pub is_dir: bool,
    /// The entry is a regular file.
    pub is_file: bool,
    /// Device identifier.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
}

impl FileStat {
    /// Builds a `FileStat` from `std` metadata.
    #[must_use]
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let (mode, dev, ino) = raw_ids(meta);
        Self {
            mode,
            is_symlink: file_type.is_symlink(),
            is_dir: file_type.is_dir(),
            is_file: file_type.is_file(),
            dev,
            ino,
        }
    }
}

#[cfg(unix)]
fn raw_ids(meta: &fs::Metadata) -> (u32, u64, u64) {
    use std::os::unix::fs::MetadataExt;

    (meta.mode(), meta.dev(), meta.ino())
}

#[cfg(not(unix))]
fn raw_ids(_meta: &fs::Metadata) -> (u32, u64, u64) {
    (0, 0, 0)
}

/// Filesystem probes consumed by `realpath`, `abspath`, `ismount` and the
/// existence predicates.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Returns metadata for `path` without following a final symlink.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    fn lstat(&self, path: &Path) -> io::Result<FileStat>;

    /// Returns metadata for `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Returns the target of the symlink at `path`, possibly relative.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    fn readlink(&self, path: &Path) -> io::Result<PathBuf>;

    /// Returns the absolute, symlink-free current working directory.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    fn getcwd(&self) -> io::Result<PathBuf>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn lstat(&self, path: &Path) -> io::Result<FileStat> {
        fs::symlink_metadata(path).map(|m| FileStat::from_metadata(&m))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        fs::metadata(path).map(|m| FileStat::from_metadata(&m))
    }

    fn readlink(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn getcwd(&self) -> io::Result<PathBuf> {
        env::current_dir()
    }
}

/// Environment lookups consumed by `expanduser` and `expandvars`.
#[cfg_attr(test, mockall::automock)]
pub trait Environment {
    /// Returns the value of the environment variable `name`.
    fn var(&self, name: &str) -> Option<OsString>;

    /// Returns the current user's home directory from the account database,
    /// used when `HOME` is unset.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Returns the home directory of another user from the account
    /// database.
    fn user_home(&self, user: &str) -> Option<PathBuf>;
}

/// [`Environment`] backed by the process environment, the `home` crate and,
/// on Unix, the password database.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl Environment for OsEnvironment {
    fn var(&self, name: &str) -> Option<OsString> {
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        env::var_os(name)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir()
    }

    #[cfg(unix)]
    fn user_home(&self, user: &str) -> Option<PathBuf> {
        match nix::unistd::User::from_name(user) {
            Ok(entry) => entry.map(|u| u.dir),
            Err(errno) => {
                log::debug!("account lookup for {user:?} failed: {errno}");
                None
            }
        }
    }

    #[cfg(not(unix))]
    fn user_home(&self, _user: &str) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathValue;
    use tempfile::tempdir;

    #[test]
    fn test_os_filesystem_lstat_directory() {
        let dir = tempdir().unwrap();
        let st = OsFileSystem.lstat(dir.path()).unwrap();
        assert!(st.is_dir);
        assert!(!st.is_symlink);
        assert!(!st.is_file);
    }

    #[test]
    fn test_os_filesystem_missing_path() {
        let err = OsFileSystem
            .lstat(Path::new("/nonexistent/stdport/probe"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_os_filesystem_symlink() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::write(&target, "x").unwrap();
        symlink(&target, &link).unwrap();

        assert!(OsFileSystem.lstat(&link).unwrap().is_symlink);
        assert!(OsFileSystem.stat(&link).unwrap().is_file);
        assert_eq!(OsFileSystem.readlink(&link).unwrap(), target);
    }

    #[test]
    fn test_os_filesystem_getcwd_absolute() {
        assert!(OsFileSystem.getcwd().unwrap().is_absolute());
    }

    /// Home directory of `user` as listed in `/etc/passwd`.
    #[cfg(unix)]
    fn passwd_home(user: &str) -> Option<PathBuf> {
        let passwd = fs::read_to_string("/etc/passwd").ok()?;
        passwd.lines().find_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            (fields.len() >= 7 && fields[0] == user).then(|| PathBuf::from(fields[5]))
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_os_environment_user_home_from_account_database() {
        let Some(expected) = passwd_home("root") else {
            return;
        };
        assert_eq!(OsEnvironment.user_home("root"), Some(expected.clone()));

        let expanded = crate::path::posix::expanduser(&OsEnvironment, "~root/x");
        let base = expected.to_string_lossy().trim_end_matches('/').to_string();
        assert_eq!(expanded, PathValue::from(format!("{base}/x")));
    }

    #[cfg(unix)]
    #[test]
    fn test_os_environment_unknown_user() {
        let name = "stdport-no-such-user-4f1c";
        assert_eq!(OsEnvironment.user_home(name), None);
        assert_eq!(
            crate::path::posix::expanduser(&OsEnvironment, format!("~{name}/x")),
            PathValue::from(format!("~{name}/x"))
        );
    }

    #[test]
    fn test_os_environment_rejects_malformed_names() {
        assert!(OsEnvironment.var("").is_none());
        assert!(OsEnvironment.var("A=B").is_none());
    }
}
