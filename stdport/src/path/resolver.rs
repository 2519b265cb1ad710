//! Grammar dispatch with bundled probes and resolution policy.
//!
//! The grammar modules expose free functions that take their probes as
//! arguments. `Resolver` packages a [`Flavor`], a [`FileSystem`], an
//! [`Environment`] and the `realpath` policy so callers that pick a grammar
//! at run time (the CLI, configuration-driven code) have a single handle.

use super::canonicalize::{self, RealpathMode};
use super::probe::{Environment, FileSystem, OsEnvironment, OsFileSystem};
use super::types::PathValue;
use super::{nt, posix, Flavor};
use crate::error::Result;

/// Runs path operations under one grammar with fixed probes and policy.
///
/// # Examples
///
/// ```
/// use stdport::path::{Flavor, RealpathMode, Resolver};
///
/// let resolver = Resolver::new()
///     .with_flavor(Flavor::Windows)
///     .with_mode(RealpathMode::Strict)
///     .with_max_links(16);
///
/// assert_eq!(resolver.normpath("C:/a/./b/../c"), "C:\\a\\c");
/// assert_eq!(resolver.max_links(), Some(16));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver<F = OsFileSystem, E = OsEnvironment> {
    flavor: Flavor,
    fs: F,
    env: E,
    mode: RealpathMode,
    max_links: Option<usize>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            flavor: Flavor::native(),
            fs: OsFileSystem,
            env: OsEnvironment,
            mode: RealpathMode::default(),
            max_links: None,
        }
    }
}

impl Resolver {
    /// Creates a resolver for the host grammar backed by the real OS.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem, E: Environment> Resolver<F, E> {
    /// Selects the path grammar.
    #[must_use]
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Selects how `realpath` treats probe failures and loops.
    #[must_use]
    pub fn with_mode(mut self, mode: RealpathMode) -> Self {
        self.mode = mode;
        self
    }

    /// Caps the number of symlinks `realpath` follows.
    ///
    /// With a cap, loops are detected by exceeding it rather than by
    /// revisiting a link.
    #[must_use]
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = Some(max_links);
        self
    }

    /// Replaces the filesystem probe.
    #[must_use]
    pub fn with_filesystem<G: FileSystem>(self, fs: G) -> Resolver<G, E> {
        Resolver {
            flavor: self.flavor,
            fs,
            env: self.env,
            mode: self.mode,
            max_links: self.max_links,
        }
    }

    /// Replaces the environment probe.
    #[must_use]
    pub fn with_environment<V: Environment>(self, env: V) -> Resolver<F, V> {
        Resolver {
            flavor: self.flavor,
            fs: self.fs,
            env,
            mode: self.mode,
            max_links: self.max_links,
        }
    }

    /// Returns the grammar in use.
    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Returns the `realpath` mode.
    #[must_use]
    pub fn mode(&self) -> RealpathMode {
        self.mode
    }

    /// Returns the symlink cap, if any.
    #[must_use]
    pub fn max_links(&self) -> Option<usize> {
        self.max_links
    }

    /// Resolves symlinks using the configured mode and cap.
    ///
    /// # Errors
    ///
    /// See [`posix::realpath`].
    pub fn realpath(&self, path: impl Into<PathValue>) -> Result<PathValue> {
        let path = path.into();
        let kind = path.kind();
        log::debug!(
            "realpath {} ({:?}, {:?}, max links {:?})",
            path,
            self.flavor,
            self.mode,
            self.max_links
        );
        let resolved = match self.flavor {
            Flavor::Posix => canonicalize::resolve::<posix::Posix, F>(
                &self.fs,
                kind,
                path.as_bytes(),
                self.mode,
                self.max_links,
            )?,
            Flavor::Windows => canonicalize::resolve::<nt::Nt, F>(
                &self.fs,
                kind,
                path.as_bytes(),
                self.mode,
                self.max_links,
            )?,
        };
        Ok(kind.wrap(resolved))
    }

    /// Makes a path absolute and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the working directory is unavailable.
    pub fn abspath(&self, path: impl Into<PathValue>) -> Result<PathValue> {
        match self.flavor {
            Flavor::Posix => posix::abspath(&self.fs, path),
            Flavor::Windows => nt::abspath(&self.fs, path),
        }
    }

    /// Computes a relative path from `start` (default `.`).
    ///
    /// # Errors
    ///
    /// See [`posix::relpath`] and [`nt::relpath`].
    pub fn relpath(&self, path: impl Into<PathValue>, start: Option<PathValue>) -> Result<PathValue> {
        match self.flavor {
            Flavor::Posix => posix::relpath(&self.fs, path, start),
            Flavor::Windows => nt::relpath(&self.fs, path, start),
        }
    }

    /// Returns `true` if the path is a mount point.
    pub fn ismount(&self, path: impl Into<PathValue>) -> bool {
        match self.flavor {
            Flavor::Posix => posix::ismount(&self.fs, path),
            Flavor::Windows => nt::ismount(&self.fs, path),
        }
    }

    /// Expands a leading `~`.
    pub fn expanduser(&self, path: impl Into<PathValue>) -> PathValue {
        match self.flavor {
            Flavor::Posix => posix::expanduser(&self.env, path),
            Flavor::Windows => nt::expanduser(&self.env, path),
        }
    }

    /// Expands environment variable references.
    pub fn expandvars(&self, path: impl Into<PathValue>) -> PathValue {
        match self.flavor {
            Flavor::Posix => posix::expandvars(&self.env, path),
            Flavor::Windows => nt::expandvars(&self.env, path),
        }
    }

    /// Lexically normalizes a path.
    pub fn normpath(&self, path: impl Into<PathValue>) -> PathValue {
        match self.flavor {
            Flavor::Posix => posix::normpath(path),
            Flavor::Windows => nt::normpath(path),
        }
    }

    /// Splits a path into `(drive, root, tail)`.
    pub fn splitroot(&self, path: impl Into<PathValue>) -> (PathValue, PathValue, PathValue) {
        match self.flavor {
            Flavor::Posix => posix::splitroot(path),
            Flavor::Windows => nt::splitroot(path),
        }
    }

    /// Splits a path into `(head, tail)`.
    pub fn split(&self, path: impl Into<PathValue>) -> (PathValue, PathValue) {
        match self.flavor {
            Flavor::Posix => posix::split(path),
            Flavor::Windows => nt::split(path),
        }
    }

    /// Splits a path into `(root, ext)`.
    pub fn splitext(&self, path: impl Into<PathValue>) -> (PathValue, PathValue) {
        match self.flavor {
            Flavor::Posix => posix::splitext(path),
            Flavor::Windows => nt::splitext(path),
        }
    }

    /// Returns `true` if the path is absolute.
    pub fn isabs(&self, path: impl Into<PathValue>) -> bool {
        match self.flavor {
            Flavor::Posix => posix::isabs(path),
            Flavor::Windows => nt::isabs(path),
        }
    }

    /// Normalizes case and separators.
    pub fn normcase(&self, path: impl Into<PathValue>) -> PathValue {
        match self.flavor {
            Flavor::Posix => posix::normcase(path),
            Flavor::Windows => nt::normcase(path),
        }
    }

    /// Joins path components.
    ///
    /// # Errors
    ///
    /// Returns a type error when text and byte components are mixed.
    pub fn join<P, I>(&self, base: P, parts: I) -> Result<PathValue>
    where
        P: Into<PathValue>,
        I: IntoIterator,
        I::Item: Into<PathValue>,
    {
        match self.flavor {
            Flavor::Posix => posix::join(base, parts),
            Flavor::Windows => nt::join(base, parts),
        }
    }

    /// Returns the longest common sub-path.
    ///
    /// # Errors
    ///
    /// See [`posix::commonpath`] and [`nt::commonpath`].
    pub fn commonpath<I>(&self, paths: I) -> Result<PathValue>
    where
        I: IntoIterator,
        I::Item: Into<PathValue>,
    {
        match self.flavor {
            Flavor::Posix => posix::commonpath(paths),
            Flavor::Windows => nt::commonpath(paths),
        }
    }
}
