//! Path grammar engine for POSIX and Windows paths.
//!
//! Both grammars are available on every host. [`posix`] and [`nt`] expose the
//! same set of free functions; [`native`] aliases whichever one matches the
//! platform the crate was built for.
//!
//! # Key Concepts
//!
//! ## Path values
//!
//! Every operation accepts text or byte paths through [`PathValue`] and
//! returns the same kind it was given. Mixing kinds within one call is a
//! type error.
//!
//! ## Anchors
//!
//! A path splits into a drive, a root and a tail (`splitroot`). POSIX paths
//! never carry a drive; Windows paths may carry a drive letter, a UNC
//! `\\server\share` prefix or a device namespace prefix.
//!
//! ## Probes
//!
//! Operations that consult the outside world take a [`FileSystem`] or an
//! [`Environment`]. The OS-backed implementations are [`OsFileSystem`] and
//! [`OsEnvironment`]; tests substitute their own.
//!
//! # Examples
//!
//! ```
//! use stdport::path::{nt, posix};
//!
//! assert_eq!(posix::normpath("/a/./b/../c"), "/a/c");
//! assert_eq!(nt::splitroot("//server/share/dir").0, "//server/share");
//! assert_eq!(posix::commonpath(["/usr/lib", "/usr/local/lib"]).unwrap(), "/usr");
//! ```
//!
//! Grammar chosen at run time:
//!
//! ```
//! use stdport::path::{Flavor, Resolver};
//!
//! let resolver = Resolver::new().with_flavor(Flavor::Windows);
//! assert_eq!(resolver.join("c:\\", ["x", "y"]).unwrap(), "c:\\x\\y");
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

mod canonicalize;
mod expand;
mod generic;
mod normalize;
pub mod nt;
pub mod posix;
pub mod probe;
pub mod resolver;
mod types;

#[cfg(test)]
mod testing;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

#[cfg(windows)]
pub use nt as native;
#[cfg(not(windows))]
pub use posix as native;

pub use canonicalize::RealpathMode;
pub use generic::{commonprefix, exists, isdir, isfile, islink, lexists, samefile, samestat};
pub use probe::{Environment, FileStat, FileSystem, OsEnvironment, OsFileSystem};
pub use resolver::Resolver;
pub use types::{PathKind, PathValue};

/// A path grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// POSIX paths: `/` separator, no drives.
    Posix,
    /// Windows paths: `\` and `/` separators, drives and UNC shares.
    Windows,
}

impl Flavor {
    /// Returns the grammar of the platform the crate was built for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

impl Default for Flavor {
    fn default() -> Self {
        Self::native()
    }
}
