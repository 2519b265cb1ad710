//! Grammar-independent helpers.
//!
//! The existence predicates never fail: any probe error counts as "no".

use super::probe::{FileStat, FileSystem};
use super::types::{PathKind, PathValue};
use crate::error::{Error, Result};

/// Returns the longest common leading substring of `paths`.
///
/// The comparison is character-wise, so the result need not be a valid path
/// prefix; see `commonpath` for a component-wise version.
///
/// # Errors
///
/// Returns a type error when text and byte paths are mixed.
///
/// # Examples
///
/// ```
/// use stdport::path::commonprefix;
///
/// assert_eq!(commonprefix(["/usr/lib", "/usr/local"]).unwrap(), "/usr/l");
/// assert_eq!(commonprefix(Vec::<&str>::new()).unwrap(), "");
/// ```
pub fn commonprefix<I>(paths: I) -> Result<PathValue>
where
    I: IntoIterator,
    I::Item: Into<PathValue>,
{
    let paths: Vec<PathValue> = paths.into_iter().map(Into::into).collect();
    let kind = PathKind::common(&paths)?;
    let Some(first) = paths.first() else {
        return Ok(kind.wrap(Vec::new()));
    };
    let first = first.as_bytes();
    let mut len = paths[1..].iter().fold(first.len(), |len, p| {
        first[..len]
            .iter()
            .zip(p.as_bytes())
            .take_while(|(a, b)| a == b)
            .count()
    });
    if let PathValue::Str(s) = &paths[0] {
        while !s.is_char_boundary(len) {
            len -= 1;
        }
    }
    Ok(kind.wrap(first[..len].to_vec()))
}

/// Returns `true` if `path` exists, following symlinks.
pub fn exists<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    fs.stat(&path.into().to_path_buf()).is_ok()
}

/// Returns `true` if `path` exists, including broken symlinks.
pub fn lexists<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    fs.lstat(&path.into().to_path_buf()).is_ok()
}

/// Returns `true` if `path` is a directory, following symlinks.
pub fn isdir<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    fs.stat(&path.into().to_path_buf())
        .is_ok_and(|st| st.is_dir)
}

/// Returns `true` if `path` is a regular file, following symlinks.
pub fn isfile<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    fs.stat(&path.into().to_path_buf())
        .is_ok_and(|st| st.is_file)
}

/// Returns `true` if `path` is a symbolic link.
pub fn islink<F: FileSystem + ?Sized>(fs: &F, path: impl Into<PathValue>) -> bool {
    fs.lstat(&path.into().to_path_buf())
        .is_ok_and(|st| st.is_symlink)
}

/// Returns `true` if two stat results describe the same file.
#[must_use]
pub fn samestat(a: &FileStat, b: &FileStat) -> bool {
    a.dev == b.dev && a.ino == b.ino
}

/// Returns `true` if both paths refer to the same file.
///
/// # Errors
///
/// Returns the probe error of whichever path cannot be stat-ed.
pub fn samefile<F: FileSystem + ?Sized>(
    fs: &F,
    a: impl Into<PathValue>,
    b: impl Into<PathValue>,
) -> Result<bool> {
    let stat = |p: PathValue| {
        fs.stat(&p.to_path_buf()).map_err(|source| Error::Os {
            path: p.to_string(),
            source,
        })
    };
    let sa = stat(a.into())?;
    let sb = stat(b.into())?;
    Ok(samestat(&sa, &sb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::testing::MemoryFileSystem;

    fn fs() -> MemoryFileSystem {
        MemoryFileSystem::new("/")
            .dir("/d")
            .file("/d/f")
            .link("/d/l", "f")
            .link("/d/dangling", "nowhere")
    }

    #[test]
    fn test_commonprefix() {
        assert_eq!(commonprefix(["/home/swenson/spam", "/home/swen/spam"]).unwrap(), "/home/swen");
        assert_eq!(commonprefix(["/home/swen/spam", "/home/swen/eggs"]).unwrap(), "/home/swen/");
        assert_eq!(commonprefix(["/home/swen/spam", "/home/swen/spam"]).unwrap(), "/home/swen/spam");
        assert_eq!(commonprefix(["abc"]).unwrap(), "abc");
        assert_eq!(commonprefix([b"abc", b"abd"]).unwrap(), b"ab");
    }

    #[test]
    fn test_commonprefix_respects_char_boundaries() {
        // "é" and "è" share their first UTF-8 byte.
        assert_eq!(commonprefix(["aé", "aè"]).unwrap(), "a");
    }

    #[test]
    fn test_commonprefix_mixed_kinds() {
        let err = commonprefix([PathValue::from("a"), PathValue::from(b"a")]).unwrap_err();
        assert!(matches!(err, Error::Type { .. }));
    }

    #[test]
    fn test_predicates() {
        let fs = fs();
        assert!(exists(&fs, "/d/f"));
        assert!(exists(&fs, "/d/l"));
        assert!(!exists(&fs, "/d/dangling"));
        assert!(lexists(&fs, "/d/dangling"));
        assert!(isdir(&fs, "/d"));
        assert!(!isdir(&fs, "/d/f"));
        assert!(isfile(&fs, "/d/l"));
        assert!(islink(&fs, "/d/l"));
        assert!(!islink(&fs, "/d/f"));
        assert!(!isfile(&fs, "/missing"));
    }

    #[test]
    fn test_samefile() {
        let fs = fs();
        assert!(samefile(&fs, "/d/l", "/d/f").unwrap());
        assert!(!samefile(&fs, "/d", "/d/f").unwrap());
        let err = samefile(&fs, "/d/f", "/missing").unwrap_err();
        assert!(err.is_not_found());
    }
}
