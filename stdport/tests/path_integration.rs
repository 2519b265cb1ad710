//! Integration tests for the path engine against the real filesystem.
//!
//! Symlink scenarios only run on Unix, where creating links needs no
//! privileges.

use stdport::path::{nt, posix, PathValue, RealpathMode, Resolver};
use stdport::Error;

#[test]
fn test_mixed_kinds_are_type_errors() {
    assert!(matches!(
        posix::join("a", [PathValue::from(&b"b"[..])]),
        Err(Error::Type { .. })
    ));
    assert!(matches!(
        nt::join("a", [PathValue::from(&b"b"[..])]),
        Err(Error::Type { .. })
    ));
}

#[test]
fn test_commonpath_rejects_absolute_and_relative_mix() {
    match posix::commonpath(["/a/b", "rel/c"]) {
        Err(Error::Value { message }) => {
            assert_eq!(message, "Can't mix absolute and relative paths");
        }
        other => panic!("expected a value error, got {other:?}"),
    }
}

#[test]
fn test_splitroot_reassembles() {
    for p in ["//server/x", "C:\\dir", "\\\\?\\UNC\\srv\\share\\f", "rel\\x", "/"] {
        let (drive, root, tail) = nt::splitroot(p);
        let joined = format!("{drive}{root}{tail}");
        assert_eq!(joined, p);
    }
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    /// A temp dir with its own symlinks resolved, so results compare
    /// cleanly on systems where the temp root is itself a link.
    fn real_tempdir() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        (dir, root.to_string_lossy().into_owned())
    }

    #[test]
    fn test_realpath_without_links_matches_normpath() {
        let (_dir, root) = real_tempdir();
        std::fs::create_dir_all(format!("{root}/a/b")).unwrap();

        let resolver = Resolver::new();
        let path = format!("{root}/a/./b/../b");
        assert_eq!(
            resolver.realpath(path.as_str()).unwrap(),
            posix::normpath(path.as_str())
        );
    }

    #[test]
    fn test_realpath_follows_relative_and_absolute_links() {
        let (_dir, root) = real_tempdir();
        std::fs::create_dir_all(format!("{root}/target/inner")).unwrap();
        symlink("target", format!("{root}/rel")).unwrap();
        symlink(format!("{root}/target/inner"), format!("{root}/abs")).unwrap();

        let resolver = Resolver::new();
        assert_eq!(
            resolver.realpath(format!("{root}/rel/inner")).unwrap(),
            PathValue::from(format!("{root}/target/inner"))
        );
        assert_eq!(
            resolver.realpath(format!("{root}/abs/..")).unwrap(),
            PathValue::from(format!("{root}/target"))
        );
    }

    #[test]
    fn test_realpath_loop_lenient_vs_strict() {
        let (_dir, root) = real_tempdir();
        symlink(format!("{root}/b"), format!("{root}/a")).unwrap();
        symlink(format!("{root}/a"), format!("{root}/b")).unwrap();

        let lenient = Resolver::new();
        let resolved = lenient.realpath(format!("{root}/a")).unwrap();
        assert!(resolved.to_string_lossy().starts_with(&root));

        let strict = Resolver::new().with_mode(RealpathMode::Strict);
        let err = strict.realpath(format!("{root}/a")).unwrap_err();
        assert!(err.is_symlink_loop(), "unexpected error: {err:?}");
    }

    #[test]
    fn test_realpath_missing_components() {
        let (_dir, root) = real_tempdir();
        let missing = format!("{root}/nope/file");

        let lenient = Resolver::new().realpath(missing.as_str()).unwrap();
        assert_eq!(lenient, PathValue::from(missing.clone()));

        let allow = Resolver::new()
            .with_mode(RealpathMode::AllowMissing)
            .realpath(missing.as_str())
            .unwrap();
        assert_eq!(allow, PathValue::from(missing.clone()));

        let err = Resolver::new()
            .with_mode(RealpathMode::Strict)
            .realpath(missing.as_str())
            .unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err:?}");
    }

    #[test]
    fn test_realpath_file_as_directory() {
        let (_dir, root) = real_tempdir();
        std::fs::write(format!("{root}/file"), b"x").unwrap();

        let err = Resolver::new()
            .with_mode(RealpathMode::AllowMissing)
            .realpath(format!("{root}/file/child"))
            .unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. } | Error::Os { .. }));
    }

    #[test]
    fn test_realpath_bytes_in_bytes_out() {
        let (_dir, root) = real_tempdir();
        std::fs::create_dir(format!("{root}/d")).unwrap();
        symlink("d", format!("{root}/l")).unwrap();

        let input = PathValue::from(format!("{root}/l").into_bytes());
        let resolved = Resolver::new().realpath(input).unwrap();
        assert_eq!(resolved, PathValue::from(format!("{root}/d").into_bytes()));
    }

    #[test]
    fn test_relpath_and_abspath_use_cwd() {
        let resolver = Resolver::new();
        let cwd = std::env::current_dir().unwrap();
        let abs = resolver.abspath("x/../y").unwrap();
        assert_eq!(abs, PathValue::from(cwd.join("y").to_string_lossy().into_owned()));
        assert_eq!(resolver.relpath("y", None).unwrap(), PathValue::from("y"));
    }
}
