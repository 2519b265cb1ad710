//! Property-based tests for the path grammars.

use super::testing::MemoryFileSystem;
use super::{nt, posix, PathValue, RealpathMode};
use proptest::prelude::*;

fn component() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z0-9_-]{1,8}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
        1 => Just(String::new()),
    ]
}

fn rooted_path(roots: &'static [&'static str]) -> impl Strategy<Value = String> {
    (
        prop::sample::select(roots),
        prop::collection::vec(component(), 0..8),
    )
        .prop_map(|(root, parts)| format!("{root}{}", parts.join("/")))
}

fn posix_path() -> impl Strategy<Value = String> {
    rooted_path(&["", "/", "//", "///"])
}

fn nt_path() -> impl Strategy<Value = String> {
    let anchor = prop_oneof![
        Just(""),
        Just("\\"),
        Just("C:"),
        Just("C:\\"),
        Just("\\\\server\\share\\"),
        Just("\\\\?\\D:\\"),
    ];
    let sep = prop_oneof![Just("\\"), Just("/")];
    (anchor, prop::collection::vec((component(), sep), 0..8)).prop_map(|(anchor, parts)| {
        let mut out = anchor.to_string();
        for (part, sep) in parts {
            out.push_str(&part);
            out.push_str(sep);
        }
        out
    })
}

fn concat(parts: (PathValue, PathValue, PathValue)) -> Vec<u8> {
    let (drive, root, tail) = parts;
    [drive.as_bytes(), root.as_bytes(), tail.as_bytes()].concat()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn posix_normpath_idempotent(path in posix_path()) {
        let once = posix::normpath(path.as_str());
        let twice = posix::normpath(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn nt_normpath_idempotent(path in nt_path()) {
        let once = nt::normpath(path.as_str());
        let twice = nt::normpath(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn posix_splitroot_reassembles(path in posix_path()) {
        prop_assert_eq!(concat(posix::splitroot(path.as_str())), path.as_bytes());
    }

    #[test]
    fn nt_splitroot_reassembles(path in nt_path()) {
        prop_assert_eq!(concat(nt::splitroot(path.as_str())), path.as_bytes());
    }

    #[test]
    fn posix_split_reassembles(path in posix_path()) {
        let (head, tail) = posix::split(path.as_str());
        let joined = posix::join(&head, [&tail]).unwrap();
        prop_assert_eq!(posix::normpath(&joined), posix::normpath(path.as_str()));
    }

    #[test]
    fn text_and_bytes_agree(path in nt_path()) {
        let text = nt::normpath(path.as_str());
        let raw = nt::normpath(path.as_bytes());
        prop_assert_eq!(text.as_bytes(), raw.as_bytes());
    }

    #[test]
    fn posix_realpath_without_links_is_lexical(path in rooted_path(&["", "/"])) {
        let fs = MemoryFileSystem::new("/work");
        let lexical = posix::abspath(&fs, path.as_str()).unwrap();
        let resolved = posix::realpath(&fs, path.as_str(), RealpathMode::Lenient).unwrap();
        prop_assert_eq!(resolved, lexical);
    }

    #[test]
    fn posix_commonpath_is_prefix(
        parts in prop::collection::vec("[a-c]{1,2}", 1..5),
        other in prop::collection::vec("[a-c]{1,2}", 1..5),
    ) {
        let a = format!("/{}", parts.join("/"));
        let b = format!("/{}", other.join("/"));
        let common = posix::commonpath([a.as_str(), b.as_str()]).unwrap();
        let rel = posix::relpath(&MemoryFileSystem::new("/"), a.as_str(), Some(common)).unwrap();
        prop_assert!(!rel.as_bytes().starts_with(b".."));
    }
}
