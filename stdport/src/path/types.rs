//! Path value types.
//!
//! Every grammar operation accepts and returns a [`PathValue`], which is
//! either a character string or a byte string. Operations never mix the two:
//! the result always has the kind of the inputs, and a call that receives
//! both kinds fails with a type error before doing any work.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The kind of a [`PathValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A character string path.
    Str,
    /// A byte string path.
    Bytes,
}

impl PathKind {
    /// Wraps raw bytes produced by a grammar operation into a value of this kind.
    ///
    /// Grammar operations only cut text at ASCII separators, so `Str` results
    /// are valid UTF-8; bytes coming from the OS are converted lossily.
    #[must_use]
    pub(crate) fn wrap(self, bytes: Vec<u8>) -> PathValue {
        match self {
            Self::Bytes => PathValue::Bytes(bytes),
            Self::Str => match String::from_utf8(bytes) {
                Ok(s) => PathValue::Str(s),
                Err(e) => PathValue::Str(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }

    /// Converts an OS string to raw bytes of this kind.
    pub(crate) fn os_bytes(self, os: &OsStr) -> Vec<u8> {
        match self {
            Self::Bytes => os.as_encoded_bytes().to_vec(),
            Self::Str => os.to_string_lossy().into_owned().into_bytes(),
        }
    }

    /// Length in bytes of the character starting at `bytes[0]`.
    ///
    /// Byte paths are indexed per byte; text paths per UTF-8 character.
    pub(crate) fn char_len(self, bytes: &[u8]) -> usize {
        match (self, bytes.first()) {
            (_, None) => 0,
            (Self::Bytes, Some(_)) => 1,
            (Self::Str, Some(&b)) => match b {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                _ => 4,
            }
            .min(bytes.len()),
        }
    }

    /// Lowercases raw path bytes the way this kind folds case.
    pub(crate) fn lowercase(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Bytes => bytes.to_ascii_lowercase(),
            Self::Str => String::from_utf8_lossy(bytes).to_lowercase().into_bytes(),
        }
    }

    /// Checks that every value has the same kind and returns it.
    ///
    /// # Errors
    ///
    /// Returns a type error when text and byte paths are mixed. An empty
    /// input yields `Str`.
    pub(crate) fn common<'a, I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a PathValue>,
    {
        let mut kind = None;
        for value in values {
            match kind {
                None => kind = Some(value.kind()),
                Some(k) if k != value.kind() => {
                    return Err(Error::type_error(
                        "Can't mix strings and bytes in path components",
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(kind.unwrap_or(Self::Str))
    }
}

/// A path in either character-string or byte-string form.
///
/// # Examples
///
/// ```
/// use stdport::path::{PathKind, PathValue};
///
/// let text = PathValue::from("/usr/lib");
/// let raw = PathValue::from(b"/usr/lib");
/// assert_eq!(text.kind(), PathKind::Str);
/// assert_eq!(raw.kind(), PathKind::Bytes);
/// assert_eq!(text.as_bytes(), raw.as_bytes());
/// assert_ne!(text, raw);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathValue {
    /// A character string path.
    Str(String),
    /// A byte string path.
    Bytes(Vec<u8>),
}

impl PathValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> PathKind {
        match self {
            Self::Str(_) => PathKind::Str,
            Self::Bytes(_) => PathKind::Bytes,
        }
    }

    /// Returns the raw bytes of this value.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Str(s) => s.as_bytes(),
            Self::Bytes(b) => b,
        }
    }

    /// Returns the text of a character-string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bytes(_) => None,
        }
    }

    /// Returns `true` if the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns a lossy text rendering, for diagnostics.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            Self::Str(s) => Cow::Borrowed(s),
            Self::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Converts this value into a host path for filesystem probes.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        bytes_to_path(self.as_bytes())
    }
}

/// Converts raw path bytes into a host path.
#[cfg(unix)]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

/// Converts raw path bytes into a host path.
#[cfg(not(unix))]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for PathValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for PathValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for PathValue {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<&[u8]> for PathValue {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for PathValue {
    fn from(b: &[u8; N]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for PathValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&PathValue> for PathValue {
    fn from(p: &PathValue) -> Self {
        p.clone()
    }
}

impl From<&Path> for PathValue {
    fn from(p: &Path) -> Self {
        Self::Str(p.to_string_lossy().into_owned())
    }
}

impl PartialEq<str> for PathValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for PathValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<[u8]> for PathValue {
    fn eq(&self, other: &[u8]) -> bool {
        matches!(self, Self::Bytes(b) if b.as_slice() == other)
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for PathValue {
    fn eq(&self, other: &&[u8; N]) -> bool {
        matches!(self, Self::Bytes(b) if b.as_slice() == other.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_bytes() {
        let p = PathValue::from("a/b");
        assert_eq!(p.kind(), PathKind::Str);
        assert_eq!(p.as_bytes(), b"a/b");
        assert_eq!(p.as_str(), Some("a/b"));

        let b = PathValue::from(b"a/b");
        assert_eq!(b.kind(), PathKind::Bytes);
        assert_eq!(b.as_str(), None);
    }

    #[test]
    fn test_common_kind_rejects_mixing() {
        let a = PathValue::from("a");
        let b = PathValue::from(b"b");
        let err = PathKind::common([&a, &b]).unwrap_err();
        assert!(matches!(err, Error::Type { .. }));
        assert!(err.to_string().contains("mix strings and bytes"));
    }

    #[test]
    fn test_common_kind_uniform() {
        let a = PathValue::from(b"a");
        let b = PathValue::from(b"b");
        assert_eq!(PathKind::common([&a, &b]).unwrap(), PathKind::Bytes);
    }

    #[test]
    fn test_wrap_lossy_for_invalid_text() {
        let value = PathKind::Str.wrap(vec![b'a', 0xff]);
        assert_eq!(value, "a\u{fffd}");
    }

    #[test]
    fn test_char_len() {
        assert_eq!(PathKind::Str.char_len("é:".as_bytes()), 2);
        assert_eq!(PathKind::Bytes.char_len("é:".as_bytes()), 1);
        assert_eq!(PathKind::Str.char_len(b""), 0);
    }

    #[test]
    fn test_lowercase() {
        assert_eq!(PathKind::Str.lowercase("C:\\ÄB".as_bytes()), "c:\\äb".as_bytes());
        assert_eq!(PathKind::Bytes.lowercase(b"C:\\AB"), b"c:\\ab");
    }

    #[test]
    fn test_display_is_lossy() {
        let p = PathValue::from(vec![b'x', 0xfe]);
        assert_eq!(p.to_string(), "x\u{fffd}");
    }

    #[test]
    fn test_comparisons_with_literals() {
        assert_eq!(PathValue::from("x"), "x");
        assert_eq!(PathValue::from(b"x"), b"x");
        assert_ne!(PathValue::from("x"), b"x");
    }

    #[cfg(unix)]
    #[test]
    fn test_host_path_keeps_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let raw = PathValue::from(&b"/tmp/\xffname"[..]);
        assert_eq!(raw.to_path_buf().as_os_str().as_bytes(), b"/tmp/\xffname");
        assert_eq!(PathValue::from("/tmp/é").to_path_buf(), PathBuf::from("/tmp/é"));
    }
}
