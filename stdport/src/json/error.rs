use thiserror::Error;

/// Malformed JSON input.
///
/// `pos` is a character offset into `doc`; `lineno` and `colno` are
/// 1-based.
///
/// # Examples
///
/// ```
/// use stdport::json::DecodeError;
///
/// let err = DecodeError::new("Expecting value", "[1,\n  ]", 6);
/// assert_eq!((err.lineno, err.colno), (2, 3));
/// assert_eq!(err.to_string(), "Expecting value: line 2 column 3 (char 6)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}: line {lineno} column {colno} (char {pos})")]
pub struct DecodeError {
    /// The unformatted message.
    pub msg: String,
    /// The document being parsed.
    pub doc: String,
    /// Character offset of the failure.
    pub pos: usize,
    /// Line of the failure.
    pub lineno: usize,
    /// Column of the failure.
    pub colno: usize,
}

impl DecodeError {
    /// Builds an error at character offset `pos` of `doc`.
    pub fn new(msg: impl Into<String>, doc: impl Into<String>, pos: usize) -> Self {
        let doc = doc.into();
        let before = doc.chars().take(pos);
        let (lineno, colno) = before.fold((1, 1), |(line, col), c| {
            if c == '\n' {
                (line + 1, 1)
            } else {
                (line, col + 1)
            }
        });
        Self {
            msg: msg.into(),
            doc,
            pos,
            lineno,
            colno,
        }
    }

    /// Builds an error at byte offset `index` of `doc`.
    pub(crate) fn at_byte(msg: impl Into<String>, doc: &str, index: usize) -> Self {
        let pos = char_offset(doc, index);
        Self::new(msg, doc, pos)
    }
}

/// Converts a byte offset on a char boundary into a character offset.
pub(crate) fn char_offset(doc: &str, index: usize) -> usize {
    doc.get(..index).map_or(index, |prefix| prefix.chars().count())
}
