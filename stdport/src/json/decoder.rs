//! JSON decoding: options, hooks and the [`Decoder`] front end.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use super::error::{char_offset, DecodeError};
use super::scanner::{build_object, scan_string, skip_ws, Scanner};
use super::value::{Object, Value};
use crate::error::{Error, Result};

/// Nesting depth at which decoding and encoding give up.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Called with every decoded object.
pub type ObjectHook = Arc<dyn Fn(Object) -> Result<Value> + Send + Sync>;

/// Called with the ordered key/value pairs of every decoded object,
/// duplicates included.
pub type ObjectPairsHook = Arc<dyn Fn(Vec<(String, Value)>) -> Result<Value> + Send + Sync>;

/// Called with the source text of a number or constant.
pub type ParseHook = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// Decoder settings.
///
/// `object_pairs_hook` takes priority over `object_hook` when both are set.
#[derive(Clone)]
pub struct DecoderOptions {
    /// Reject raw control characters inside strings.
    pub strict: bool,
    /// Maximum container nesting.
    pub max_depth: usize,
    /// Replaces every decoded object.
    pub object_hook: Option<ObjectHook>,
    /// Replaces every decoded object, seeing its raw pairs.
    pub object_pairs_hook: Option<ObjectPairsHook>,
    /// Parses numbers with a fraction or exponent.
    pub parse_float: Option<ParseHook>,
    /// Parses integral numbers.
    pub parse_int: Option<ParseHook>,
    /// Parses `NaN`, `Infinity` and `-Infinity`.
    pub parse_constant: Option<ParseHook>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_depth: DEFAULT_MAX_DEPTH,
            object_hook: None,
            object_pairs_hook: None,
            parse_float: None,
            parse_int: None,
            parse_constant: None,
        }
    }
}

impl fmt::Debug for DecoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderOptions")
            .field("strict", &self.strict)
            .field("max_depth", &self.max_depth)
            .field("object_hook", &self.object_hook.is_some())
            .field("object_pairs_hook", &self.object_pairs_hook.is_some())
            .field("parse_float", &self.parse_float.is_some())
            .field("parse_int", &self.parse_int.is_some())
            .field("parse_constant", &self.parse_constant.is_some())
            .finish()
    }
}

impl DecoderOptions {
    pub(crate) fn float(&self, text: &str) -> Result<Value> {
        match &self.parse_float {
            Some(hook) => hook(text),
            None => Ok(Value::Float(parse_f64(text))),
        }
    }

    pub(crate) fn int(&self, text: &str) -> Result<Value> {
        if let Some(hook) = &self.parse_int {
            return hook(text);
        }
        Ok(text
            .parse::<i64>()
            .map_or_else(|_| Value::BigInt(text.to_string()), Value::Int))
    }

    pub(crate) fn constant(&self, name: &str) -> Result<Value> {
        if let Some(hook) = &self.parse_constant {
            return hook(name);
        }
        let value = match name {
            "NaN" => f64::NAN,
            "Infinity" => f64::INFINITY,
            _ => f64::NEG_INFINITY,
        };
        Ok(Value::Float(value))
    }

    pub(crate) fn object(&self, pairs: Vec<(String, Value)>) -> Result<Value> {
        if let Some(hook) = &self.object_pairs_hook {
            return hook(pairs);
        }
        let obj = build_object(pairs);
        match &self.object_hook {
            Some(hook) => hook(obj),
            None => Ok(Value::Object(obj)),
        }
    }
}

// The scanner only hands over text matching the JSON number grammar, which
// `f64::from_str` always accepts; overflow saturates to infinity.
fn parse_f64(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

/// A configured JSON decoder.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stdport::json::{Decoder, Value};
///
/// let decoder = Decoder::new().with_parse_float(Arc::new(
///     |text: &str| -> stdport::Result<Value> { Ok(Value::Str(text.to_string())) },
/// ));
///
/// let value = decoder.decode("[1.10, 2]").unwrap();
/// assert_eq!(value, Value::Array(vec![Value::from("1.10"), Value::Int(2)]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    /// Creates a decoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder from explicit options.
    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Allows raw control characters inside strings when `false`.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Installs an object hook.
    #[must_use]
    pub fn with_object_hook(mut self, hook: ObjectHook) -> Self {
        self.options.object_hook = Some(hook);
        self
    }

    /// Installs an object-pairs hook.
    #[must_use]
    pub fn with_object_pairs_hook(mut self, hook: ObjectPairsHook) -> Self {
        self.options.object_pairs_hook = Some(hook);
        self
    }

    /// Installs a float parser.
    #[must_use]
    pub fn with_parse_float(mut self, hook: ParseHook) -> Self {
        self.options.parse_float = Some(hook);
        self
    }

    /// Installs an integer parser.
    #[must_use]
    pub fn with_parse_int(mut self, hook: ParseHook) -> Self {
        self.options.parse_int = Some(hook);
        self
    }

    /// Installs a constant parser.
    #[must_use]
    pub fn with_parse_constant(mut self, hook: ParseHook) -> Self {
        self.options.parse_constant = Some(hook);
        self
    }

    /// Decodes a complete document.
    ///
    /// Leading and trailing whitespace is allowed; anything else after the
    /// first value is "Extra data".
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed input, [`Error::Recursion`]
    /// for excessive nesting, or whatever a hook returns.
    pub fn decode(&self, doc: &str) -> Result<Value> {
        if doc.starts_with('\u{feff}') {
            return Err(Error::Decode(DecodeError::new(
                "Unexpected UTF-8 BOM (decode using utf-8-sig)",
                doc,
                0,
            )));
        }
        let bytes = doc.as_bytes();
        let start = skip_ws(bytes, 0);
        let (value, end) = Scanner::new(doc, &self.options).scan_once(start)?;
        let end = skip_ws(bytes, end);
        if end != bytes.len() {
            return Err(Error::Decode(DecodeError::at_byte("Extra data", doc, end)));
        }
        log::trace!("decoded {} bytes of JSON", bytes.len());
        Ok(value)
    }

    /// Decodes one value starting at character offset `idx`, ignoring
    /// whatever follows it.
    ///
    /// Returns the value and the character offset just past it. No
    /// whitespace is skipped.
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::decode`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stdport::json::{Decoder, Value};
    ///
    /// let (value, end) = Decoder::new().raw_decode("é [1] trailing", 2).unwrap();
    /// assert_eq!(value, Value::Array(vec![Value::Int(1)]));
    /// assert_eq!(end, 5);
    /// ```
    pub fn raw_decode(&self, doc: &str, idx: usize) -> Result<(Value, usize)> {
        let start = byte_offset(doc, idx);
        let (value, end) = Scanner::new(doc, &self.options).scan_once(start)?;
        Ok((value, char_offset(doc, end)))
    }

    /// Decodes a byte document after detecting its encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] when the bytes are not valid in the
    /// detected encoding, otherwise see [`Decoder::decode`].
    pub fn decode_bytes(&self, doc: &[u8]) -> Result<Value> {
        self.decode(&decode_bytes(doc)?)
    }

    /// Reads `reader` to the end and decodes the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when reading fails, otherwise see
    /// [`Decoder::decode_bytes`].
    pub fn load<R: Read>(&self, mut reader: R) -> Result<Value> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.decode_bytes(&buf)
    }
}

fn byte_offset(doc: &str, idx: usize) -> usize {
    doc.char_indices().nth(idx).map_or(doc.len(), |(i, _)| i)
}

/// Decodes a string literal body starting at character offset `end` (just
/// past the opening quote).
///
/// Returns the string and the character offset just past the closing quote.
///
/// # Errors
///
/// Returns [`Error::Decode`] for an unterminated string, an invalid escape
/// or (when `strict`) a raw control character.
///
/// # Examples
///
/// ```
/// use stdport::json::scanstring;
///
/// let (s, end) = scanstring(r#""aéb" rest"#, 1, true).unwrap();
/// assert_eq!(s, "aéb");
/// assert_eq!(end, 5);
/// ```
pub fn scanstring(doc: &str, end: usize, strict: bool) -> Result<(String, usize)> {
    let (s, after) = scan_string(doc, byte_offset(doc, end), strict)?;
    Ok((s, char_offset(doc, after)))
}

/// A Unicode encoding detected from the first bytes of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 without a byte order mark.
    Utf8,
    /// UTF-8 with a byte order mark.
    Utf8Sig,
    /// UTF-16 with a byte order mark.
    Utf16,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32 with a byte order mark.
    Utf32,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
}

const BOM_UTF8: &[u8] = b"\xef\xbb\xbf";
const BOM_UTF16_BE: &[u8] = b"\xfe\xff";
const BOM_UTF16_LE: &[u8] = b"\xff\xfe";
const BOM_UTF32_BE: &[u8] = b"\x00\x00\xfe\xff";
const BOM_UTF32_LE: &[u8] = b"\xff\xfe\x00\x00";

/// Guesses the encoding of a JSON document from its byte order mark or,
/// failing that, from the pattern of zero bytes in its first characters.
///
/// # Examples
///
/// ```
/// use stdport::json::{detect_encoding, Encoding};
///
/// assert_eq!(detect_encoding(b"{}"), Encoding::Utf8);
/// assert_eq!(detect_encoding(b"\x00[\x00]"), Encoding::Utf16Be);
/// assert_eq!(detect_encoding(b"\xff\xfe\x00\x00[\x00\x00\x00"), Encoding::Utf32);
/// ```
#[must_use]
pub fn detect_encoding(b: &[u8]) -> Encoding {
    if b.starts_with(BOM_UTF32_BE) || b.starts_with(BOM_UTF32_LE) {
        return Encoding::Utf32;
    }
    if b.starts_with(BOM_UTF16_BE) || b.starts_with(BOM_UTF16_LE) {
        return Encoding::Utf16;
    }
    if b.starts_with(BOM_UTF8) {
        return Encoding::Utf8Sig;
    }
    if b.len() >= 4 {
        if b[0] == 0 {
            return if b[1] != 0 {
                Encoding::Utf16Be
            } else {
                Encoding::Utf32Be
            };
        }
        if b[1] == 0 {
            return if b[2] != 0 || b[3] != 0 {
                Encoding::Utf16Le
            } else {
                Encoding::Utf32Le
            };
        }
    } else if b.len() == 2 {
        if b[0] == 0 {
            return Encoding::Utf16Be;
        }
        if b[1] == 0 {
            return Encoding::Utf16Le;
        }
    }
    Encoding::Utf8
}

fn codec_error(encoding: Encoding, reason: &str) -> Error {
    Error::value_error(format!("cannot decode document as {encoding:?}: {reason}"))
}

fn decode_utf16(encoding: Encoding, body: &[u8], big_endian: bool) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(codec_error(encoding, "truncated data"));
    }
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

fn decode_utf32(encoding: Encoding, body: &[u8], big_endian: bool) -> Result<String> {
    if body.len() % 4 != 0 {
        return Err(codec_error(encoding, "truncated data"));
    }
    body.chunks_exact(4)
        .map(|quad| {
            let quad = [quad[0], quad[1], quad[2], quad[3]];
            let code = if big_endian {
                u32::from_be_bytes(quad)
            } else {
                u32::from_le_bytes(quad)
            };
            match char::from_u32(code) {
                Some(c) => Ok(c),
                None if (0xd800..=0xdfff).contains(&code) => Ok(char::REPLACEMENT_CHARACTER),
                None => Err(codec_error(encoding, "code point not in range(0x110000)")),
            }
        })
        .collect()
}

/// Decodes a byte document to text using [`detect_encoding`].
///
/// Byte order marks are consumed. Unpaired surrogates become U+FFFD.
///
/// # Errors
///
/// Returns [`Error::Value`] when the bytes are not valid in the detected
/// encoding.
pub fn decode_bytes(b: &[u8]) -> Result<String> {
    let encoding = detect_encoding(b);
    match encoding {
        Encoding::Utf8 | Encoding::Utf8Sig => {
            let body = b.strip_prefix(BOM_UTF8).unwrap_or(b);
            String::from_utf8(body.to_vec()).map_err(|e| codec_error(encoding, &e.to_string()))
        }
        Encoding::Utf16 => {
            let big_endian = b.starts_with(BOM_UTF16_BE);
            decode_utf16(encoding, &b[2..], big_endian)
        }
        Encoding::Utf16Be => decode_utf16(encoding, b, true),
        Encoding::Utf16Le => decode_utf16(encoding, b, false),
        Encoding::Utf32 => {
            let big_endian = b.starts_with(BOM_UTF32_BE);
            decode_utf32(encoding, &b[4..], big_endian)
        }
        Encoding::Utf32Be => decode_utf32(encoding, b, true),
        Encoding::Utf32Le => decode_utf32(encoding, b, false),
    }
}
