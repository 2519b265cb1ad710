//! JSON codec.
//!
//! Decoding is a recursive-descent scanner over the document text with
//! hooks for objects, numbers and constants. Encoding is a lazy stream of
//! text chunks with cycle detection over [`SharedValue`] cells.
//!
//! # Key Concepts
//!
//! ## Numbers
//!
//! Integral numbers that fit in `i64` decode to [`Value::Int`], wider ones
//! to [`Value::BigInt`] with their digits intact; everything else numeric
//! decodes to [`Value::Float`]. `NaN`, `Infinity` and `-Infinity` are
//! accepted on input and, unless disabled, produced on output.
//!
//! ## Errors
//!
//! Malformed input yields a [`DecodeError`] that carries the document, the
//! character offset of the failure and its line and column.
//!
//! # Examples
//!
//! ```
//! use stdport::json::{dumps, loads, Value};
//!
//! let value = loads(r#"{"name": "stdport", "tags": [1, 2.5, null]}"#).unwrap();
//! assert_eq!(value.get("name"), Some(&Value::from("stdport")));
//! assert_eq!(dumps(&value).unwrap(), r#"{"name": "stdport", "tags": [1, 2.5, null]}"#);
//!
//! let err = loads(r#"{"a": 1,}"#).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Illegal trailing comma before end of object: line 1 column 8 (char 7)"
//! );
//! ```

use std::io::{Read, Write};

mod decoder;
mod encoder;
mod error;
mod interop;
mod scanner;
mod value;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use decoder::{
    decode_bytes, detect_encoding, scanstring, Decoder, DecoderOptions, Encoding, ObjectHook,
    ObjectPairsHook, ParseHook, DEFAULT_MAX_DEPTH,
};
pub use encoder::{
    encode_basestring, encode_basestring_ascii, float_repr, DefaultHook, Encoder, EncoderOptions,
    Indent, IterEncode,
};
pub use error::DecodeError;
pub use value::{CustomValue, Key, Object, SharedValue, Value};

use crate::error::Result;

/// Decodes a JSON document with default options.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn loads(doc: &str) -> Result<Value> {
    Decoder::new().decode(doc)
}

/// Decodes a JSON document given as bytes in UTF-8, UTF-16 or UTF-32.
///
/// # Errors
///
/// Returns [`Error::Value`](crate::Error::Value) when the bytes cannot be
/// decoded, otherwise see [`Decoder::decode`].
///
/// # Examples
///
/// ```
/// use stdport::json::{loads_bytes, Value};
///
/// let utf16: Vec<u8> = "[1]".encode_utf16().flat_map(u16::to_le_bytes).collect();
/// assert_eq!(loads_bytes(&utf16).unwrap(), Value::Array(vec![Value::Int(1)]));
/// ```
pub fn loads_bytes(doc: &[u8]) -> Result<Value> {
    Decoder::new().decode_bytes(doc)
}

/// Reads a whole document from `reader` and decodes it.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) when reading fails, otherwise see
/// [`loads_bytes`].
pub fn load<R: Read>(reader: R) -> Result<Value> {
    Decoder::new().load(reader)
}

/// Encodes a value with default options.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn dumps(value: &Value) -> Result<String> {
    Encoder::new().encode(value)
}

/// Encodes a value into `writer` with default options.
///
/// # Errors
///
/// See [`Encoder::dump`].
pub fn dump<W: Write>(value: &Value, writer: W) -> Result<()> {
    Encoder::new().dump(value, writer)
}
