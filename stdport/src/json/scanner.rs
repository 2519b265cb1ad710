//! The recursive-descent scanner behind [`Decoder`](super::Decoder).
//!
//! All cursor positions in this module are byte offsets into a `&str`.
//! Every structural character is ASCII, so each offset the scanner stops at
//! is a char boundary; conversion to character offsets happens only when an
//! error is reported.

use super::decoder::DecoderOptions;
use super::error::DecodeError;
use super::value::{Object, Value};
use crate::error::{Error, Result};

fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Returns the first offset at or after `idx` that is not JSON whitespace.
pub(crate) fn skip_ws(bytes: &[u8], mut idx: usize) -> usize {
    while bytes.get(idx).copied().is_some_and(is_ws) {
        idx += 1;
    }
    idx
}

fn decode_error(msg: impl Into<String>, doc: &str, idx: usize) -> Error {
    Error::Decode(DecodeError::at_byte(msg, doc, idx))
}

fn hex4(bytes: &[u8], at: usize) -> Option<u32> {
    let digits = bytes.get(at..at + 4)?;
    digits.iter().try_fold(0u32, |acc, &b| {
        let d = char::from(b).to_digit(16)?;
        Some(acc << 4 | d)
    })
}

fn is_high_surrogate(c: u32) -> bool {
    (0xd800..=0xdbff).contains(&c)
}

fn is_low_surrogate(c: u32) -> bool {
    (0xdc00..=0xdfff).contains(&c)
}

/// Scans the body of a string literal.
///
/// `end` is the offset just past the opening quote. Returns the decoded
/// string and the offset just past the closing quote. A lone surrogate
/// decodes to U+FFFD.
pub(crate) fn scan_string(doc: &str, end: usize, strict: bool) -> Result<(String, usize)> {
    let bytes = doc.as_bytes();
    let begin = end.saturating_sub(1);
    let mut out = String::new();
    let mut idx = end;

    loop {
        let run = bytes[idx.min(bytes.len())..]
            .iter()
            .position(|&b| b == b'"' || b == b'\\' || b < 0x20);
        let Some(run) = run else {
            return Err(decode_error("Unterminated string starting at", doc, begin));
        };
        out.push_str(&doc[idx..idx + run]);
        idx += run;

        match bytes[idx] {
            b'"' => return Ok((out, idx + 1)),
            b'\\' => {}
            control => {
                if strict {
                    return Err(decode_error("Invalid control character at", doc, idx));
                }
                out.push(char::from(control));
                idx += 1;
                continue;
            }
        }

        let backslash = idx;
        let Some(&esc) = bytes.get(backslash + 1) else {
            return Err(decode_error("Unterminated string starting at", doc, begin));
        };
        if esc != b'u' {
            let c = match esc {
                b'"' => '"',
                b'\\' => '\\',
                b'/' => '/',
                b'b' => '\u{8}',
                b'f' => '\u{c}',
                b'n' => '\n',
                b'r' => '\r',
                b't' => '\t',
                _ => return Err(decode_error("Invalid \\escape", doc, backslash)),
            };
            out.push(c);
            idx = backslash + 2;
            continue;
        }

        let u = backslash + 1;
        if u + 5 > bytes.len() {
            return Err(decode_error("Invalid \\uXXXX escape", doc, u));
        }
        let Some(mut code) = hex4(bytes, u + 1) else {
            return Err(decode_error("Invalid \\uXXXX escape", doc, u));
        };
        idx = u + 5;

        if is_high_surrogate(code) && idx + 6 <= bytes.len() && bytes[idx..].starts_with(b"\\u") {
            let Some(low) = hex4(bytes, idx + 2) else {
                return Err(decode_error("Invalid \\uXXXX escape", doc, idx + 1));
            };
            if is_low_surrogate(low) {
                code = 0x10000 + ((code - 0xd800) << 10 | (low - 0xdc00));
                idx += 6;
            }
        }
        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
}

/// Scans JSON elements out of one document.
pub(crate) struct Scanner<'a> {
    doc: &'a str,
    bytes: &'a [u8],
    options: &'a DecoderOptions,
    depth: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(doc: &'a str, options: &'a DecoderOptions) -> Self {
        Self {
            doc,
            bytes: doc.as_bytes(),
            options,
            depth: 0,
        }
    }

    fn error(&self, msg: &str, idx: usize) -> Error {
        decode_error(msg, self.doc, idx)
    }

    fn looking_at(&self, idx: usize, word: &str) -> bool {
        self.bytes
            .get(idx..)
            .is_some_and(|rest| rest.starts_with(word.as_bytes()))
    }

    /// Scans one element starting exactly at `idx`.
    ///
    /// Returns the element and the offset just past it.
    pub(crate) fn scan_once(&mut self, idx: usize) -> Result<(Value, usize)> {
        let Some(&next) = self.bytes.get(idx) else {
            return Err(self.error("Expecting value", idx));
        };
        match next {
            b'"' => {
                let (s, end) = scan_string(self.doc, idx + 1, self.options.strict)?;
                Ok((Value::Str(s), end))
            }
            b'{' => self.nested(|scanner| scanner.parse_object(idx + 1)),
            b'[' => self.nested(|scanner| scanner.parse_array(idx + 1)),
            b'n' if self.looking_at(idx, "null") => Ok((Value::Null, idx + 4)),
            b't' if self.looking_at(idx, "true") => Ok((Value::Bool(true), idx + 4)),
            b'f' if self.looking_at(idx, "false") => Ok((Value::Bool(false), idx + 5)),
            _ => {
                if let Some(found) = self.match_number(idx)? {
                    return Ok(found);
                }
                for constant in ["NaN", "Infinity", "-Infinity"] {
                    if self.looking_at(idx, constant) {
                        let value = self.options.constant(constant)?;
                        return Ok((value, idx + constant.len()));
                    }
                }
                Err(self.error("Expecting value", idx))
            }
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<(Value, usize)>
    where
        F: FnOnce(&mut Self) -> Result<(Value, usize)>,
    {
        if self.depth >= self.options.max_depth {
            return Err(Error::Recursion {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Matches `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?` at `idx`.
    fn match_number(&self, idx: usize) -> Result<Option<(Value, usize)>> {
        let bytes = self.bytes;
        let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
        let mut end = idx;

        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        match bytes.get(end) {
            Some(b'0') => end += 1,
            Some(b'1'..=b'9') => {
                while digit(end) {
                    end += 1;
                }
            }
            _ => return Ok(None),
        }

        let mut is_float = false;
        if bytes.get(end) == Some(&b'.') && digit(end + 1) {
            is_float = true;
            end += 1;
            while digit(end) {
                end += 1;
            }
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'-' | b'+')) {
                exp += 1;
            }
            if digit(exp) {
                is_float = true;
                end = exp;
                while digit(end) {
                    end += 1;
                }
            }
        }

        let text = &self.doc[idx..end];
        let value = if is_float {
            self.options.float(text)?
        } else {
            self.options.int(text)?
        };
        Ok(Some((value, end)))
    }

    fn parse_object(&mut self, start: usize) -> Result<(Value, usize)> {
        let mut pairs: Vec<(String, Value)> = Vec::new();
        let mut idx = skip_ws(self.bytes, start);

        if self.bytes.get(idx) != Some(&b'}') {
            loop {
                if self.bytes.get(idx) != Some(&b'"') {
                    return Err(self.error(
                        "Expecting property name enclosed in double quotes",
                        idx,
                    ));
                }
                let (key, after_key) = scan_string(self.doc, idx + 1, self.options.strict)?;
                idx = skip_ws(self.bytes, after_key);
                if self.bytes.get(idx) != Some(&b':') {
                    return Err(self.error("Expecting ':' delimiter", idx));
                }
                idx = skip_ws(self.bytes, idx + 1);

                let (value, after_value) = self.scan_once(idx)?;
                pairs.push((key, value));
                idx = skip_ws(self.bytes, after_value);

                match self.bytes.get(idx) {
                    Some(b'}') => break,
                    Some(b',') => {}
                    _ => return Err(self.error("Expecting ',' delimiter", idx)),
                }
                let comma = idx;
                idx = skip_ws(self.bytes, idx + 1);
                if self.bytes.get(idx) == Some(&b'}') {
                    return Err(self.error("Illegal trailing comma before end of object", comma));
                }
            }
        }

        Ok((self.options.object(pairs)?, idx + 1))
    }

    fn parse_array(&mut self, start: usize) -> Result<(Value, usize)> {
        let mut items = Vec::new();
        let mut idx = skip_ws(self.bytes, start);

        if self.bytes.get(idx) != Some(&b']') {
            loop {
                let (value, after_value) = self.scan_once(idx)?;
                items.push(value);
                idx = skip_ws(self.bytes, after_value);

                match self.bytes.get(idx) {
                    Some(b']') => break,
                    Some(b',') => {}
                    _ => return Err(self.error("Expecting ',' delimiter", idx)),
                }
                let comma = idx;
                idx = skip_ws(self.bytes, idx + 1);
                if self.bytes.get(idx) == Some(&b']') {
                    return Err(self.error("Illegal trailing comma before end of array", comma));
                }
            }
        }

        Ok((Value::Array(items), idx + 1))
    }
}

/// Builds a plain object from decoded pairs; later duplicates win.
pub(crate) fn build_object(pairs: Vec<(String, Value)>) -> Object {
    pairs.into_iter().collect()
}
