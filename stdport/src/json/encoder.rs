//! Streaming JSON encoding.
//!
//! [`Encoder::iterencode`] returns an [`IterEncode`], an iterator of text
//! chunks driven by an explicit stack of open containers. Deep nesting costs
//! heap, not call stack, and output can be written as it is produced.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::decoder::DEFAULT_MAX_DEPTH;
use super::value::{is_integer_literal, CustomValue, Key, Value};
use crate::error::{Error, Result};

/// Turns a value the encoder cannot handle into one it can.
pub type DefaultHook = Arc<dyn Fn(&dyn CustomValue) -> Result<Value> + Send + Sync>;

/// Indentation unit for pretty-printed output.
///
/// # Examples
///
/// ```
/// use stdport::json::Indent;
///
/// assert_eq!(Indent::Spaces(2).unit(), "  ");
/// assert_eq!(Indent::Text("\t".into()).unit(), "\t");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Indent {
    /// That many spaces per level.
    Spaces(usize),
    /// A literal string per level.
    Text(String),
}

impl Indent {
    /// Returns the string inserted once per nesting level.
    #[must_use]
    pub fn unit(&self) -> Cow<'_, str> {
        match self {
            Self::Spaces(n) => Cow::Owned(" ".repeat(*n)),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl From<usize> for Indent {
    fn from(n: usize) -> Self {
        Self::Spaces(n)
    }
}

impl From<&str> for Indent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Encoder settings.
#[derive(Clone)]
pub struct EncoderOptions {
    /// Skip keys of unsupported types instead of failing.
    pub skipkeys: bool,
    /// Escape everything outside printable ASCII.
    pub ensure_ascii: bool,
    /// Detect shared cells that contain themselves.
    pub check_circular: bool,
    /// Emit `NaN` and `Infinity` instead of failing.
    pub allow_nan: bool,
    /// Emit object entries sorted by their encoded key.
    pub sort_keys: bool,
    /// Pretty-print with this indentation.
    pub indent: Option<Indent>,
    /// Item and key separators; defaults depend on `indent`.
    pub separators: Option<(String, String)>,
    /// Converts custom values.
    pub default: Option<DefaultHook>,
    /// Maximum nesting, counting shared cells and custom values.
    pub max_depth: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            skipkeys: false,
            ensure_ascii: true,
            check_circular: true,
            allow_nan: true,
            sort_keys: false,
            indent: None,
            separators: None,
            default: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for EncoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderOptions")
            .field("skipkeys", &self.skipkeys)
            .field("ensure_ascii", &self.ensure_ascii)
            .field("check_circular", &self.check_circular)
            .field("allow_nan", &self.allow_nan)
            .field("sort_keys", &self.sort_keys)
            .field("indent", &self.indent)
            .field("separators", &self.separators)
            .field("default", &self.default.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl EncoderOptions {
    /// Returns the effective `(item, key)` separators.
    #[must_use]
    pub fn effective_separators(&self) -> (&str, &str) {
        match (&self.separators, &self.indent) {
            (Some((item, key)), _) => (item, key),
            (None, Some(_)) => (",", ": "),
            (None, None) => (", ", ": "),
        }
    }
}

/// A configured JSON encoder.
///
/// # Examples
///
/// ```
/// use stdport::json::{Encoder, Indent, Object, Value};
///
/// let obj: Object = [("b", Value::from(1)), ("a", Value::from(vec![Value::Null]))]
///     .into_iter()
///     .collect();
///
/// let encoder = Encoder::new().with_sort_keys(true).with_indent(Indent::Spaces(2));
/// assert_eq!(
///     encoder.encode(&Value::from(obj)).unwrap(),
///     "{\n  \"a\": [\n    null\n  ],\n  \"b\": 1\n}"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Creates an encoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder from explicit options.
    #[must_use]
    pub fn with_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Skips unsupported keys when `true`.
    #[must_use]
    pub fn with_skipkeys(mut self, skipkeys: bool) -> Self {
        self.options.skipkeys = skipkeys;
        self
    }

    /// Escapes non-ASCII output when `true`.
    #[must_use]
    pub fn with_ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.options.ensure_ascii = ensure_ascii;
        self
    }

    /// Enables or disables cycle detection.
    #[must_use]
    pub fn with_check_circular(mut self, check_circular: bool) -> Self {
        self.options.check_circular = check_circular;
        self
    }

    /// Allows non-finite floats when `true`.
    #[must_use]
    pub fn with_allow_nan(mut self, allow_nan: bool) -> Self {
        self.options.allow_nan = allow_nan;
        self
    }

    /// Sorts object entries when `true`.
    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.options.sort_keys = sort_keys;
        self
    }

    /// Enables pretty-printing.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<Indent>) -> Self {
        self.options.indent = Some(indent.into());
        self
    }

    /// Overrides the item and key separators.
    #[must_use]
    pub fn with_separators(mut self, item: impl Into<String>, key: impl Into<String>) -> Self {
        self.options.separators = Some((item.into(), key.into()));
        self
    }

    /// Installs the hook for custom values.
    #[must_use]
    pub fn with_default(mut self, hook: DefaultHook) -> Self {
        self.options.default = Some(hook);
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Encodes a value to a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] for unencodable values or keys,
    /// [`Error::Value`] for disallowed non-finite floats,
    /// [`Error::CircularReference`] or [`Error::Recursion`].
    pub fn encode(&self, value: &Value) -> Result<String> {
        if let Value::Str(s) = value {
            return Ok(quote(s, self.options.ensure_ascii));
        }
        self.iterencode(value).collect()
    }

    /// Returns a lazy iterator over the encoded chunks of `value`.
    ///
    /// The iterator stops after the first error.
    #[must_use]
    pub fn iterencode<'a>(&'a self, value: &'a Value) -> IterEncode<'a> {
        IterEncode::new(&self.options, value)
    }

    /// Encodes a value into a writer chunk by chunk.
    ///
    /// # Errors
    ///
    /// Same as [`Encoder::encode`], plus [`Error::Io`] for write failures.
    /// Output written before an error is not rolled back.
    pub fn dump<W: Write>(&self, value: &Value, mut writer: W) -> Result<()> {
        for chunk in self.iterencode(value) {
            writer.write_all(chunk?.as_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }
}

enum Frame<'a> {
    Array {
        children: Children<'a>,
        len: usize,
        next: usize,
    },
    Object {
        children: Children<'a>,
        keys: Vec<(String, usize)>,
        next: usize,
    },
    /// Leaves a shared cell or custom value.
    Release(Option<usize>),
}

/// Children of an open container. Owned containers (cell contents and
/// hook results) hand each child over by move; each index is taken once.
enum Children<'a> {
    Items(&'a [Value]),
    Entries(&'a [(Key, Value)]),
    Owned(Vec<Option<Value>>),
}

impl<'a> Children<'a> {
    fn take(&mut self, index: usize) -> Cow<'a, Value> {
        match self {
            Self::Items(items) => {
                let items: &'a [Value] = *items;
                Cow::Borrowed(&items[index])
            }
            Self::Entries(entries) => {
                let entries: &'a [(Key, Value)] = *entries;
                Cow::Borrowed(&entries[index].1)
            }
            Self::Owned(values) => Cow::Owned(values[index].take().unwrap_or_default()),
        }
    }
}

/// Lazy chunk stream produced by [`Encoder::iterencode`].
pub struct IterEncode<'a> {
    options: &'a EncoderOptions,
    item_separator: String,
    key_separator: String,
    indent: Option<String>,
    pending: Option<(String, Cow<'a, Value>)>,
    stack: Vec<Frame<'a>>,
    markers: HashSet<usize>,
    level: usize,
    depth: usize,
    failed: bool,
}

fn newline_indent(out: &mut String, indent: Option<&str>, level: usize) {
    if let Some(unit) = indent {
        out.push('\n');
        for _ in 0..level {
            out.push_str(unit);
        }
    }
}

impl<'a> IterEncode<'a> {
    fn new(options: &'a EncoderOptions, value: &'a Value) -> Self {
        let (item, key) = options.effective_separators();
        Self {
            options,
            item_separator: item.to_string(),
            key_separator: key.to_string(),
            indent: options.indent.as_ref().map(|i| i.unit().into_owned()),
            pending: Some((String::new(), Cow::Borrowed(value))),
            stack: Vec::new(),
            markers: HashSet::new(),
            level: 0,
            depth: 0,
            failed: false,
        }
    }

    fn step(&mut self) -> Result<Option<String>> {
        loop {
            if let Some((prefix, value)) = self.pending.take() {
                return self.begin(prefix, value).map(Some);
            }
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            match frame {
                Frame::Release(marker) => {
                    if let Some(id) = *marker {
                        self.markers.remove(&id);
                    }
                    self.stack.pop();
                    self.depth -= 1;
                }
                Frame::Array {
                    children,
                    len,
                    next,
                } => {
                    if *next == *len {
                        self.stack.pop();
                        return Ok(Some(self.close(']')));
                    }
                    let mut prefix = String::new();
                    if *next > 0 {
                        prefix.push_str(&self.item_separator);
                        newline_indent(&mut prefix, self.indent.as_deref(), self.level);
                    }
                    self.pending = Some((prefix, children.take(*next)));
                    *next += 1;
                }
                Frame::Object {
                    children,
                    keys,
                    next,
                } => {
                    if *next == keys.len() {
                        self.stack.pop();
                        return Ok(Some(self.close('}')));
                    }
                    let (key, index) = &keys[*next];
                    let index = *index;
                    let mut prefix = String::new();
                    if *next > 0 {
                        prefix.push_str(&self.item_separator);
                        newline_indent(&mut prefix, self.indent.as_deref(), self.level);
                    }
                    prefix.push_str(&quote(key, self.options.ensure_ascii));
                    prefix.push_str(&self.key_separator);
                    self.pending = Some((prefix, children.take(index)));
                    *next += 1;
                }
            }
        }
    }

    fn begin(&mut self, mut prefix: String, value: Cow<'a, Value>) -> Result<String> {
        let options = self.options;
        match value {
            Cow::Borrowed(Value::Array(items)) => {
                self.open_array(prefix, items.len(), Children::Items(items.as_slice()))
            }
            Cow::Owned(Value::Array(items)) => {
                let len = items.len();
                self.open_array(prefix, len, Children::Owned(items.into_iter().map(Some).collect()))
            }
            Cow::Borrowed(Value::Object(obj)) => {
                let entries = obj.as_slice();
                let keys = self.key_texts(entries.iter().map(|(k, _)| k))?;
                self.open_object(prefix, entries.len(), keys, Children::Entries(entries))
            }
            Cow::Owned(Value::Object(obj)) => {
                let entries = obj.into_vec();
                let len = entries.len();
                let keys = self.key_texts(entries.iter().map(|(k, _)| k))?;
                let values = entries.into_iter().map(|(_, v)| Some(v)).collect();
                self.open_object(prefix, len, keys, Children::Owned(values))
            }
            other => match other.as_ref() {
                Value::Shared(cell) => {
                    self.enter_indirect(cell.id())?;
                    let inner = cell.get();
                    self.begin(prefix, Cow::Owned(inner))
                }
                Value::Custom(custom) => {
                    let Some(hook) = &options.default else {
                        return Err(Error::type_error(format!(
                            "Object of type {} is not JSON serializable",
                            custom.type_name()
                        )));
                    };
                    self.enter_indirect(Arc::as_ptr(custom).cast::<()>() as usize)?;
                    let converted = hook(custom.as_ref())?;
                    self.begin(prefix, Cow::Owned(converted))
                }
                scalar => {
                    self.scalar(&mut prefix, scalar)?;
                    Ok(prefix)
                }
            },
        }
    }

    fn scalar(&self, out: &mut String, value: &Value) -> Result<()> {
        match value {
            Value::Str(s) => out.push_str(&quote(s, self.options.ensure_ascii)),
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::BigInt(digits) => {
                if !is_integer_literal(digits) {
                    return Err(Error::value_error(format!("Invalid integer literal: {digits:?}")));
                }
                out.push_str(digits);
            }
            Value::Float(f) => out.push_str(&float_str(*f, self.options.allow_nan)?),
            other => {
                return Err(Error::type_error(format!(
                    "Object of type {} is not JSON serializable",
                    other.type_name()
                )))
            }
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::Recursion {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn enter_indirect(&mut self, id: usize) -> Result<()> {
        let marker = if self.options.check_circular {
            if !self.markers.insert(id) {
                return Err(Error::CircularReference);
            }
            Some(id)
        } else {
            None
        };
        if let Err(e) = self.enter() {
            if let Some(id) = marker {
                self.markers.remove(&id);
            }
            return Err(e);
        }
        self.stack.push(Frame::Release(marker));
        Ok(())
    }

    fn open_array(&mut self, mut prefix: String, len: usize, children: Children<'a>) -> Result<String> {
        if len == 0 {
            prefix.push_str("[]");
            return Ok(prefix);
        }
        self.enter()?;
        self.level += 1;
        prefix.push('[');
        newline_indent(&mut prefix, self.indent.as_deref(), self.level);
        self.stack.push(Frame::Array {
            children,
            len,
            next: 0,
        });
        Ok(prefix)
    }

    /// Coerced key text and entry index, in output order.
    fn key_texts<'k>(&self, keys: impl Iterator<Item = &'k Key>) -> Result<Vec<(String, usize)>> {
        let mut texts = Vec::new();
        for (index, key) in keys.enumerate() {
            let text = match key {
                Key::Str(s) => s.clone(),
                Key::Float(f) => float_str(*f, self.options.allow_nan)?,
                Key::Bool(true) => "true".to_string(),
                Key::Bool(false) => "false".to_string(),
                Key::Null => "null".to_string(),
                Key::Int(i) => i.to_string(),
                Key::Other(_) if self.options.skipkeys => continue,
                Key::Other(type_name) => {
                    return Err(Error::type_error(format!(
                        "keys must be str, int, float, bool or None, not {type_name}"
                    )))
                }
            };
            texts.push((text, index));
        }
        if self.options.sort_keys {
            texts.sort_by(|a, b| a.0.cmp(&b.0));
        }
        Ok(texts)
    }

    fn open_object(
        &mut self,
        mut prefix: String,
        len: usize,
        keys: Vec<(String, usize)>,
        children: Children<'a>,
    ) -> Result<String> {
        if len == 0 {
            prefix.push_str("{}");
            return Ok(prefix);
        }
        self.enter()?;
        self.level += 1;
        prefix.push('{');
        newline_indent(&mut prefix, self.indent.as_deref(), self.level);
        self.stack.push(Frame::Object {
            children,
            keys,
            next: 0,
        });
        Ok(prefix)
    }

    fn close(&mut self, closer: char) -> String {
        self.level -= 1;
        self.depth -= 1;
        let mut out = String::new();
        newline_indent(&mut out, self.indent.as_deref(), self.level);
        out.push(closer);
        out
    }
}

impl Iterator for IterEncode<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                log::debug!("encoding stopped: {e}");
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for IterEncode<'_> {}

fn quote(s: &str, ensure_ascii: bool) -> String {
    if ensure_ascii {
        encode_basestring_ascii(s)
    } else {
        encode_basestring(s)
    }
}

fn push_escape(out: &mut String, c: char) -> bool {
    let short = match c {
        '"' => "\\\"",
        '\\' => "\\\\",
        '\n' => "\\n",
        '\r' => "\\r",
        '\t' => "\\t",
        '\u{8}' => "\\b",
        '\u{c}' => "\\f",
        _ => return false,
    };
    out.push_str(short);
    true
}

/// Quotes a string, escaping only quotes, backslashes and control
/// characters.
///
/// # Examples
///
/// ```
/// use stdport::json::encode_basestring;
///
/// assert_eq!(encode_basestring("é\"\u{1}"), "\"é\\\"\\u0001\"");
/// ```
#[must_use]
pub fn encode_basestring(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if push_escape(&mut out, c) {
            continue;
        }
        if u32::from(c) < 0x20 {
            let _ = write!(out, "\\u{:04x}", u32::from(c));
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

/// Quotes a string, escaping everything outside printable ASCII.
///
/// Characters beyond the Basic Multilingual Plane become surrogate pairs.
///
/// # Examples
///
/// ```
/// use stdport::json::encode_basestring_ascii;
///
/// assert_eq!(encode_basestring_ascii("é😀"), "\"\\u00e9\\ud83d\\ude00\"");
/// ```
#[must_use]
pub fn encode_basestring_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut units = [0u16; 2];
    for c in s.chars() {
        if push_escape(&mut out, c) {
            continue;
        }
        if (' '..='~').contains(&c) {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out.push('"');
    out
}

/// Formats a finite float as the shortest string that reads back to the
/// same value, switching to exponent notation below `1e-4` and from `1e16`.
///
/// # Examples
///
/// ```
/// use stdport::json::float_repr;
///
/// assert_eq!(float_repr(1.0), "1.0");
/// assert_eq!(float_repr(1e16), "1e+16");
/// assert_eq!(float_repr(1e-5), "1e-05");
/// assert_eq!(float_repr(0.1), "0.1");
/// ```
#[must_use]
pub fn float_repr(f: f64) -> String {
    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..16).contains(&exp) {
        let mut plain = f.to_string();
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        plain
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

fn float_str(f: f64, allow_nan: bool) -> Result<String> {
    if f.is_finite() {
        return Ok(float_repr(f));
    }
    let (text, repr) = if f.is_nan() {
        ("NaN", "nan")
    } else if f > 0.0 {
        ("Infinity", "inf")
    } else {
        ("-Infinity", "-inf")
    };
    if !allow_nan {
        return Err(Error::value_error(format!(
            "Out of range float values are not JSON compliant: {repr}"
        )));
    }
    Ok(text.to_string())
}
