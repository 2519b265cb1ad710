//! The JSON value model shared by the decoder and the encoder.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A JSON value.
///
/// Decoding produces only the first eight variants. [`Value::Shared`] and
/// [`Value::Custom`] exist for the encoder: the former lets callers build
/// aliased or cyclic graphs, the latter carries foreign values to the
/// `default` hook.
///
/// # Examples
///
/// ```
/// use stdport::json::{Object, Value};
///
/// let mut obj = Object::new();
/// obj.insert("name", "stdport");
/// obj.insert("tags", vec![Value::from(1), Value::from(2.5)]);
///
/// let value = Value::from(obj);
/// assert_eq!(value.get("name").and_then(Value::as_str), Some("stdport"));
/// assert_eq!(value.type_name(), "dict");
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// `null`.
    #[default]
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// An integer that fits in 64 bits.
    Int(i64),
    /// An integer outside the `i64` range, held as its decimal digits with
    /// an optional leading `-`. The encoder writes the text verbatim and
    /// rejects anything that is not such a literal.
    BigInt(String),
    /// A double, including the non-finite values.
    Float(f64),
    /// A string.
    Str(String),
    /// An array.
    Array(Vec<Value>),
    /// An object with insertion-ordered keys.
    Object(Object),
    /// A reference-counted mutable cell.
    Shared(SharedValue),
    /// A value only the `default` hook knows how to encode.
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    /// Wraps a value in a new shared cell.
    #[must_use]
    pub fn shared(value: impl Into<Value>) -> Self {
        Self::Shared(SharedValue::new(value))
    }

    /// Wraps a foreign value.
    #[must_use]
    pub fn custom(value: impl CustomValue + 'static) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Returns the name of the type this value stands for, spelled the way
    /// error messages report it.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "NoneType".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) | Self::BigInt(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "str".to_string(),
            Self::Array(_) => "list".to_string(),
            Self::Object(_) => "dict".to_string(),
            Self::Shared(cell) => cell.lock().type_name(),
            Self::Custom(custom) => custom.type_name().to_string(),
        }
    }

    /// Returns `true` for `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float; integers are converted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::BigInt(digits) => digits.parse().ok(),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object, if this is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Looks up a string key, if this is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

/// Structural equality.
///
/// Floats compare by IEEE rules, so `NaN` is unequal to itself. Objects
/// compare as maps, ignoring order. Shared cells and custom values compare
/// by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Shared(a), Self::Shared(b)) => a.id() == b.id(),
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or_else(|_| Self::BigInt(i.to_string()), Self::Int)
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        i64::try_from(i).map_or_else(|_| Self::BigInt(i.to_string()), Self::Int)
    }
}

impl From<u128> for Value {
    fn from(i: u128) -> Self {
        i64::try_from(i).map_or_else(|_| Self::BigInt(i.to_string()), Self::Int)
    }
}

/// Whether `text` is a JSON integer literal: `-?(0|[1-9][0-9]*)`.
pub(crate) fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Self::Object(obj)
    }
}

impl From<SharedValue> for Value {
    fn from(cell: SharedValue) -> Self {
        Self::Shared(cell)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An object key.
///
/// Decoded objects only ever have `Str` keys. The other variants exist so the
/// encoder can apply its coercion rules: numbers, booleans and `Null` are
/// spelled as their JSON literals, `Other` is skipped or rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// A string key.
    Str(String),
    /// An integer key.
    Int(i64),
    /// A float key.
    Float(f64),
    /// A boolean key.
    Bool(bool),
    /// A null key.
    Null,
    /// A key of some other type, identified by its type name.
    Other(String),
}

impl Key {
    /// Returns the key if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An insertion-ordered map from [`Key`] to [`Value`].
///
/// Inserting an existing key replaces its value in place, keeping the
/// original position.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: Vec<(Key, Value)>,
}

impl Object {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Looks up a string key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Looks up any key.
    #[must_use]
    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Key, Value)> {
        self.entries.iter()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub(crate) fn as_slice(&self) -> &[(Key, Value)] {
        &self.entries
    }

    pub(crate) fn into_vec(self) -> Vec<(Key, Value)> {
        self.entries
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get_key(k) == Some(v))
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut obj = Self::new();
        for (k, v) in iter {
            obj.insert(k, v);
        }
        obj
    }
}

impl IntoIterator for Object {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = &'a (Key, Value);
    type IntoIter = std::slice::Iter<'a, (Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A shared, mutable value cell.
///
/// Clones share the same cell. A cell may end up containing itself, directly
/// or through other cells; the encoder detects such cycles.
///
/// # Examples
///
/// ```
/// use stdport::json::{SharedValue, Value};
///
/// let cell = SharedValue::new(Vec::<Value>::new());
/// let alias = cell.clone();
/// alias.set(vec![Value::from(1)]);
/// assert_eq!(cell.get().as_array().map(<[Value]>::len), Some(1));
/// ```
#[derive(Clone)]
pub struct SharedValue(Arc<Mutex<Value>>);

impl SharedValue {
    /// Creates a cell holding `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(Mutex::new(value.into())))
    }

    /// Locks the cell for reading or in-place mutation.
    pub fn lock(&self) -> MutexGuard<'_, Value> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current contents.
    #[must_use]
    pub fn get(&self) -> Value {
        self.lock().clone()
    }

    /// Replaces the contents.
    pub fn set(&self, value: impl Into<Value>) {
        *self.lock() = value.into();
    }

    /// Returns an identity shared by all clones of this cell.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.id())
    }
}

/// A foreign value carried through a [`Value`] tree to the encoder's
/// `default` hook.
pub trait CustomValue: fmt::Debug + Send + Sync {
    /// The type name reported when the value cannot be encoded.
    fn type_name(&self) -> &str;

    /// Allows the hook to downcast to the concrete type.
    fn as_any(&self) -> &dyn Any;
}
