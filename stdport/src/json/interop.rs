//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! Useful at the edges of a program that otherwise uses serde: the codec in
//! this module tree keeps the exact decoding and encoding rules, serde_json
//! handles typed (de)serialization.

use super::decoder::DEFAULT_MAX_DEPTH;
use super::value::{Key, Object, Value};
use crate::error::{Error, Result};

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::from))
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (Key::Str(k), Self::from(v)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = Error;

    /// Converts a value into serde_json's model.
    ///
    /// Non-finite floats, integers beyond `u64`, custom values, unsupported
    /// keys and cyclic shared cells are rejected.
    fn try_from(value: &Value) -> Result<Self> {
        to_serde(value, &mut Vec::new())
    }
}

fn key_string(key: &Key) -> Result<String> {
    Ok(match key {
        Key::Str(s) => s.clone(),
        Key::Int(i) => i.to_string(),
        Key::Float(f) => super::encoder::float_repr(*f),
        Key::Bool(b) => b.to_string(),
        Key::Null => "null".to_string(),
        Key::Other(type_name) => {
            return Err(Error::type_error(format!(
                "keys must be str, int, float, bool or None, not {type_name}"
            )))
        }
    })
}

fn nested(value: &Value, id: Option<usize>, open: &mut Vec<Option<usize>>) -> Result<serde_json::Value> {
    open.push(id);
    let result = to_serde(value, open);
    open.pop();
    result
}

fn to_serde(value: &Value, open: &mut Vec<Option<usize>>) -> Result<serde_json::Value> {
    if open.len() > DEFAULT_MAX_DEPTH {
        return Err(Error::Recursion {
            limit: DEFAULT_MAX_DEPTH,
        });
    }
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::BigInt(digits) => digits
            .parse::<u64>()
            .map(serde_json::Value::from)
            .map_err(|_| Error::value_error(format!("Integer out of range for serde_json: {digits}")))?,
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                Error::value_error(format!(
                    "Out of range float values are not JSON compliant: {f}"
                ))
            })?,
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| nested(item, None, open))
                .collect::<Result<_>>()?,
        ),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| Ok((key_string(k)?, nested(v, None, open)?)))
                .collect::<Result<_>>()?,
        ),
        Value::Shared(cell) => {
            if open.contains(&Some(cell.id())) {
                return Err(Error::CircularReference);
            }
            nested(&cell.get(), Some(cell.id()), open)?
        }
        Value::Custom(custom) => {
            return Err(Error::type_error(format!(
                "Object of type {} is not JSON serializable",
                custom.type_name()
            )))
        }
    })
}
