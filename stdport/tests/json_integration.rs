//! End-to-end tests for the JSON codec through the public API.

use std::sync::Arc;

use stdport::json::{
    dump, dumps, load, loads, loads_bytes, CustomValue, Decoder, Encoder, Key, Object,
    SharedValue, Value,
};
use stdport::Error;
use tempfile::NamedTempFile;

#[derive(Debug)]
struct Point {
    x: i64,
    y: i64,
}

impl CustomValue for Point {
    fn type_name(&self) -> &str {
        "Point"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn decode_message(doc: &str) -> String {
    match loads(doc) {
        Err(Error::Decode(e)) => e.to_string(),
        other => panic!("expected a decode error for {doc:?}, got {other:?}"),
    }
}

#[test]
fn test_round_trip_preserves_value() {
    let doc = r#"{"name": "café", "list": [1, 2.0, -3e-7, true, null], "nested": {"empty": {}}}"#;
    let value = loads(doc).unwrap();
    assert_eq!(loads(&dumps(&value).unwrap()).unwrap(), value);
    assert_eq!(value.get("name"), Some(&Value::from("café")));
}

#[test]
fn test_number_classification() {
    assert_eq!(loads("1.5e3").unwrap(), Value::Float(1500.0));
    assert_eq!(loads("42").unwrap(), Value::Int(42));
    assert_eq!(loads("-0").unwrap(), Value::Int(0));
    let nan = loads("NaN").unwrap();
    assert_ne!(nan, nan);
}

#[test]
fn test_integers_beyond_64_bits_round_trip() {
    let above = "18446744073709551616";
    let below = "-9223372036854775809";

    let value = loads(&format!("[{above}, {below}, 18446744073709551615]")).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![
            Value::BigInt(above.into()),
            Value::BigInt(below.into()),
            Value::from(u64::MAX),
        ])
    );
    assert_eq!(
        dumps(&value).unwrap(),
        format!("[{above}, {below}, 18446744073709551615]")
    );

    assert!(matches!(loads("9223372036854775808").unwrap(), Value::BigInt(_)));
    assert_eq!(loads("-9223372036854775808").unwrap(), Value::Int(i64::MIN));
}

#[test]
fn test_parse_int_hook_sees_wide_literals() {
    let decoder = Decoder::new().with_parse_int(Arc::new(|text: &str| -> stdport::Result<Value> {
        Ok(Value::from(i64::try_from(text.len()).unwrap()))
    }));
    assert_eq!(decoder.decode("123456789012345678901234567890").unwrap(), Value::Int(30));
}

#[test]
fn test_error_messages_carry_positions() {
    assert_eq!(
        decode_message("{\"a\": 1,}"),
        "Illegal trailing comma before end of object: line 1 column 8 (char 7)"
    );
    assert_eq!(
        decode_message("[1, 2,]"),
        "Illegal trailing comma before end of array: line 1 column 6 (char 5)"
    );
    assert_eq!(
        decode_message("[\n  1\n  2]"),
        "Expecting ',' delimiter: line 3 column 3 (char 8)"
    );
    assert_eq!(decode_message(""), "Expecting value: line 1 column 1 (char 0)");
    assert_eq!(decode_message("[] x"), "Extra data: line 1 column 4 (char 3)");
}

#[test]
fn test_object_pairs_hook_sees_duplicates() {
    let decoder = Decoder::new().with_object_pairs_hook(Arc::new(
        |pairs: Vec<(String, Value)>| -> stdport::Result<Value> {
            Ok(Value::Array(
                pairs.into_iter().map(|(k, _)| Value::Str(k)).collect(),
            ))
        },
    ));
    let value = decoder.decode(r#"{"k": 1, "k": 2}"#).unwrap();
    assert_eq!(value, Value::Array(vec![Value::from("k"), Value::from("k")]));

    // Without a hook the last duplicate wins.
    assert_eq!(loads(r#"{"k": 1, "k": 2}"#).unwrap().get("k"), Some(&Value::Int(2)));
}

#[test]
fn test_custom_values_need_a_default_hook() {
    let value = Value::Array(vec![Value::custom(Point { x: 1, y: 2 })]);
    match dumps(&value) {
        Err(Error::Type { message }) => {
            assert_eq!(message, "Object of type Point is not JSON serializable");
        }
        other => panic!("expected a type error, got {other:?}"),
    }

    let encoder = Encoder::new().with_default(Arc::new(
        |custom: &dyn CustomValue| -> stdport::Result<Value> {
        let point = custom
            .as_any()
            .downcast_ref::<Point>()
            .ok_or_else(|| Error::Type {
                message: "not a point".into(),
            })?;
        Ok(Value::Array(vec![Value::Int(point.x), Value::Int(point.y)]))
        },
    ));
    assert_eq!(encoder.encode(&value).unwrap(), "[[1, 2]]");
}

#[test]
fn test_shared_cells_encode_and_detect_cycles() {
    let shared = SharedValue::new(Value::Array(vec![Value::Int(7)]));
    let twice = Value::Array(vec![Value::Shared(shared.clone()), Value::Shared(shared.clone())]);
    assert_eq!(dumps(&twice).unwrap(), "[[7], [7]]");

    let obj: Object = [("self", Value::Null)].into_iter().collect();
    let cell = SharedValue::new(Value::Object(obj));
    let mut inner = Object::default();
    inner.insert("self", Value::Shared(cell.clone()));
    cell.set(Value::Object(inner));
    assert!(matches!(
        dumps(&Value::Shared(cell.clone())),
        Err(Error::CircularReference)
    ));
    // Break the cycle so the cell can be freed.
    cell.set(Value::Null);
}

#[test]
fn test_non_string_keys_are_coerced() {
    let obj: Object = [
        (Key::Int(2), Value::Null),
        (Key::Bool(true), Value::Null),
        (Key::Float(1.5), Value::Null),
        (Key::Null, Value::Null),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        Encoder::new()
            .with_sort_keys(true)
            .encode(&Value::Object(obj))
            .unwrap(),
        r#"{"1.5": null, "2": null, "null": null, "true": null}"#
    );
}

#[test]
fn test_allow_nan_false_rejects_non_finite() {
    let encoder = Encoder::new().with_allow_nan(false);
    match encoder.encode(&Value::Float(f64::INFINITY)) {
        Err(Error::Value { message }) => {
            assert_eq!(message, "Out of range float values are not JSON compliant: inf");
        }
        other => panic!("expected a value error, got {other:?}"),
    }
    assert_eq!(dumps(&Value::Float(f64::NEG_INFINITY)).unwrap(), "-Infinity");
}

#[test]
fn test_file_round_trip_through_load_and_dump() {
    let value = loads(r#"{"path": "/tmp/☃", "n": [1, 2, 3]}"#).unwrap();
    let file = NamedTempFile::new().unwrap();
    dump(&value, file.reopen().unwrap()).unwrap();

    let reread = load(file.reopen().unwrap()).unwrap();
    assert_eq!(reread, value);
    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.contains("\\u2603"));
}

#[test]
fn test_utf16_and_utf32_documents() {
    let utf16be: Vec<u8> = "{\"a\": \"\u{1d11e}\"}"
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect();
    let value = loads_bytes(&utf16be).unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("\u{1d11e}")));

    let utf32le: Vec<u8> = "[null]"
        .chars()
        .flat_map(|c| u32::from(c).to_le_bytes())
        .collect();
    assert_eq!(loads_bytes(&utf32le).unwrap(), Value::Array(vec![Value::Null]));
}

#[test]
fn test_serde_json_interop() {
    let value = loads(r#"{"k": [1, 2.5, "s"]}"#).unwrap();
    let converted = serde_json::Value::try_from(&value).unwrap();
    assert_eq!(converted, serde_json::json!({"k": [1, 2.5, "s"]}));
    assert_eq!(Value::from(converted), value);
}
