//! Property-based tests for the JSON codec.

use super::{dumps, loads, scanstring, Encoder, Key, Object, Value};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<i128>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        any::<String>().prop_map(Value::Str),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{0,6}", inner), 0..6).prop_map(|pairs| {
                Value::Object(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (Key::Str(k), v))
                        .collect::<Object>(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn dumps_then_loads_is_identity(v in value()) {
        let text = dumps(&v).unwrap();
        prop_assert_eq!(loads(&text).unwrap(), v);
    }

    #[test]
    fn pretty_output_decodes_to_the_same_value(v in value(), indent in 0usize..4) {
        let encoder = Encoder::new().with_indent(indent).with_sort_keys(true);
        let text = encoder.encode(&v).unwrap();
        prop_assert_eq!(loads(&text).unwrap(), v);
    }

    #[test]
    fn ascii_output_is_ascii(s in any::<String>()) {
        let text = dumps(&Value::Str(s.clone())).unwrap();
        prop_assert!(text.is_ascii());
        let (decoded, end) = scanstring(&text, 1, true).unwrap();
        prop_assert_eq!(decoded, s);
        prop_assert_eq!(end, text.chars().count());
    }

    #[test]
    fn raw_output_round_trips(s in any::<String>()) {
        let text = Encoder::new().with_ensure_ascii(false).encode(&Value::Str(s.clone())).unwrap();
        prop_assert_eq!(loads(&text).unwrap(), Value::Str(s));
    }

    #[test]
    fn iterencode_concatenates_to_encode(v in value()) {
        let encoder = Encoder::new().with_indent(2);
        let chunks: String = encoder
            .iterencode(&v)
            .collect::<crate::Result<Vec<_>>>()
            .unwrap()
            .concat();
        prop_assert_eq!(chunks, encoder.encode(&v).unwrap());
    }

    #[test]
    fn garbage_never_panics(s in "\\PC{0,40}") {
        let _ = loads(&s);
    }
}
