//! Property-based tests for configuration merging and validation.

use super::merger::ConfigMerger;
use super::schema::{Config, JsonConfig, PathConfig};
use super::validator::{ConfigValidator, MAX_INDENT};
use crate::json::Indent;
use crate::path::{Flavor, RealpathMode};
use proptest::prelude::*;

fn indent_strategy() -> impl Strategy<Value = Indent> {
    prop_oneof![
        (0usize..=MAX_INDENT * 2).prop_map(Indent::Spaces),
        "[ \t]{0,8}".prop_map(Indent::Text),
    ]
}

fn json_strategy() -> impl Strategy<Value = JsonConfig> {
    (
        prop::option::of(indent_strategy()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(1usize..5000),
    )
        .prop_map(
            |(indent, sort_keys, ensure_ascii, allow_nan, strict, max_depth)| JsonConfig {
                indent,
                sort_keys,
                ensure_ascii,
                allow_nan,
                separators: None,
                strict,
                max_depth,
            },
        )
}

fn path_strategy() -> impl Strategy<Value = PathConfig> {
    (
        prop::option::of(prop_oneof![Just(Flavor::Posix), Just(Flavor::Windows)]),
        prop::option::of(prop_oneof![
            Just(RealpathMode::Lenient),
            Just(RealpathMode::Strict),
            Just(RealpathMode::AllowMissing),
        ]),
        prop::option::of(1usize..100),
    )
        .prop_map(|(flavor, realpath, max_links)| PathConfig {
            flavor,
            realpath,
            max_links,
        })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (prop::option::of(json_strategy()), prop::option::of(path_strategy()))
        .prop_map(|(json, path)| Config { json, path })
}

proptest! {
    #[test]
    fn merge_set_fields_of_higher_source_win(low in config_strategy(), high in config_strategy()) {
        let mut merged = low.clone();
        ConfigMerger::merge_into(&mut merged, &high);

        if let Some(high_json) = &high.json {
            let json = merged.json.clone().unwrap();
            if high_json.sort_keys.is_some() {
                prop_assert_eq!(json.sort_keys, high_json.sort_keys);
            }
            if high_json.indent.is_some() {
                prop_assert_eq!(&json.indent, &high_json.indent);
            }
        } else {
            prop_assert_eq!(&merged.json, &low.json);
        }

        if let Some(high_path) = high.path {
            let path = merged.path.unwrap();
            if high_path.realpath.is_some() {
                prop_assert_eq!(path.realpath, high_path.realpath);
            }
        } else {
            prop_assert_eq!(merged.path, low.path);
        }
    }

    #[test]
    fn merge_with_empty_is_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &Config::default());
        prop_assert_eq!(&merged, &config);

        let mut from_empty = Config::default();
        ConfigMerger::merge_into(&mut from_empty, &config);
        prop_assert_eq!(from_empty, config);
    }

    #[test]
    fn yaml_round_trip(config in config_strategy()) {
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(parsed, config);
    }

    #[test]
    fn validation_matches_indent_width(indent in indent_strategy()) {
        let width = match &indent {
            Indent::Spaces(n) => *n,
            Indent::Text(t) => t.chars().count(),
        };
        let config = Config {
            json: Some(JsonConfig { indent: Some(indent), ..Default::default() }),
            ..Default::default()
        };
        prop_assert_eq!(ConfigValidator::validate(&config).is_ok(), width <= MAX_INDENT);
    }
}
