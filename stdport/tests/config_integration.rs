//! Integration tests for the configuration system.
//!
//! These tests exercise discovery, merging, environment overrides and
//! validation together, and check that the resulting configuration drives
//! the codec and the resolver.
//!
//! Tests that modify environment variables are marked `#[serial]`.

use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use stdport::config::{Config, ConfigBuilder, JsonConfig};
use stdport::error::Error;
use stdport::json::{Decoder, Encoder, Indent, Value};
use stdport::path::{Flavor, RealpathMode};
use tempfile::TempDir;

fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// RAII guard for setting and restoring environment variables.
struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

impl EnvGuard {
    fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}

fn clear_stdport_env_vars() -> Vec<EnvGuard> {
    [
        "STDPORT_JSON_INDENT",
        "STDPORT_JSON_SORT_KEYS",
        "STDPORT_JSON_ENSURE_ASCII",
        "STDPORT_JSON_ALLOW_NAN",
        "STDPORT_JSON_STRICT",
        "STDPORT_JSON_MAX_DEPTH",
        "STDPORT_PATH_FLAVOR",
        "STDPORT_REALPATH_MODE",
        "STDPORT_MAX_LINKS",
    ]
    .iter()
    .map(|k| EnvGuard::remove(k))
    .collect()
}

/// Builder over a temp project and an empty user directory.
fn builder(project: &Path, user: &Path) -> ConfigBuilder {
    ConfigBuilder::new()
        .with_working_dir(project)
        .with_config_dir(user)
}

#[test]
fn test_discovery_from_nested_directory() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let child = project.path().join("src").join("deep");
    fs::create_dir_all(&child).unwrap();
    create_temp_config(project.path(), "stdport.yaml", "json:\n  sort_keys: true\n");

    let config = builder(&child, user.path()).skip_env().build().unwrap();
    assert_eq!(config.json.unwrap().sort_keys, Some(true));
}

#[test]
fn test_project_overrides_user_field_by_field() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    create_temp_config(
        user.path(),
        "config.yaml",
        "json:\n  indent: 2\n  ensure_ascii: false\npath:\n  realpath: strict\n",
    );
    create_temp_config(project.path(), "stdport.yaml", "json:\n  indent: \"\\t\"\n");

    let config = builder(project.path(), user.path()).skip_env().build().unwrap();
    let json = config.json.clone().unwrap();
    assert_eq!(json.indent, Some(Indent::Text("\t".into())));
    assert_eq!(json.ensure_ascii, Some(false));
    assert_eq!(config.resolver().mode(), RealpathMode::Strict);
}

#[test]
#[serial]
fn test_environment_overrides_files() {
    let _clear = clear_stdport_env_vars();
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    create_temp_config(
        project.path(),
        "stdport.yaml",
        "path:\n  flavor: posix\n  max_links: 4\n",
    );
    let _flavor = EnvGuard::new("STDPORT_PATH_FLAVOR", "windows");

    let config = builder(project.path(), user.path()).build().unwrap();
    let resolver = config.resolver();
    assert_eq!(resolver.flavor(), Flavor::Windows);
    assert_eq!(resolver.max_links(), Some(4));
}

#[test]
#[serial]
fn test_programmatic_override_beats_environment() {
    let _clear = clear_stdport_env_vars();
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let _indent = EnvGuard::new("STDPORT_JSON_INDENT", "8");

    let config = builder(project.path(), user.path())
        .with_config(Config {
            json: Some(JsonConfig {
                indent: Some(Indent::Spaces(1)),
                ..Default::default()
            }),
            ..Default::default()
        })
        .build()
        .unwrap();
    assert_eq!(config.json.unwrap().indent, Some(Indent::Spaces(1)));
}

#[test]
#[serial]
fn test_invalid_environment_value() {
    let _clear = clear_stdport_env_vars();
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let _mode = EnvGuard::new("STDPORT_REALPATH_MODE", "whatever");

    let result = builder(project.path(), user.path()).build();
    match result {
        Err(Error::Validation { field, .. }) => assert_eq!(field, "STDPORT_REALPATH_MODE"),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_negative_indent_from_environment() {
    let _clear = clear_stdport_env_vars();
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let _indent = EnvGuard::new("STDPORT_JSON_INDENT", "-4");

    assert!(matches!(
        builder(project.path(), user.path()).build(),
        Err(Error::Validation { .. })
    ));
}

#[test]
fn test_overlarge_indent_in_file() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    create_temp_config(project.path(), "stdport.yaml", "json:\n  indent: 500\n");

    let result = builder(project.path(), user.path()).skip_env().build();
    assert!(matches!(result, Err(Error::Validation { ref field, .. }) if field == "json.indent"));
}

#[test]
fn test_negative_indent_in_file_is_a_parse_error() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    create_temp_config(project.path(), "stdport.yaml", "json:\n  indent: -1\n");

    let result = builder(project.path(), user.path()).skip_env().build();
    assert!(result.is_err());
}

#[test]
fn test_config_drives_encoder_and_decoder() {
    let project = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    create_temp_config(
        project.path(),
        "stdport.yaml",
        "json:\n  indent: 2\n  sort_keys: true\n  strict: false\n  max_depth: 3\n",
    );
    let config = builder(project.path(), user.path()).skip_env().build().unwrap();

    let decoder = Decoder::with_options(config.decoder_options());
    let value = decoder.decode("{\"b\": \"tab\tinside\", \"a\": [1]}").unwrap();
    assert_eq!(value.get("b"), Some(&Value::from("tab\tinside")));
    assert!(decoder.decode("[[[[1]]]]").is_err());

    let encoder = Encoder::with_options(config.encoder_options());
    assert_eq!(
        encoder.encode(&value).unwrap(),
        "{\n  \"a\": [\n    1\n  ],\n  \"b\": \"tab\\tinside\"\n}"
    );
}
