//! Environment variable handling for configuration overrides.
//!
//! `STDPORT_*` variables override values loaded from configuration files.
//!
//! | Variable | Field |
//! |---|---|
//! | `STDPORT_JSON_INDENT` | `json.indent` (a width, `tab`, or literal text) |
//! | `STDPORT_JSON_SORT_KEYS` | `json.sort_keys` |
//! | `STDPORT_JSON_ENSURE_ASCII` | `json.ensure_ascii` |
//! | `STDPORT_JSON_ALLOW_NAN` | `json.allow_nan` |
//! | `STDPORT_JSON_STRICT` | `json.strict` |
//! | `STDPORT_JSON_MAX_DEPTH` | `json.max_depth` |
//! | `STDPORT_PATH_FLAVOR` | `path.flavor` |
//! | `STDPORT_REALPATH_MODE` | `path.realpath` |
//! | `STDPORT_MAX_LINKS` | `path.max_links` |

use clap::ValueEnum;

use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::json::Indent;
use std::env;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use stdport::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the variable if any value is
    /// malformed.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        Self::apply_json_overrides(config)?;
        Self::apply_path_overrides(config)
    }

    fn apply_json_overrides(config: &mut Config) -> Result<()> {
        let mut json = config.json.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(val) = env::var("STDPORT_JSON_INDENT") {
            json.indent = Some(Self::parse_indent("STDPORT_JSON_INDENT", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_JSON_SORT_KEYS") {
            json.sort_keys = Some(Self::parse_bool("STDPORT_JSON_SORT_KEYS", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_JSON_ENSURE_ASCII") {
            json.ensure_ascii = Some(Self::parse_bool("STDPORT_JSON_ENSURE_ASCII", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_JSON_ALLOW_NAN") {
            json.allow_nan = Some(Self::parse_bool("STDPORT_JSON_ALLOW_NAN", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_JSON_STRICT") {
            json.strict = Some(Self::parse_bool("STDPORT_JSON_STRICT", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_JSON_MAX_DEPTH") {
            json.max_depth = Some(Self::parse_count("STDPORT_JSON_MAX_DEPTH", &val)?);
            modified = true;
        }

        if modified {
            config.json = Some(json);
        }
        Ok(())
    }

    fn apply_path_overrides(config: &mut Config) -> Result<()> {
        let mut path = config.path.unwrap_or_default();
        let mut modified = false;

        if let Ok(val) = env::var("STDPORT_PATH_FLAVOR") {
            path.flavor = Some(Self::parse_enum("STDPORT_PATH_FLAVOR", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_REALPATH_MODE") {
            path.realpath = Some(Self::parse_enum("STDPORT_REALPATH_MODE", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("STDPORT_MAX_LINKS") {
            path.max_links = Some(Self::parse_count("STDPORT_MAX_LINKS", &val)?);
            modified = true;
        }

        if modified {
            config.path = Some(path);
        }
        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_count(field: &str, s: &str) -> Result<usize> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }

    /// Parse an indent: an integer width, `tab`, or literal indent text.
    fn parse_indent(field: &str, s: &str) -> Result<Indent> {
        if let Ok(width) = s.trim().parse::<i64>() {
            return usize::try_from(width)
                .map(Indent::Spaces)
                .map_err(|_| Error::Validation {
                    field: field.into(),
                    message: format!("Indent cannot be negative, got {width}"),
                });
        }
        if s.eq_ignore_ascii_case("tab") {
            return Ok(Indent::Text("\t".to_string()));
        }
        Ok(Indent::Text(s.to_string()))
    }

    fn parse_enum<T: ValueEnum>(field: &str, s: &str) -> Result<T> {
        <T as ValueEnum>::from_str(s.trim(), true).map_err(|_| {
            let expected: Vec<String> = T::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value())
                .map(|v| v.get_name().to_string())
                .collect();
            Error::Validation {
                field: field.into(),
                message: format!("Unknown value '{s}' (expected one of: {})", expected.join(", ")),
            }
        })
    }
}
