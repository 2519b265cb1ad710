//! Configuration validation.
//!
//! Type-level problems (unknown fields, unknown realpath modes, negative
//! numbers in YAML) are rejected while parsing; this module checks the
//! ranges serde cannot express.

use crate::config::schema::{Config, JsonConfig, PathConfig};
use crate::error::{Error, Result};
use crate::json::Indent;

/// Widest accepted indent, in characters per level.
pub const MAX_INDENT: usize = 64;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use stdport::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref json) = config.json {
            Self::validate_json(json)?;
        }
        if let Some(ref path) = config.path {
            Self::validate_path(path)?;
        }
        Ok(())
    }

    fn validate_json(json: &JsonConfig) -> Result<()> {
        if let Some(ref indent) = json.indent {
            Self::validate_indent(indent)?;
        }

        if let Some((item, key)) = &json.separators {
            if key.trim().is_empty() && item.trim().is_empty() {
                return Err(Error::Validation {
                    field: "json.separators".into(),
                    message: "Separators cannot both be blank".into(),
                });
            }
        }

        if json.max_depth == Some(0) {
            return Err(Error::Validation {
                field: "json.max_depth".into(),
                message: "max_depth must be > 0".into(),
            });
        }

        Ok(())
    }

    /// Indents wider than [`MAX_INDENT`] are rejected; so is indent text
    /// containing anything but whitespace.
    fn validate_indent(indent: &Indent) -> Result<()> {
        let width = match indent {
            Indent::Spaces(n) => *n,
            Indent::Text(text) => {
                if !text.chars().all(char::is_whitespace) {
                    return Err(Error::Validation {
                        field: "json.indent".into(),
                        message: format!("Indent text must be whitespace, got {text:?}"),
                    });
                }
                text.chars().count()
            }
        };
        if width > MAX_INDENT {
            return Err(Error::Validation {
                field: "json.indent".into(),
                message: format!("Indent cannot exceed {MAX_INDENT} characters, got {width}"),
            });
        }
        Ok(())
    }

    fn validate_path(path: &PathConfig) -> Result<()> {
        if path.max_links == Some(0) {
            return Err(Error::Validation {
                field: "path.max_links".into(),
                message: "max_links must be > 0".into(),
            });
        }
        Ok(())
    }
}
