//! Configuration schema definitions.
//!
//! This module defines the configuration structure for stdport: encoder and
//! decoder defaults for the JSON codec, and resolver defaults for the path
//! engine.

use serde::{Deserialize, Serialize};

use crate::json::{DecoderOptions, EncoderOptions, Indent};
use crate::path::{Flavor, RealpathMode, Resolver};

/// Complete configuration structure.
///
/// Every field is optional so that sources can be layered; unset fields
/// fall back to the library defaults when converted.
///
/// # Examples
///
/// ```
/// use stdport::config::{Config, JsonConfig};
///
/// let config = Config {
///     json: Some(JsonConfig {
///         sort_keys: Some(true),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// assert!(config.encoder_options().sort_keys);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON codec settings.
    pub json: Option<JsonConfig>,

    /// Path engine settings.
    pub path: Option<PathConfig>,
}

/// JSON codec settings.
///
/// ```yaml
/// json:
///   indent: 2
///   sort_keys: true
///   separators: [",", ": "]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct JsonConfig {
    /// Pretty-print indentation: a width or a literal string.
    pub indent: Option<Indent>,

    /// Sort object entries by key.
    pub sort_keys: Option<bool>,

    /// Escape non-ASCII characters.
    pub ensure_ascii: Option<bool>,

    /// Accept and emit `NaN`/`Infinity`.
    pub allow_nan: Option<bool>,

    /// Item and key separators.
    pub separators: Option<(String, String)>,

    /// Reject raw control characters inside strings.
    pub strict: Option<bool>,

    /// Maximum container nesting for both directions.
    pub max_depth: Option<usize>,
}

/// Path engine settings.
///
/// ```yaml
/// path:
///   flavor: posix
///   realpath: allow-missing
///   max_links: 40
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    /// Path grammar to use.
    pub flavor: Option<Flavor>,

    /// How `realpath` treats filesystem errors.
    pub realpath: Option<RealpathMode>,

    /// Cap on symlink expansions per `realpath` call.
    pub max_links: Option<usize>,
}

impl Config {
    /// Encoder options with this configuration applied over the defaults.
    #[must_use]
    pub fn encoder_options(&self) -> EncoderOptions {
        let mut options = EncoderOptions::default();
        let Some(json) = &self.json else {
            return options;
        };
        if let Some(indent) = &json.indent {
            options.indent = Some(indent.clone());
        }
        if let Some(sort_keys) = json.sort_keys {
            options.sort_keys = sort_keys;
        }
        if let Some(ensure_ascii) = json.ensure_ascii {
            options.ensure_ascii = ensure_ascii;
        }
        if let Some(allow_nan) = json.allow_nan {
            options.allow_nan = allow_nan;
        }
        if let Some(separators) = &json.separators {
            options.separators = Some(separators.clone());
        }
        if let Some(max_depth) = json.max_depth {
            options.max_depth = max_depth;
        }
        options
    }

    /// Decoder options with this configuration applied over the defaults.
    ///
    /// `allow_nan: false` is not enforced by the decoder itself; front ends
    /// install a `parse_constant` hook for that.
    #[must_use]
    pub fn decoder_options(&self) -> DecoderOptions {
        let mut options = DecoderOptions::default();
        if let Some(json) = &self.json {
            if let Some(strict) = json.strict {
                options.strict = strict;
            }
            if let Some(max_depth) = json.max_depth {
                options.max_depth = max_depth;
            }
        }
        options
    }

    /// A resolver over the real filesystem with this configuration applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use stdport::config::{Config, PathConfig};
    /// use stdport::path::{Flavor, RealpathMode};
    ///
    /// let config = Config {
    ///     path: Some(PathConfig {
    ///         flavor: Some(Flavor::Windows),
    ///         realpath: Some(RealpathMode::Strict),
    ///         max_links: None,
    ///     }),
    ///     ..Default::default()
    /// };
    /// let resolver = config.resolver();
    /// assert_eq!(resolver.flavor(), Flavor::Windows);
    /// assert_eq!(resolver.mode(), RealpathMode::Strict);
    /// ```
    #[must_use]
    pub fn resolver(&self) -> Resolver {
        let mut resolver = Resolver::new();
        if let Some(path) = &self.path {
            if let Some(flavor) = path.flavor {
                resolver = resolver.with_flavor(flavor);
            }
            if let Some(mode) = path.realpath {
                resolver = resolver.with_mode(mode);
            }
            if let Some(max_links) = path.max_links {
                resolver = resolver.with_max_links(max_links);
            }
        }
        resolver
    }
}
