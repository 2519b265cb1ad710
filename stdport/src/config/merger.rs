//! Configuration merging and precedence handling.
//!
//! Sections are merged field by field; a field set in a higher-precedence
//! source replaces the same field from lower ones.

use crate::config::loader::ConfigSource;
use crate::config::schema::{Config, JsonConfig, PathConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use stdport::config::{Config, ConfigMerger, JsonConfig};
///
/// let low = Config {
///     json: Some(JsonConfig { sort_keys: Some(false), strict: Some(false), ..Default::default() }),
///     ..Default::default()
/// };
/// let high = Config {
///     json: Some(JsonConfig { sort_keys: Some(true), ..Default::default() }),
///     ..Default::default()
/// };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// let json = result.json.unwrap();
/// assert_eq!(json.sort_keys, Some(true));
/// assert_eq!(json.strict, Some(false));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();
        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }
        result
    }

    /// Merge source config into target (source overwrites target).
    pub fn merge_into(target: &mut Config, source: &Config) {
        if let Some(ref source_json) = source.json {
            target.json = Some(match &target.json {
                Some(target_json) => Self::merge_json(target_json, source_json),
                None => source_json.clone(),
            });
        }

        if let Some(source_path) = source.path {
            target.path = Some(match target.path {
                Some(target_path) => Self::merge_path(target_path, source_path),
                None => source_path,
            });
        }
    }

    fn merge_json(target: &JsonConfig, source: &JsonConfig) -> JsonConfig {
        JsonConfig {
            indent: source.indent.clone().or_else(|| target.indent.clone()),
            sort_keys: source.sort_keys.or(target.sort_keys),
            ensure_ascii: source.ensure_ascii.or(target.ensure_ascii),
            allow_nan: source.allow_nan.or(target.allow_nan),
            separators: source
                .separators
                .clone()
                .or_else(|| target.separators.clone()),
            strict: source.strict.or(target.strict),
            max_depth: source.max_depth.or(target.max_depth),
        }
    }

    fn merge_path(target: PathConfig, source: PathConfig) -> PathConfig {
        PathConfig {
            flavor: source.flavor.or(target.flavor),
            realpath: source.realpath.or(target.realpath),
            max_links: source.max_links.or(target.max_links),
        }
    }
}
