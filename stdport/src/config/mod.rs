//! Configuration system for stdport.
//!
//! This module provides layered configuration with support for:
//! - YAML configuration files (user config and project `stdport.yaml`)
//! - `STDPORT_*` environment variable overrides
//! - Programmatic configuration via the builder
//!
//! A [`Config`] converts into the codec's [`EncoderOptions`] and
//! [`DecoderOptions`] and into a path [`Resolver`].
//!
//! [`EncoderOptions`]: crate::json::EncoderOptions
//! [`DecoderOptions`]: crate::json::DecoderOptions
//! [`Resolver`]: crate::path::Resolver
//!
//! # Configuration Precedence
//!
//! From highest to lowest:
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`STDPORT_*`)
//! 3. Project config (nearest `stdport.yaml` walking up)
//! 4. User config (`~/.stdport/config.yaml`)
//! 5. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use stdport::config::ConfigBuilder;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir(Path::new("/path/to/project"))
//!     .build()
//!     .unwrap();
//! let encoder = stdport::json::Encoder::with_options(config.encoder_options());
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{Config, JsonConfig, PathConfig};
pub use validator::ConfigValidator;
