#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # stdport
//!
//! Path manipulation and JSON processing with the semantics of the newest
//! Python standard library, for programs that need to agree with it byte for
//! byte.
//!
//! ## Core Types
//!
//! - [`path`]: POSIX and Windows path grammars, plus [`Resolver`] for the
//!   operations that consult the filesystem or environment
//! - [`json`]: a scanner-based decoder with hooks and a streaming encoder
//! - [`Config`] and [`ConfigBuilder`]: layered YAML configuration
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use stdport::path::{posix, PathValue};
//! use stdport::json;
//!
//! assert_eq!(posix::normpath("a//b/../c/."), PathValue::from("a/c"));
//!
//! let value = json::loads(r#"[1, "two", {"three": 3.0}]"#).unwrap();
//! assert_eq!(json::dumps(&value).unwrap(), r#"[1, "two", {"three": 3.0}]"#);
//! ```

pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod path;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use json::{dumps, loads, Decoder, Encoder, Value};
pub use logging::{init_logger, LogLevel, Logger};
pub use path::{Flavor, PathKind, PathValue, RealpathMode, Resolver};
