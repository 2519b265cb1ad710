//! CLI command implementations.
//!
//! - `path`: run a path grammar operation
//! - `json`: validate and pretty-print JSON

pub mod json;
pub mod path;

pub use json::JsonCommand;
pub use path::{PathCommand, PathOp};
