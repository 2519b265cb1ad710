//! Library exports for stdport-cli.
//!
//! This module exports the CLI structure for use by the binary and by
//! the build script that generates man pages.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
