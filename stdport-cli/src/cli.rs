//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{JsonCommand, PathCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Path and JSON tools with standard-library semantics.
#[derive(Parser)]
#[command(name = "stdport")]
#[command(
    version,
    about = "Path grammar and JSON tools with standard-library semantics",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Directory holding the user config.yaml (default: ~/.stdport)
    #[arg(long, value_name = "PATH", global = true, env = "STDPORT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Ignore configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Run a path operation
    Path(PathCommand),

    /// Validate and pretty-print JSON
    Json(JsonCommand),
}
