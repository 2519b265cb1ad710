//! Utility functions for CLI operations.
//!
//! Configuration loading and the stream plumbing shared by commands.

use crate::error::CliError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use stdport::{Config, ConfigBuilder};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Directory holding the user `config.yaml`.
    pub config_dir: Option<PathBuf>,

    /// Ignore configuration files.
    pub no_config: bool,
}

/// Load layered configuration (files, then `STDPORT_*` variables).
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    if global.no_config {
        builder = builder.skip_files();
    }
    if let Some(ref dir) = global.config_dir {
        builder = builder.with_config_dir(dir);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// `None` and `-` both mean standard input.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, CliError> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(p) if p == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(p) => {
            let file = File::open(p).map_err(|e| {
                CliError::Io(io::Error::new(e.kind(), format!("{}: {e}", p.display())))
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// `None` and `-` both mean standard output.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    match path {
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(p) if p == Path::new("-") => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(p) => {
            let file = File::create(p).map_err(|e| {
                CliError::Io(io::Error::new(e.kind(), format!("{}: {e}", p.display())))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}
