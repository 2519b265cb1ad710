//! `stdport path`: run a path operation and print the result.
//!
//! Operations producing one path print it on its own line. Operations
//! producing a tuple print it as a JSON array.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::{Args, Subcommand};
use stdport::json::{dumps, Value};
use stdport::path::{Flavor, PathValue, RealpathMode, Resolver};

/// Run a path operation.
#[derive(Args)]
pub struct PathCommand {
    /// Path grammar to use (defaults to configuration, then the host's)
    #[arg(long, value_enum, global = true)]
    pub flavor: Option<Flavor>,

    #[command(subcommand)]
    pub op: PathOp,
}

/// Available path operations.
#[derive(Subcommand)]
pub enum PathOp {
    /// Collapse redundant separators and up-level references
    Normpath {
        /// Paths to normalize
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Split a path into drive, root and tail
    Splitroot {
        /// Path to split
        path: String,
    },

    /// Join path components
    Join {
        /// First component
        base: String,
        /// Further components
        parts: Vec<String>,
    },

    /// Split a path into head and tail at the last separator
    Split {
        /// Path to split
        path: String,
    },

    /// Longest common sub-path
    Commonpath {
        /// Paths to compare
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Relative path from START (default: current directory)
    Relpath {
        /// Target path
        path: String,
        /// Starting directory
        start: Option<String>,
    },

    /// Absolute, normalized path
    Abspath {
        /// Paths to make absolute
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Canonical path with symlinks resolved
    Realpath {
        /// Paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
        /// Fail on any filesystem error or symlink loop
        #[arg(long, conflicts_with = "allow_missing")]
        strict: bool,
        /// Like --strict, but tolerate missing components
        #[arg(long)]
        allow_missing: bool,
    },

    /// Expand a leading ~ or ~user
    Expanduser {
        /// Paths to expand
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Expand environment variable references
    Expandvars {
        /// Paths to expand
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

impl PathCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut resolver = config.resolver();
        if let Some(flavor) = self.flavor {
            resolver = resolver.with_flavor(flavor);
        }
        log::debug!("path {} with {:?} grammar", self.op.name(), resolver.flavor());

        for line in run(resolver, self.op)? {
            println!("{line}");
        }
        Ok(())
    }
}

impl PathOp {
    fn name(&self) -> &'static str {
        match self {
            PathOp::Normpath { .. } => "normpath",
            PathOp::Splitroot { .. } => "splitroot",
            PathOp::Join { .. } => "join",
            PathOp::Split { .. } => "split",
            PathOp::Commonpath { .. } => "commonpath",
            PathOp::Relpath { .. } => "relpath",
            PathOp::Abspath { .. } => "abspath",
            PathOp::Realpath { .. } => "realpath",
            PathOp::Expanduser { .. } => "expanduser",
            PathOp::Expandvars { .. } => "expandvars",
        }
    }
}

/// Runs one operation and renders its output lines.
pub fn run(resolver: Resolver, op: PathOp) -> Result<Vec<String>, CliError> {
    let lines = match op {
        PathOp::Normpath { paths } => each(paths, |p| Ok(resolver.normpath(p)))?,
        PathOp::Splitroot { path } => {
            let (drive, root, tail) = resolver.splitroot(path.as_str());
            vec![tuple(&[drive, root, tail])?]
        }
        PathOp::Join { base, parts } => vec![resolver.join(base, parts)?.to_string()],
        PathOp::Split { path } => {
            let (head, tail) = resolver.split(path.as_str());
            vec![tuple(&[head, tail])?]
        }
        PathOp::Commonpath { paths } => vec![resolver.commonpath(paths)?.to_string()],
        PathOp::Relpath { path, start } => {
            vec![resolver.relpath(path, start.map(PathValue::from))?.to_string()]
        }
        PathOp::Abspath { paths } => each(paths, |p| resolver.abspath(p))?,
        PathOp::Realpath {
            paths,
            strict,
            allow_missing,
        } => {
            let resolver = if strict {
                resolver.with_mode(RealpathMode::Strict)
            } else if allow_missing {
                resolver.with_mode(RealpathMode::AllowMissing)
            } else {
                resolver
            };
            each(paths, |p| resolver.realpath(p))?
        }
        PathOp::Expanduser { paths } => each(paths, |p| Ok(resolver.expanduser(p)))?,
        PathOp::Expandvars { paths } => each(paths, |p| Ok(resolver.expandvars(p)))?,
    };
    Ok(lines)
}

fn each<F>(paths: Vec<String>, mut op: F) -> Result<Vec<String>, CliError>
where
    F: FnMut(String) -> stdport::Result<PathValue>,
{
    paths
        .into_iter()
        .map(|p| op(p).map(|v| v.to_string()).map_err(CliError::from))
        .collect()
}

fn tuple(parts: &[PathValue]) -> Result<String, CliError> {
    let items = parts
        .iter()
        .map(|p| Value::Str(p.to_string_lossy().into_owned()))
        .collect();
    Ok(dumps(&Value::Array(items))?)
}
