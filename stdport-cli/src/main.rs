//! Main entry point for the stdport CLI.
//!
//! - `path`: POSIX and Windows path operations, including `realpath`
//! - `json`: validate and pretty-print JSON documents

use clap::Parser;
use stdport_cli::cli::{Cli, Command};
use stdport_cli::utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _logger = stdport::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_dir: cli.config_dir,
        no_config: cli.no_config,
    };

    let result = match cli.command {
        Command::Path(cmd) => cmd.execute(&global),
        Command::Json(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            if !global.quiet || global.verbose {
                eprintln!("Error: {e}");
            }
            std::process::exit(e.exit_code());
        }
    }
}
