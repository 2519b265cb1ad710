//! Build script for stdport-cli.
//!
//! Generates man pages at build time using clap_mangen and places them in
//! OUT_DIR for inclusion in release builds.
//!
//! Build scripts cannot depend on the crate being built, so the command
//! structure is declared here a second time.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Keep synchronized with src/cli.rs and src/commands/.
fn build_cli() -> Command {
    Command::new("stdport")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Path grammar and JSON tools with standard-library semantics")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .help("Directory holding the user config.yaml (default: ~/.stdport)")
                .value_name("PATH")
                .global(true)
                .env("STDPORT_CONFIG_DIR"),
        )
        .arg(
            Arg::new("no-config")
                .long("no-config")
                .help("Ignore configuration files")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("path")
                .about("Run a path operation")
                .long_about(
                    "Run normpath, splitroot, join, split, commonpath, relpath, abspath, \
                     realpath, expanduser or expandvars under POSIX or Windows rules",
                ),
            Command::new("json")
                .about("Validate and pretty-print JSON")
                .long_about("Decode JSON from a file or standard input and write it back formatted"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("stdport.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
