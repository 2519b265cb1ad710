//! Integration tests for the stdport CLI surface: help, version and
//! argument parsing.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_cli_no_arguments() {
    TestEnv::new()
        .command_bare()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version_flag() {
    TestEnv::new()
        .command_bare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stdport"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_help_lists_subcommands() {
    TestEnv::new()
        .command_bare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("json"));
}

#[test]
fn test_path_help_lists_operations() {
    TestEnv::new()
        .command_bare()
        .args(["path", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("normpath"))
        .stdout(predicate::str::contains("realpath"))
        .stdout(predicate::str::contains("commonpath"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    TestEnv::new()
        .command_bare()
        .arg("frobnicate")
        .assert()
        .code(2);
}

#[test]
fn test_realpath_strict_conflicts_with_allow_missing() {
    TestEnv::new()
        .command()
        .args(["path", "realpath", "--strict", "--allow-missing", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_flavor_is_usage_error() {
    TestEnv::new()
        .command()
        .args(["path", "--flavor", "vms", "normpath", "a"])
        .assert()
        .code(2);
}

#[test]
fn test_json_whitespace_flags_conflict() {
    TestEnv::new()
        .command()
        .args(["json", "--tab", "--compact"])
        .assert()
        .code(2);
}
