//! Common test utilities for CLI integration tests.
//!
//! Every command runs with an empty user config directory, inside a
//! temporary working directory, and with `STDPORT_*` variables cleared,
//! so the host's configuration never leaks into a test.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STDPORT_VARS: &[&str] = &[
    "STDPORT_CONFIG_DIR",
    "STDPORT_LOG_MODE",
    "STDPORT_JSON_INDENT",
    "STDPORT_JSON_SORT_KEYS",
    "STDPORT_JSON_ENSURE_ASCII",
    "STDPORT_JSON_ALLOW_NAN",
    "STDPORT_JSON_STRICT",
    "STDPORT_JSON_MAX_DEPTH",
    "STDPORT_PATH_FLAVOR",
    "STDPORT_REALPATH_MODE",
    "STDPORT_MAX_LINKS",
];

/// Isolated test environment.
pub struct TestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Working directory for spawned commands.
    pub work_dir: PathBuf,
    /// User configuration directory passed via `--config-dir`.
    pub config_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = std::fs::canonicalize(temp_dir.path()).expect("Failed to resolve temp dir");
        let work_dir = root.join("work");
        let config_dir = root.join("config");
        std::fs::create_dir_all(&work_dir).expect("Failed to create work dir");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            work_dir,
            config_dir,
        }
    }

    /// The stdport binary with a scrubbed environment and no global flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("stdport").expect("Failed to find stdport binary");
        for var in STDPORT_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(&self.work_dir);
        cmd
    }

    /// The stdport binary pointed at this environment's config directory.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--config-dir").arg(&self.config_dir);
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.work_dir
    }

    /// Write the user `config.yaml`.
    pub fn write_user_config(&self, contents: &str) {
        std::fs::write(self.config_dir.join("config.yaml"), contents)
            .expect("Failed to write user config");
    }

    /// Write `stdport.yaml` into the working directory.
    pub fn write_project_config(&self, contents: &str) {
        std::fs::write(self.work_dir.join("stdport.yaml"), contents)
            .expect("Failed to write project config");
    }

    /// Write a file under the working directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }
}
