//! Common test utilities for tdl integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never read the
//! user's real `config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
pub use tempfile::TempDir;
use todoledger::config::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};

/// A test environment with an isolated working and config directory.
///
/// The `tdl()` method returns a `Command` that sets `TDL_CONFIG`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tdl binary with an isolated config file.
    pub fn tdl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tdl"));
        cmd.current_dir(self.work_dir.path());
        cmd.env(CONFIG_PATH_ENV, self.config_path());
        cmd.env_remove("TDL_LOG");
        cmd
    }

    /// Path of the config file `tdl()` points at (may not exist).
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join(CONFIG_FILE_NAME)
    }

    /// Write config.kdl for this environment.
    pub fn write_config(&self, text: &str) {
        std::fs::write(self.config_path(), text).unwrap();
    }

    /// Write a JSONL script into the working directory and return its path.
    pub fn write_script(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse stdout of a successful command as JSON.
pub fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}
