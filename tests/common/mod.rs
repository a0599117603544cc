//! Shared helpers for scriptdeps integration tests

// Not every test file uses every helper
#![allow(dead_code)]

use assert_cmd::Command;
use scriptdeps_cli::constants::CONFIG_ENV_VAR;
use scriptdeps_cli::test_utils::ScriptFixture;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A script tree written to a temporary directory.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    /// Write `fixture` to a fresh temporary directory.
    pub fn new(fixture: &ScriptFixture) -> Self {
        let temp = TempDir::new().unwrap();
        fixture.write_to(temp.path()).unwrap();
        Self {
            temp,
        }
    }

    /// The project directory
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Absolute path of a project file
    pub fn file(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Overwrite or create a project file
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.file(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// `scriptdeps` running in the project directory, isolated from the
    /// caller's environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("scriptdeps").unwrap();
        cmd.current_dir(self.path())
            .env_remove(CONFIG_ENV_VAR)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// Non-empty stdout lines
pub fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
