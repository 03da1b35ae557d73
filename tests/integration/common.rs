//! Shared helpers for the integration tests.

use anyhow::{Context, Result};
use assert_cmd::Command;
use kwave_cli::test_utils::BatchFixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Output of one `kwave` invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// A temporary directory to run `kwave` in.
///
/// `KWAVE_CONFIG` points at `config.toml` inside the directory, so the
/// user's own configuration never leaks into a test.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    pub async fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        tokio::fs::write(&path, content).await.with_context(|| format!("Failed to write {name}"))?;
        Ok(path)
    }

    pub async fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.config_path();
        tokio::fs::write(&path, content).await.context("Failed to write config")?;
        Ok(path)
    }

    pub fn write_fixture(&self, fixture: &BatchFixture) -> Result<PathBuf> {
        fixture.write_to(self.temp.path())
    }

    /// Command preconfigured to run in this project.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("kwave").expect("kwave binary is built");
        cmd.current_dir(self.temp.path())
            .env("KWAVE_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_kwave(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_kwave_with_stdin(args, "")
    }

    pub fn run_kwave_with_stdin(&self, args: &[&str], stdin: &str) -> Result<CommandOutput> {
        let output = self
            .command()
            .args(args)
            .write_stdin(stdin)
            .output()
            .context("Failed to run kwave")?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
