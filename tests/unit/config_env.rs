//! `KWAVE_CONFIG` handling.

use kwave_cli::config::{KwaveConfig, OutputFormat};
use serial_test::serial;
use std::ffi::OsString;
use tempfile::TempDir;

/// Sets `KWAVE_CONFIG` for the lifetime of the guard, restoring it on drop.
struct ConfigEnvGuard {
    previous: Option<OsString>,
}

impl ConfigEnvGuard {
    fn set(value: &std::path::Path) -> Self {
        let previous = std::env::var_os("KWAVE_CONFIG");
        // SAFETY: every test touching the environment is #[serial]
        unsafe { std::env::set_var("KWAVE_CONFIG", value) };
        Self {
            previous,
        }
    }
}

impl Drop for ConfigEnvGuard {
    fn drop(&mut self) {
        // SAFETY: every test touching the environment is #[serial]
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var("KWAVE_CONFIG", value),
                None => std::env::remove_var("KWAVE_CONFIG"),
            }
        }
    }
}

#[test]
#[serial]
fn test_env_overrides_default_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    let _guard = ConfigEnvGuard::set(&path);

    assert_eq!(KwaveConfig::default_path().unwrap(), path);
}

#[tokio::test]
#[serial]
async fn test_load_reads_env_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    tokio::fs::write(&path, "[output]\nformat = \"yaml\"\n\n[mutate]\ncache = false\n").await.unwrap();
    let _guard = ConfigEnvGuard::set(&path);

    let config = KwaveConfig::load().await.unwrap();
    assert_eq!(config.output.format, Some(OutputFormat::Yaml));
    assert!(!config.mutate.cache);
}

#[tokio::test]
#[serial]
async fn test_explicit_path_beats_env() {
    let temp = TempDir::new().unwrap();
    let from_env = temp.path().join("env.toml");
    let explicit = temp.path().join("explicit.toml");
    tokio::fs::write(&from_env, "[output]\nformat = \"yaml\"\n").await.unwrap();
    tokio::fs::write(&explicit, "[output]\nformat = \"json\"\n").await.unwrap();
    let _guard = ConfigEnvGuard::set(&from_env);

    let config = KwaveConfig::load_with_optional(Some(explicit)).await.unwrap();
    assert_eq!(config.output.format, Some(OutputFormat::Json));
}

#[tokio::test]
#[serial]
async fn test_missing_env_file_is_default() {
    let temp = TempDir::new().unwrap();
    let _guard = ConfigEnvGuard::set(&temp.path().join("absent.toml"));

    assert_eq!(KwaveConfig::load().await.unwrap(), KwaveConfig::default());
}
