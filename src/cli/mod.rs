//! Command-line interface for kwave.
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute` method. Commands work offline on YAML/JSON files: they never
//! contact a cluster, sources of apply-time mutations are read from the
//! documents passed in.
//!
//! # Commands
//!
//! - `sort` - print the apply waves of a batch
//! - `validate` - check that a batch can be ordered; exits non-zero otherwise
//! - `mutate` - simulate an apply: order the batch, then run the namespace
//!   defaulter and the apply-time mutator wave by wave and print the result
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - no logging at all
//! - `--config` / `-c` - configuration file, see [`crate::config`]
//!
//! `RUST_LOG` takes precedence over both verbosity flags.
//!
//! # Examples
//!
//! ```bash
//! kwave sort manifests/*.yaml
//! kwave sort --reverse --format json manifests/*.yaml
//! kwave validate app.yaml crds.yaml
//! kwave --verbose mutate --format json app.yaml
//! ```

mod common;
mod mutate;
mod sort;
mod validate;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::KwaveConfig;

pub use mutate::MutateCommand;
pub use sort::SortCommand;
pub use validate::ValidateCommand;

/// Runtime settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can build one directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Configuration file given with `--config`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Settings with `info` logging and the default config location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_level: Some("info".to_string()),
            config_path: None,
        }
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over [`Self::log_level`]. Installing twice is a no-op.
    pub fn init_logging(&self) {
        let filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the configuration file these settings point at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_config(&self) -> Result<KwaveConfig> {
        KwaveConfig::load_with_optional(self.config_path.clone()).await
    }
}

/// Order and pre-process batches of Kubernetes resources.
#[derive(Parser, Debug)]
#[command(
    name = "kwave",
    about = "Order Kubernetes resources into apply waves and resolve apply-time mutations",
    version,
    author,
    long_about = "kwave reads batches of Kubernetes resources, orders them into waves from \
                  their depends-on and apply-time-mutation annotations plus implicit \
                  Namespace/CRD relationships, and fills in apply-time field substitutions."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging; command output and errors are still printed.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Overrides `KWAVE_CONFIG` and the default `~/.kwave/config.toml`.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the apply waves of a batch of resources.
    Sort(SortCommand),

    /// Check that a batch of resources can be ordered.
    ///
    /// Reports every missing dependency, duplicate entry, malformed
    /// annotation and cycle at once, and exits with status 1 if there are any.
    Validate(ValidateCommand),

    /// Resolve apply-time mutations wave by wave and print the result.
    Mutate(MutateCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns any error of the command; `main` turns it into a
    /// user-friendly message and exit status 1.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command
    /// fails.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let settings = config.load_config().await?;

        match self.command {
            Commands::Sort(cmd) => cmd.execute(&settings).await,
            Commands::Validate(cmd) => cmd.execute(&settings).await,
            Commands::Mutate(cmd) => cmd.execute(&settings).await,
        }
    }
}
