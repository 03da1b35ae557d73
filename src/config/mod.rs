//! Configuration management for kwave
//!
//! kwave reads one optional TOML file of user settings. Nothing in it is
//! required: a missing file behaves like an empty one.
//!
//! # Location
//!
//! - Unix/macOS: `~/.kwave/config.toml`
//! - Windows: `%LOCALAPPDATA%\kwave\config.toml`
//! - Override: the `KWAVE_CONFIG` environment variable, or `--config` on the
//!   command line (which wins over the variable)
//!
//! # Format
//!
//! ```toml
//! [output]
//! format = "yaml"          # text | yaml | json
//!
//! [mutate]
//! cache = true             # share fetched sources across waves
//!
//! # Extra resource types the type resolver should know, typically CRDs that
//! # are already installed in the cluster and so are not part of the inputs.
//! [[types]]
//! group = "example.com"
//! kind = "Widget"
//! resource = "widgets"
//! namespaced = true
//! versions = ["v1"]
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use kwave_cli::config::KwaveConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = KwaveConfig::load().await?;
//! println!("{} custom types", config.types.len());
//! # Ok(())
//! # }
//! ```

mod global;

pub use global::{KwaveConfig, MutateConfig, OutputConfig, OutputFormat, TypeConfig};
