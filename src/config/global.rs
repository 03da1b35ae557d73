//! User configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cluster::{Scope, StaticTypeResolver, TypeMapping};
use crate::constants::CONFIG_PATH_ENV;
use crate::core::{GroupKind, KwaveError};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// YAML document stream
    Yaml,
    /// JSON
    Json,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format; each command has its own fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// `[mutate]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateConfig {
    /// Share fetched source documents across waves
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            cache: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// One `[[types]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {
    /// API group, empty for the core group
    #[serde(default)]
    pub group: String,
    /// Kind
    pub kind: String,
    /// Plural resource name; defaults to the lowercased kind plus `s`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Whether objects live in a namespace
    #[serde(default = "default_true")]
    pub namespaced: bool,
    /// Served versions; empty accepts any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KwaveConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Mutation settings
    #[serde(default)]
    pub mutate: MutateConfig,

    /// Additional resource types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeConfig>,
}

impl KwaveConfig {
    /// Load from the default location, or defaults when there is no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, else from the default location.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!(target: "cli", "no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).map_err(|source| {
            KwaveError::ConfigParse {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    /// Write to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directories or the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(KwaveError::from)?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Default config file path.
    ///
    /// `KWAVE_CONFIG` wins when set and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("kwave")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".kwave")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Register every `[[types]]` entry with `resolver`.
    pub fn register_types(&self, resolver: &mut StaticTypeResolver) {
        for entry in &self.types {
            let scope = if entry.namespaced {
                Scope::Namespaced
            } else {
                Scope::Cluster
            };
            let resource = entry.resource.clone().unwrap_or_else(|| format!("{}s", entry.kind.to_lowercase()));
            resolver.register_versions(
                GroupKind::new(entry.group.clone(), entry.kind.clone()),
                TypeMapping::new(scope, resource),
                entry.versions.clone(),
            );
        }
    }
}
