use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskzen_core::Priority;
use taskzen_store_json::is_valid_namespace;

use crate::task_store::DEFAULT_NAMESPACE;

const CONFIG_DIR: &str = ".taskzen";
const CONFIG_FILE: &str = "config.toml";
const DATA_DIR: &str = "data";

/// Engine configuration loaded from `.taskzen/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Where and under which key tasks are stored.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Defaults for new tasks.
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl EngineConfig {
    /// Load configuration from a working directory. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    /// Check values that the TOML schema cannot express.
    ///
    /// # Errors
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let namespace = &self.storage.namespace;
        if !is_valid_namespace(namespace) {
            bail!("storage namespace '{namespace}' must be non-empty ASCII alphanumerics, '-', '_' or '.', not starting with '.'");
        }
        if self.storage.dir.as_deref().is_some_and(|dir| dir.as_os_str().is_empty()) {
            bail!("storage dir must not be empty");
        }
        Ok(())
    }

    /// Directory holding the task documents. Relative paths are resolved
    /// against `workdir`.
    #[must_use]
    pub fn data_dir(&self, workdir: impl AsRef<Path>) -> PathBuf {
        let workdir = workdir.as_ref();
        match &self.storage.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => workdir.join(dir),
            None => workdir.join(CONFIG_DIR).join(DATA_DIR),
        }
    }
}

/// `[storage]` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Persistence key of the collection.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Data directory override.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            dir: None,
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

/// `[tasks]` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksConfig {
    /// Priority given to new drafts.
    #[serde(default)]
    pub default_priority: Priority,
}
