//! Factory configuration.
//!
//! ```yaml
//! library_dir: lib
//! system_dir: model
//! config_dir: config
//! dry_run: false
//! ```
//!
//! Relative directories in a file are resolved against the file's own
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sr_core::RuntimePaths;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FactoryConfig {
    #[serde(flatten)]
    pub paths: RuntimePaths,
    /// Skip eager library loading at construction.
    #[serde(default)]
    pub dry_run: bool,
}

impl FactoryConfig {
    pub fn new(paths: RuntimePaths) -> Self {
        Self {
            paths,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Dry-run is on if configured, or if built with the `dry-run` feature.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run || cfg!(feature = "dry-run")
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load_yaml(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [
            &mut self.paths.library_dir,
            &mut self.paths.system_dir,
            &mut self.paths.config_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}
