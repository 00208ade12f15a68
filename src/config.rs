//! Rule config loading.
//!
//! Rule sets live on disk as one JSON file per target. A directory may
//! carry an `index.json` (a JSON array of filenames) naming which files to
//! load; without one the loader falls back to the standard six.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rules::{RuleConfigSet, TileRuleConfig};

/// Files loaded when the config directory has no `index.json`.
pub const DEFAULT_RULE_FILES: [&str; 6] = [
    "tree.json",
    "farm.json",
    "people.json",
    "power.json",
    "waste.json",
    "empty.json",
];

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct RuleConfigLoader {
    base_dir: PathBuf,
}

impl RuleConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Load one rule file, resolved against the base directory.
    pub fn load_file(&self, file: impl AsRef<Path>) -> Result<TileRuleConfig, ConfigError> {
        let path = self.base_dir.join(file);
        let data = read(&path)?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Load the directory's full rule set, honoring `index.json` when
    /// present.
    pub fn load_set(&self) -> Result<RuleConfigSet, ConfigError> {
        let mut set = RuleConfigSet::new();
        for file in self.file_list()? {
            set.insert(self.load_file(&file)?);
        }
        Ok(set)
    }

    fn file_list(&self) -> Result<Vec<String>, ConfigError> {
        let index_path = self.base_dir.join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(DEFAULT_RULE_FILES.iter().map(|f| f.to_string()).collect());
        }
        let data = read(&index_path)?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: index_path,
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
