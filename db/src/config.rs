//! YAML configuration for tabgen runs.
//!
//! Every section and field is optional; missing values take their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! extraction:
//!   max_depth: 3
//!   help_timeout_ms: 5000
//!   version_timeout_ms: 2000
//!   version_flags: ["--version", "-V"]
//!   quick: false
//! generation:
//!   workers: 4
//!   force: false
//! storage:
//!   base_dir: /home/me/.tabgen
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabgen_discovery::ExtractConfig;

use crate::error::{Result, StorageError};
use crate::store::write_atomic;

/// Deepest exploration accepted by [`TabgenConfig::validate`].
pub const MAX_CONFIG_DEPTH: usize = 8;

/// Directory name used under `$HOME` when no base directory is configured.
pub const DEFAULT_DIR_NAME: &str = ".tabgen";

/// Settings for the generation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker threads; 0 means one per available CPU.
    pub workers: usize,
    /// Regenerate even when version and fingerprint are unchanged.
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

/// Top-level configuration file.
///
/// # Examples
///
/// ```
/// use tabgen_db::TabgenConfig;
///
/// let config: TabgenConfig = serde_yaml::from_str("generation:\n  force: true\n").unwrap();
/// assert!(config.generation.force);
/// assert_eq!(config.extraction.max_depth, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabgenConfig {
    pub extraction: ExtractConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
}

impl TabgenConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](StorageError::Io) if the file cannot be read,
    /// [`Yaml`](StorageError::Yaml) if parsing fails, or
    /// [`InvalidConfig`](StorageError::InvalidConfig) if a value is out of
    /// range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML, replacing any existing file only
    /// once the new one is complete.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_atomic(path.as_ref(), |w| Ok(serde_yaml::to_writer(w, self)?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.max_depth > MAX_CONFIG_DEPTH {
            return Err(StorageError::InvalidConfig(format!(
                "extraction.max_depth must be at most {MAX_CONFIG_DEPTH}, got {}",
                self.extraction.max_depth
            )));
        }
        if let Some(pos) = self
            .extraction
            .version_flags
            .iter()
            .position(|flag| flag.trim().is_empty())
        {
            return Err(StorageError::InvalidConfig(format!(
                "extraction.version_flags[{pos}] is empty"
            )));
        }
        Ok(())
    }

    /// The configured base directory, or `$HOME/.tabgen`.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.storage.base_dir.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_DIR_NAME))
        })
    }
}
