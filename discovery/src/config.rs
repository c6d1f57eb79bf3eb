//! Extraction settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_HELP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_VERSION_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_VERSION_FLAGS: &[&str] = &["--version", "-V", "version", "-v"];

/// Knobs for one extraction pass.
///
/// Zero or empty values mean "use the default"; call
/// [`normalized`](ExtractConfig::normalized) before use. The struct is also
/// the `extraction:` section of the YAML config file.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::ExtractConfig;
///
/// let config = ExtractConfig { max_depth: 0, version_flags: vec![], ..ExtractConfig::default() }
///     .normalized();
/// assert_eq!(config.max_depth, 2);
/// assert_eq!(config.version_flags, vec!["--version", "-V", "version", "-v"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Exploration depth; the tool itself is depth 0.
    pub max_depth: usize,
    pub help_timeout_ms: u64,
    pub version_timeout_ms: u64,
    /// Version probe arguments, tried in order.
    pub version_flags: Vec<String>,
    /// Skip the man probe and subcommand exploration.
    pub quick: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            help_timeout_ms: DEFAULT_HELP_TIMEOUT_MS,
            version_timeout_ms: DEFAULT_VERSION_TIMEOUT_MS,
            version_flags: DEFAULT_VERSION_FLAGS.iter().map(|s| s.to_string()).collect(),
            quick: false,
        }
    }
}

impl ExtractConfig {
    /// Replaces zero/empty fields with their defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.max_depth == 0 {
            self.max_depth = defaults.max_depth;
        }
        if self.help_timeout_ms == 0 {
            self.help_timeout_ms = defaults.help_timeout_ms;
        }
        if self.version_timeout_ms == 0 {
            self.version_timeout_ms = defaults.version_timeout_ms;
        }
        if self.version_flags.is_empty() {
            self.version_flags = defaults.version_flags;
        }
        self
    }

    pub fn quick(mut self) -> Self {
        self.quick = true;
        self
    }

    pub fn help_timeout(&self) -> Duration {
        Duration::from_millis(self.help_timeout_ms)
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_millis(self.version_timeout_ms)
    }
}
