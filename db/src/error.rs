//! Error types for catalog storage and configuration loading.

use thiserror::Error;

/// Errors that can occur while reading or writing tabgen data files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration values out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A tool name that cannot be used as a file name.
    #[error("invalid tool name: {0:?}")]
    InvalidToolName(String),
}

/// Convenience alias for results with [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;
