//! Error types for tool extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::probe::ProbeError;

/// Errors that fail an extraction pass for one tool.
///
/// A tool with no help output, no man page, or a probe that timed out is not
/// an error; it yields a [`Tool`](tabgen_core::Tool) tagged
/// [`SourceTag::None`](tabgen_core::SourceTag::None).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("path cannot be empty")]
    EmptyPath,

    #[error("path does not exist: {0}")]
    PathMissing(PathBuf),

    #[error("path is a directory, not an executable: {0}")]
    IsDirectory(PathBuf),

    #[error("path is not executable: {0}")]
    NotExecutable(PathBuf),

    #[error("cannot access path {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to run a help probe.
    #[error("cannot run {command}: {source}")]
    PermissionDenied {
        command: String,
        #[source]
        source: ProbeError,
    },
}

impl ExtractError {
    /// Returns `true` for errors raised before any probe ran.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ExtractError::PermissionDenied { .. })
    }
}
