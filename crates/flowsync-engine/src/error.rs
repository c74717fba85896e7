//! Engine error types.
//!
//! Only conditions that abort a whole run live here. Per-item failures
//! (one unreadable file, one rejected publish) are converted into batch
//! result entries at the reconciliation boundary and never propagate out
//! of the batch loop.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that abort an engine run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem read/write failure.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file that must parse as JSON did not.
    #[error("failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Discovery found none of the manifest's component folders on disk.
    ///
    /// There is nothing safe to reconcile against, so the run aborts before
    /// touching the index or the API.
    #[error("no component folders found on disk; check the project manifest")]
    NoComponentFolders,

    /// Configuration/manifest failure.
    #[error(transparent)]
    Config(#[from] flowsync_config::ConfigError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        EngineError::Json {
            path: path.into(),
            source,
        }
    }
}
