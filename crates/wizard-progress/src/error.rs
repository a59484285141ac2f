//! Error types for progress persistence

use std::path::PathBuf;

/// Failures of the underlying key-value medium
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Write would exceed the medium's capacity
    #[error("quota exceeded writing '{key}': {required} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes the write would occupy
        required: usize,
        /// Configured quota
        quota: usize,
    },

    /// Key cannot be mapped onto the medium
    #[error("invalid key: '{0}'")]
    InvalidKey(String),

    /// IO error on a file-backed medium
    #[error("io error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Medium is unavailable (disabled, locked, ...)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the medium ran out of space
    #[inline]
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
