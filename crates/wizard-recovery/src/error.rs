//! Error types for the recovery layer
//!
//! Nothing here crosses the resilience operations themselves: those are
//! fail-soft. [`RecoveryError`] explains why an attempt resolved `false`,
//! [`ConfigError`] is raised while loading configuration.

use std::path::PathBuf;

/// Why a recovery attempt did not clear the fault
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// Retry budget already spent
    #[error("retry budget exhausted ({attempts}/{max} attempts)")]
    AttemptsExhausted {
        /// Current attempt count
        attempts: u32,
        /// Configured maximum
        max: u32,
    },

    /// Owning step was torn down while the attempt was in flight
    #[error("step torn down during recovery")]
    TornDown,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for the expected shape
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but violate a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_error_display() {
        let err = RecoveryError::AttemptsExhausted { attempts: 3, max: 3 };
        assert!(err.to_string().contains("3/3"));
        assert!(RecoveryError::TornDown.to_string().contains("torn down"));
    }
}
