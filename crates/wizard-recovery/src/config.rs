//! Configuration for the resilience layer
//!
//! ```toml
//! [recovery]
//! max_retry_attempts = 3
//! recovery_delay_ms = 1000
//!
//! [reporter]
//! max_queue_size = 50
//! reporting_enabled = true
//! endpoint = "https://api.example.com/api/errors/dealwizard"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use wizard_reporter::ReporterConfig;

/// Per-step recovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Retry budget per step instance
    pub max_retry_attempts: u32,
    /// Initial auto-retry flag
    pub auto_retry_enabled: bool,
    /// Fixed pause before a recovery attempt clears the fault
    pub recovery_delay_ms: u64,
    /// Default target of safe navigation
    pub safe_location: String,
}

impl RecoveryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With retry budget
    #[inline]
    #[must_use]
    pub fn with_max_retry_attempts(mut self, max: u32) -> Self {
        self.max_retry_attempts = max;
        self
    }

    /// With recovery delay
    #[inline]
    #[must_use]
    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With safe-navigation target
    #[inline]
    #[must_use]
    pub fn with_safe_location(mut self, location: impl Into<String>) -> Self {
        self.safe_location = location.into();
        self
    }

    /// Recovery delay as a duration
    #[inline]
    #[must_use]
    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            auto_retry_enabled: true,
            recovery_delay_ms: 1000,
            safe_location: "/dashboard".to_string(),
        }
    }
}

/// Whole resilience layer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Recovery controller settings
    pub recovery: RecoveryConfig,
    /// Error reporter settings
    pub reporter: ReporterConfig,
}

impl ResilienceConfig {
    /// Parse and validate TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` if a constraint is violated
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - see [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check value constraints
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recovery.max_retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "recovery.max_retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.reporter.max_queue_size == 0 {
            return Err(ConfigError::Invalid(
                "reporter.max_queue_size must be at least 1".to_string(),
            ));
        }
        if !self.recovery.safe_location.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "recovery.safe_location must be an absolute path, got '{}'",
                self.recovery.safe_location
            )));
        }
        if let Some(endpoint) = &self.reporter.endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                ConfigError::Invalid(format!("reporter.endpoint '{endpoint}': {e}"))
            })?;
        }
        Ok(())
    }
}
