//! Reporter configuration

use serde::{Deserialize, Serialize};

/// Environment variable holding the API base URL
pub const API_URL_VAR: &str = "WIZARD_API_URL";
/// Environment variable holding the deployment mode
pub const MODE_VAR: &str = "WIZARD_MODE";
/// Environment variable holding the application version
pub const APP_VERSION_VAR: &str = "WIZARD_APP_VERSION";
/// Path appended to the API base URL
pub const INGESTION_PATH: &str = "/api/errors/dealwizard";

/// Reporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Ring buffer capacity
    pub max_queue_size: usize,
    /// Whether reports are forwarded to the remote endpoint
    pub reporting_enabled: bool,
    /// Remote ingestion endpoint
    pub endpoint: Option<String>,
    /// Deployment mode (`production`, `development`, `test`)
    pub mode: String,
    /// Application version stamped on reports
    pub app_version: String,
    /// Per-request timeout for forwarding
    pub request_timeout_secs: u64,
}

impl ReporterConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from `WIZARD_API_URL`, `WIZARD_MODE` and `WIZARD_APP_VERSION`.
    ///
    /// Forwarding is enabled only in `production` mode.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(mode) = lookup(MODE_VAR).filter(|m| !m.is_empty()) {
            config.mode = mode;
        }
        config.reporting_enabled = config.mode == "production";

        if let Some(base) = lookup(API_URL_VAR).filter(|u| !u.is_empty()) {
            config.endpoint = Some(format!("{}{INGESTION_PATH}", base.trim_end_matches('/')));
        }
        if let Some(version) = lookup(APP_VERSION_VAR).filter(|v| !v.is_empty()) {
            config.app_version = version;
        }

        config
    }

    /// With queue capacity
    #[inline]
    #[must_use]
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// With forwarding enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_reporting_enabled(mut self, enabled: bool) -> Self {
        self.reporting_enabled = enabled;
        self
    }

    /// With remote endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// With deployment mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 50,
            reporting_enabled: false,
            endpoint: None,
            mode: "development".to_string(),
            app_version: "1.0.0".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ReporterConfig::default();
        assert_eq!(config.max_queue_size, 50);
        assert!(!config.reporting_enabled);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn production_env_enables_reporting() {
        let config = ReporterConfig::from_lookup(lookup(&[
            ("WIZARD_MODE", "production"),
            ("WIZARD_API_URL", "https://api.example.com/"),
            ("WIZARD_APP_VERSION", "2.3.1"),
        ]));
        assert!(config.reporting_enabled);
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://api.example.com/api/errors/dealwizard")
        );
        assert_eq!(config.app_version, "2.3.1");
    }

    #[test]
    fn non_production_env_disables_reporting() {
        let config = ReporterConfig::from_lookup(lookup(&[
            ("WIZARD_MODE", "development"),
            ("WIZARD_API_URL", "http://localhost:8000"),
        ]));
        assert!(!config.reporting_enabled);
        assert!(config.endpoint.is_some());
    }
}
