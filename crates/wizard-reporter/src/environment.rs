//! Ambient environment metadata
//!
//! Read through an injected provider at report-build time, so tests can
//! substitute fixed values.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Descriptive client metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// Agent string
    pub user_agent: String,
    /// Viewport, when the client has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Locale (for example `en-US`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Current location
    pub url: String,
}

/// Memory figures, when the client exposes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Bytes in use
    pub used_bytes: u64,
    /// Bytes reserved
    pub total_bytes: u64,
    /// Upper bound
    pub limit_bytes: u64,
}

/// Performance figures captured with a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    /// When the figures were read
    pub captured_at: DateTime<Utc>,
    /// Time since the provider was created
    pub uptime_ms: u64,
    /// Memory figures, absent when unavailable
    pub memory_usage: Option<MemoryUsage>,
}

/// Read-only source of environment metadata
pub trait EnvironmentProvider: Send + Sync {
    /// Client metadata
    fn environment(&self) -> EnvironmentSnapshot;

    /// Performance figures
    fn performance(&self) -> PerformanceSnapshot;
}

/// Provider describing the running process
///
/// The location is whatever the host last reported via [`set_location`].
///
/// [`set_location`]: ProcessEnvironment::set_location
#[derive(Debug)]
pub struct ProcessEnvironment {
    started: Instant,
    user_agent: String,
    language: Option<String>,
    location: RwLock<String>,
}

impl ProcessEnvironment {
    /// Provider reading locale from `LC_ALL` / `LANG`
    #[must_use]
    pub fn new() -> Self {
        let language = std::env::var("LC_ALL")
            .ok()
            .or_else(|| std::env::var("LANG").ok())
            .filter(|l| !l.is_empty())
            .map(|l| normalize_locale(&l));

        Self {
            started: Instant::now(),
            user_agent: format!(
                "dealwizard-resilience/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            language,
            location: RwLock::new(String::from("/")),
        }
    }

    /// Record the current location
    pub fn set_location(&self, location: impl Into<String>) {
        *self.location.write() = location.into();
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentProvider for ProcessEnvironment {
    fn environment(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            user_agent: self.user_agent.clone(),
            viewport: None,
            language: self.language.clone(),
            url: self.location.read().clone(),
        }
    }

    fn performance(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            captured_at: Utc::now(),
            uptime_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            memory_usage: None,
        }
    }
}

/// `en_US.UTF-8` -> `en-US`
fn normalize_locale(raw: &str) -> String {
    let base = raw.split('.').next().unwrap_or(raw);
    base.replace('_', "-")
}
