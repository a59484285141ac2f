//! Error reports: events enriched for analysis and forwarding

use crate::environment::{EnvironmentSnapshot, PerformanceSnapshot};
use crate::event::{ErrorEvent, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Build metadata stamped on every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppContext {
    /// Deployment mode
    pub mode: String,
    /// Application version
    pub version: String,
}

/// The unit queued by the reporter and sent to the remote sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// The captured event
    #[serde(flatten)]
    pub event: ErrorEvent,
    /// Environment at report-build time
    pub user_context: EnvironmentSnapshot,
    /// Build metadata
    pub app_context: AppContext,
    /// Performance figures at report-build time
    pub performance_context: PerformanceSnapshot,
    /// Caller-supplied info
    pub additional_context: ErrorInfo,
}

impl ErrorReport {
    /// Step name the report belongs to
    #[inline]
    #[must_use]
    pub fn step_name(&self) -> &str {
        &self.event.workflow_context().step_name
    }
}
