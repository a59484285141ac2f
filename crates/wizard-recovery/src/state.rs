//! Error and recovery state of one workflow step instance
//!
//! Neither is persisted: both live as long as the step view and start over
//! when it remounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wizard_reporter::{ErrorContext, ErrorEvent, ErrorId, RecoveryStrategy};
use wizard_taxonomy::WorkflowId;

/// Identity of the step a controller guards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContext {
    /// Workflow (deal) id
    pub workflow_id: WorkflowId,
    /// Step index
    pub step_number: u32,
    /// Step display name
    pub step_name: String,
}

/// Fault state
///
/// `recovery_attempts` grows by one per captured failure and only returns to
/// zero through an explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    /// A failure is being shown
    pub has_error: bool,
    /// The failure being shown
    pub current_error: Option<ErrorEvent>,
    /// Captured failures since the last reset
    pub recovery_attempts: u32,
    /// Capture time of the latest failure
    pub last_error_time: Option<DateTime<Utc>>,
    /// Enriched context of the latest failure
    pub last_context: Option<ErrorContext>,
}

impl ErrorState {
    /// Id of the failure being shown
    #[inline]
    #[must_use]
    pub fn current_error_id(&self) -> Option<ErrorId> {
        self.current_error.as_ref().map(ErrorEvent::error_id)
    }

    /// Return to the idle shape, keeping the attempt count and last error time
    pub(crate) fn clear_fault(&mut self) {
        self.has_error = false;
        self.current_error = None;
        self.last_context = None;
    }
}

/// Recovery state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryState {
    /// An attempt's delay has not resolved yet
    pub is_recovering: bool,
    /// Strategy of the latest attempt
    pub recovery_strategy: Option<RecoveryStrategy>,
    /// Host may start attempts on its own
    pub auto_retry_enabled: bool,
    /// Retry budget
    pub max_retry_attempts: u32,
    /// Latest preservation reached the store
    pub progress_preserved: bool,
}

impl RecoveryState {
    /// Initial state for a budget
    #[must_use]
    pub fn new(max_retry_attempts: u32, auto_retry_enabled: bool) -> Self {
        Self {
            is_recovering: false,
            recovery_strategy: None,
            auto_retry_enabled,
            max_retry_attempts,
            progress_preserved: false,
        }
    }
}

impl Default for RecoveryState {
    fn default() -> Self {
        Self::new(3, true)
    }
}
