//! Categorization of captured failures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Connectivity or remote data service failure
    Network,
    /// Rejected user input
    Validation,
    /// Defect in step code
    Runtime,
    /// Missing session or permission
    Authorization,
    /// Nothing matched
    Unknown,
}

impl ErrorType {
    /// All variants in rule priority order
    pub const ALL: [ErrorType; 5] = [
        ErrorType::Network,
        ErrorType::Validation,
        ErrorType::Runtime,
        ErrorType::Authorization,
        ErrorType::Unknown,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Network => "network",
            ErrorType::Validation => "validation",
            ErrorType::Runtime => "runtime",
            ErrorType::Authorization => "authorization",
            ErrorType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// User can fix it
    Low,
    /// Default
    Medium,
    /// Blocks the step
    High,
}

impl Severity {
    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action the user is steered towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// No specific action
    None,
    /// Try the step again
    Retry,
    /// Correct form input
    FixInput,
    /// Reload the wizard
    Refresh,
    /// Authenticate again
    Login,
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuggestedAction::None => "none",
            SuggestedAction::Retry => "retry",
            SuggestedAction::FixInput => "fix_input",
            SuggestedAction::Refresh => "refresh",
            SuggestedAction::Login => "login",
        };
        f.write_str(s)
    }
}

/// Result of classifying a failure
///
/// Computed once per captured failure and carried with it; never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
    /// Taxonomy tag
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    /// Severity
    pub severity: Severity,
    /// Whether a bounded retry is meaningful
    pub recoverable: bool,
    /// Steering for the fallback view
    pub suggested_action: SuggestedAction,
}

impl Categorization {
    /// Build a categorization, deriving `recoverable`.
    ///
    /// Authorization failures need re-authentication, which this subsystem
    /// cannot perform, so they are never recoverable. High severity is
    /// unrecoverable except for network failures.
    #[must_use]
    pub const fn new(
        error_type: ErrorType,
        severity: Severity,
        suggested_action: SuggestedAction,
    ) -> Self {
        let authorization = matches!(error_type, ErrorType::Authorization);
        let network = matches!(error_type, ErrorType::Network);
        let high = matches!(severity, Severity::High);
        Self {
            error_type,
            severity,
            recoverable: !(authorization || (high && !network)),
            suggested_action,
        }
    }

    /// Fallback for failures no rule matches
    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(ErrorType::Unknown, Severity::Medium, SuggestedAction::None)
    }
}

impl Default for Categorization {
    fn default() -> Self {
        Self::unknown()
    }
}
