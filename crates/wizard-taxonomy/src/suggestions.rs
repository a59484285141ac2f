//! Plain-language recovery suggestions
//!
//! Both the error reporter and the recovery controller take their text from
//! here, so the same failure always yields the same advice.

use crate::category::{Categorization, ErrorType, SuggestedAction};
use serde::{Deserialize, Serialize};

/// Shown first once the retry budget is spent
pub const EXHAUSTED_MESSAGE: &str =
    "Maximum retry attempts reached. Consider refreshing the page or starting over.";

/// Shown when there is no categorized failure to advise on
pub const GENERIC_MESSAGE: &str =
    "Try refreshing the page or contact support if the problem persists.";

/// Remediation text for a failure category
#[must_use]
pub fn suggestions_for(error_type: ErrorType) -> &'static [&'static str] {
    match error_type {
        ErrorType::Network => &[
            "Check your internet connection",
            "Try refreshing the page",
            "Contact support if the problem persists",
        ],
        ErrorType::Validation => &[
            "Check your form inputs",
            "Ensure all required fields are filled",
            "Verify your data format",
        ],
        ErrorType::Runtime => &[
            "Refresh the page to reload the application",
            "Clear your browser cache",
            "Try using a different browser",
        ],
        ErrorType::Authorization => &[
            "Please log in again",
            "Check your account permissions",
            "Contact support for assistance",
        ],
        ErrorType::Unknown => &[
            "Try refreshing the page",
            "Contact support if the problem persists",
        ],
    }
}

/// Visual weight of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Retry budget spent
    Warning,
    /// Regular advice
    Info,
}

/// A suggestion as shown by the fallback view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverySuggestion {
    /// Visual weight
    pub kind: SuggestionKind,
    /// Text shown to the user
    pub message: String,
    /// Affordance the suggestion points at
    pub action: SuggestedAction,
}

impl RecoverySuggestion {
    /// Info suggestion
    #[inline]
    #[must_use]
    pub fn info(message: impl Into<String>, action: SuggestedAction) -> Self {
        Self {
            kind: SuggestionKind::Info,
            message: message.into(),
            action,
        }
    }

    /// Warning suggestion
    #[inline]
    #[must_use]
    pub fn warning(message: impl Into<String>, action: SuggestedAction) -> Self {
        Self {
            kind: SuggestionKind::Warning,
            message: message.into(),
            action,
        }
    }
}

/// Ordered suggestions for the fallback view.
///
/// An exhausted retry budget puts a warning first. The category's advice
/// follows; with no categorized failure a single generic line is returned.
#[must_use]
pub fn recovery_plan(
    categorization: Option<&Categorization>,
    attempts_exhausted: bool,
) -> Vec<RecoverySuggestion> {
    let mut plan = Vec::new();

    if attempts_exhausted {
        plan.push(RecoverySuggestion::warning(EXHAUSTED_MESSAGE, SuggestedAction::Refresh));
    }

    match categorization {
        Some(c) => plan.extend(
            suggestions_for(c.error_type)
                .iter()
                .map(|msg| RecoverySuggestion::info(*msg, c.suggested_action)),
        ),
        None => plan.push(RecoverySuggestion::info(GENERIC_MESSAGE, SuggestedAction::Refresh)),
    }

    plan
}
