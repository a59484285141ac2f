//! Wizard Taxonomy - failure classification for the Deal Wizard
//!
//! The leaf of the resilience workspace:
//! - [`Failure`]: the descriptive fields of a raw failure, copied verbatim
//! - [`Categorizer`]: ordered rule table turning a failure into a [`Categorization`]
//! - [`suggestions_for`] / [`recovery_plan`]: the single source of remediation text
//! - [`WorkflowId`]: identity of an in-progress wizard run
//!
//! # Example
//!
//! ```rust
//! use wizard_taxonomy::{classify, ErrorType, Failure, Severity};
//!
//! let failure = Failure::new("NetworkError", "fetch failed");
//! let categorization = classify(&failure);
//!
//! assert_eq!(categorization.error_type, ErrorType::Network);
//! assert_eq!(categorization.severity, Severity::High);
//! assert!(categorization.recoverable);
//! ```

#![warn(unreachable_pub)]

pub mod category;
pub mod failure;
pub mod rules;
pub mod suggestions;
pub mod workflow;

pub use category::{Categorization, ErrorType, Severity, SuggestedAction};
pub use failure::Failure;
pub use rules::{classify, Categorizer, Matcher, Rule, STANDARD_RULES};
pub use suggestions::{
    recovery_plan, suggestions_for, RecoverySuggestion, SuggestionKind, EXHAUSTED_MESSAGE,
    GENERIC_MESSAGE,
};
pub use workflow::WorkflowId;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
