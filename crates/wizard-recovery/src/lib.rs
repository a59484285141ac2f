//! Wizard Recovery - failure containment for Deal Wizard steps
//!
//! Each wizard step is wrapped in a [`StepBoundary`] backed by a
//! [`RecoveryController`]. A failure inside the step is captured, classified
//! and reported; the user sees a fallback view offering a bounded number of
//! retries, a reset, or navigation to a safe location. Form progress is
//! preserved through a [`ProgressStore`](wizard_progress::ProgressStore) so
//! leaving the step loses nothing.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wizard_recovery::prelude::*;
//!
//! let reporter = Arc::new(ErrorReporter::new(ReporterConfig::default()));
//! let controller = RecoveryController::builder("deal-1", 2, "Payor Info")
//!     .reporter(reporter.clone())
//!     .build();
//!
//! let boundary = StepBoundary::new(controller, |props: FallbackProps| props.step_message.to_string());
//! let view = boundary.render(|| Err::<String, _>(Failure::new("NetworkError", "fetch failed")));
//!
//! assert!(view.contains("payor information"));
//! assert_eq!(reporter.get_error_analytics().total_errors, 1);
//! ```

#![warn(unreachable_pub)]

pub mod boundary;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;

pub use boundary::{step_message, FallbackProps, FallbackRenderer, RecoveryActions, StepBoundary};
pub use collaborators::{
    LoggingNavigator, Navigator, Notification, NotificationLevel, Notifier, TracingNotifier,
};
pub use config::{RecoveryConfig, ResilienceConfig};
pub use controller::{RecoveryController, RecoveryControllerBuilder};
pub use error::{ConfigError, RecoveryError};
pub use state::{ErrorState, RecoveryState, StepContext};

/// Commonly used items
pub mod prelude {
    pub use crate::boundary::{FallbackProps, StepBoundary};
    pub use crate::config::{RecoveryConfig, ResilienceConfig};
    pub use crate::controller::RecoveryController;
    pub use wizard_reporter::{ErrorInfo, ErrorReporter, RecoveryStrategy, ReporterConfig};
    pub use wizard_taxonomy::{Failure, WorkflowId};
}
