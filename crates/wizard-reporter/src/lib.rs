//! Wizard Reporter - structured error reporting for the Deal Wizard
//!
//! Turns captured failures into [`ErrorReport`]s and:
//! - keeps the most recent ones in a bounded FIFO queue
//! - aggregates them into [`ErrorAnalytics`] on demand
//! - forwards each one to a remote [`ErrorSink`] without blocking the caller
//!
//! # Example
//!
//! ```rust
//! use wizard_reporter::{ErrorInfo, ErrorReporter, ReporterConfig, WorkflowContext};
//! use wizard_taxonomy::{Failure, WorkflowId};
//!
//! let reporter = ErrorReporter::new(ReporterConfig::new().with_max_queue_size(10));
//! let context = WorkflowContext::new(WorkflowId::new("deal-1"), 2, "Payor Info");
//!
//! reporter.report_error(Failure::new("NetworkError", "fetch failed"), context, ErrorInfo::new());
//!
//! assert_eq!(reporter.get_error_analytics().total_errors, 1);
//! ```

#![warn(unreachable_pub)]

pub mod analytics;
pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod report;
pub mod reporter;
pub mod sink;

pub use analytics::ErrorAnalytics;
pub use config::ReporterConfig;
pub use environment::{
    EnvironmentProvider, EnvironmentSnapshot, MemoryUsage, PerformanceSnapshot, ProcessEnvironment,
    Viewport,
};
pub use error::SinkError;
pub use event::{ErrorContext, ErrorEvent, ErrorId, ErrorInfo, RecoveryStrategy, WorkflowContext};
pub use report::{AppContext, ErrorReport};
pub use reporter::ErrorReporter;
pub use sink::{ErrorSink, HttpSink};
