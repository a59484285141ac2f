//! The error reporter
//!
//! Owns a bounded FIFO of reports (oldest evicted first), aggregates
//! analytics over it on demand and forwards each report to an optional remote
//! sink. Enqueueing is synchronous; forwarding is spawned on the ambient tokio
//! runtime and never awaited by the caller. No operation here returns an
//! error or panics on an infrastructure fault.

use crate::analytics::ErrorAnalytics;
use crate::config::ReporterConfig;
use crate::environment::{EnvironmentProvider, ProcessEnvironment};
use crate::event::{ErrorEvent, ErrorId, ErrorInfo, WorkflowContext};
use crate::report::{AppContext, ErrorReport};
use crate::sink::{ErrorSink, HttpSink};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wizard_taxonomy::{Categorizer, Failure};

/// Centralized error reporter
///
/// Construct one per wizard (or per test) and share it through an `Arc`.
pub struct ErrorReporter {
    settings: RwLock<Settings>,
    max_queue_size: usize,
    queue: Mutex<VecDeque<ErrorReport>>,
    categorizer: Categorizer,
    environment: Arc<dyn EnvironmentProvider>,
    recoveries_attempted: AtomicU64,
    recoveries_succeeded: AtomicU64,
}

struct Settings {
    reporting_enabled: bool,
    sink: Option<Arc<dyn ErrorSink>>,
    mode: String,
    app_version: String,
    request_timeout: Duration,
}

impl ErrorReporter {
    /// Reporter from configuration
    ///
    /// An HTTP sink is built when an endpoint is configured. An invalid
    /// endpoint is logged and leaves the reporter without a sink.
    #[must_use]
    pub fn new(config: ReporterConfig) -> Self {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let sink = config
            .endpoint
            .as_deref()
            .and_then(|endpoint| build_http_sink(endpoint, request_timeout));

        Self {
            settings: RwLock::new(Settings {
                reporting_enabled: config.reporting_enabled,
                sink,
                mode: config.mode,
                app_version: config.app_version,
                request_timeout,
            }),
            max_queue_size: config.max_queue_size.max(1),
            queue: Mutex::new(VecDeque::with_capacity(config.max_queue_size.max(1))),
            categorizer: Categorizer::standard(),
            environment: Arc::new(ProcessEnvironment::new()),
            recoveries_attempted: AtomicU64::new(0),
            recoveries_succeeded: AtomicU64::new(0),
        }
    }

    /// Replace the remote sink
    #[must_use]
    pub fn with_sink(self, sink: Arc<dyn ErrorSink>) -> Self {
        self.settings.write().sink = Some(sink);
        self
    }

    /// Replace the environment provider
    #[must_use]
    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentProvider>) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the categorizer
    #[must_use]
    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    /// Classify, capture and record a failure
    pub fn report_error(
        &self,
        failure: Failure,
        context: WorkflowContext,
        info: ErrorInfo,
    ) -> ErrorId {
        let event = ErrorEvent::capture(failure, context, &self.categorizer);
        self.record_event(event, info)
    }

    /// Record an already captured event
    ///
    /// Builds the report (environment is read now), enqueues it, logs it and
    /// forwards it if reporting is enabled and a sink is configured.
    pub fn record_event(&self, event: ErrorEvent, info: ErrorInfo) -> ErrorId {
        let error_id = event.error_id();
        let report = self.build_report(event, info);

        self.enqueue(report.clone());
        log_report(&report);

        let forward = {
            let settings = self.settings.read();
            match (&settings.sink, settings.reporting_enabled) {
                (Some(sink), true) => Some(Arc::clone(sink)),
                _ => None,
            }
        };
        if let Some(sink) = forward {
            spawn_forward(sink, report);
        }

        error_id
    }

    /// Aggregate snapshot of the current queue
    #[must_use]
    pub fn get_error_analytics(&self) -> ErrorAnalytics {
        let queue = self.queue.lock();
        ErrorAnalytics::compute(queue.iter(), self.recovery_success_rate())
    }

    /// Up to `limit` most recent reports, newest first
    #[must_use]
    pub fn get_recent_errors(&self, limit: usize) -> Vec<ErrorReport> {
        self.queue.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Number of queued reports
    #[inline]
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Ring buffer capacity
    #[inline]
    #[must_use]
    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// Empty the queue and the recovery counters
    ///
    /// Reports already handed to the sink are unaffected.
    pub fn clear_queue(&self) {
        self.queue.lock().clear();
        self.recoveries_attempted.store(0, Ordering::Relaxed);
        self.recoveries_succeeded.store(0, Ordering::Relaxed);
    }

    /// Remediation text for a failure, by its category
    #[must_use]
    pub fn get_recovery_suggestions(
        &self,
        failure: &Failure,
        _context: &WorkflowContext,
    ) -> Vec<String> {
        let categorization = self.categorizer.classify(failure);
        wizard_taxonomy::suggestions_for(categorization.error_type)
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    /// Whether a bounded retry is meaningful for this failure
    #[inline]
    #[must_use]
    pub fn is_error_recoverable(&self, failure: &Failure) -> bool {
        self.categorizer.classify(failure).recoverable
    }

    /// Count the outcome of one recovery attempt
    pub fn record_recovery_outcome(&self, succeeded: bool) {
        self.recoveries_attempted.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.recoveries_succeeded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Enable or disable forwarding
    pub fn set_reporting_enabled(&self, enabled: bool) {
        self.settings.write().reporting_enabled = enabled;
    }

    /// Point forwarding at a new endpoint, or remove it with `None`
    pub fn set_reporting_endpoint(&self, endpoint: Option<&str>) {
        let mut settings = self.settings.write();
        let timeout = settings.request_timeout;
        settings.sink = endpoint.and_then(|e| build_http_sink(e, timeout));
    }

    /// Whether forwarding is enabled
    #[inline]
    #[must_use]
    pub fn is_reporting_enabled(&self) -> bool {
        self.settings.read().reporting_enabled
    }

    /// Whether a sink is configured
    #[inline]
    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.settings.read().sink.is_some()
    }

    /// Categorizer used for captures
    #[inline]
    #[must_use]
    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    fn build_report(&self, event: ErrorEvent, info: ErrorInfo) -> ErrorReport {
        let app_context = {
            let settings = self.settings.read();
            AppContext {
                mode: settings.mode.clone(),
                version: settings.app_version.clone(),
            }
        };

        ErrorReport {
            event,
            user_context: self.environment.environment(),
            app_context,
            performance_context: self.environment.performance(),
            additional_context: info,
        }
    }

    fn enqueue(&self, report: ErrorReport) {
        let mut queue = self.queue.lock();
        queue.push_back(report);
        while queue.len() > self.max_queue_size {
            queue.pop_front();
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn recovery_success_rate(&self) -> f64 {
        let attempted = self.recoveries_attempted.load(Ordering::Relaxed);
        if attempted == 0 {
            return 0.0;
        }
        self.recoveries_succeeded.load(Ordering::Relaxed) as f64 / attempted as f64
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(ReporterConfig::default())
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("max_queue_size", &self.max_queue_size)
            .field("queued", &self.queue_len())
            .field("reporting_enabled", &self.is_reporting_enabled())
            .finish_non_exhaustive()
    }
}

fn build_http_sink(endpoint: &str, timeout: Duration) -> Option<Arc<dyn ErrorSink>> {
    match HttpSink::new(endpoint, timeout) {
        Ok(sink) => Some(Arc::new(sink)),
        Err(e) => {
            tracing::warn!(endpoint, error = %e, "error reporting endpoint rejected");
            None
        }
    }
}

fn spawn_forward(sink: Arc<dyn ErrorSink>, report: ErrorReport) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(
            error_id = %report.event.error_id(),
            "no async runtime available, report not forwarded"
        );
        return;
    };

    handle.spawn(async move {
        if let Err(e) = sink.send(&report).await {
            tracing::warn!(
                error_id = %report.event.error_id(),
                error = %e,
                "failed to send error report"
            );
        }
    });
}

fn log_report(report: &ErrorReport) {
    let context = report.event.workflow_context();
    let categorization = report.event.categorization();
    tracing::error!(
        error_id = %report.event.error_id(),
        step = context.step_number,
        step_name = %context.step_name,
        workflow_id = %context.workflow_id,
        error_type = %categorization.error_type,
        severity = %categorization.severity,
        "DealWizard error report: {}",
        report.event.failure()
    );
}
