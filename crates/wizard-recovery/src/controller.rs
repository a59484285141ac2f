//! Recovery controller
//!
//! One controller guards one workflow step instance and owns its error and
//! recovery state machine:
//!
//! ```text
//!            handle_error                attempt_recovery
//!   Idle ─────────────────▶ Faulted ─────────────────────▶ Recovering
//!    ▲                        │  ▲                              │
//!    │    reset_error_state   │  │   budget spent / torn down   │
//!    └────────────────────────┘  └──────────────────────────────┤
//!    ▲                                                          │
//!    └────────────────────── delay resolved ────────────────────┘
//! ```
//!
//! Safe navigation is available from every state; it preserves progress and
//! hands off to the host's navigator without touching either state.

use crate::collaborators::{LoggingNavigator, Navigator, Notification, Notifier, TracingNotifier};
use crate::config::RecoveryConfig;
use crate::error::RecoveryError;
use crate::state::{ErrorState, RecoveryState, StepContext};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wizard_progress::{
    FieldMap, KeyValueStore, MemoryStore, NavigationEntry, ProgressSnapshot, ProgressStore,
};
use wizard_reporter::{
    ErrorContext, ErrorEvent, ErrorId, ErrorInfo, ErrorReporter, RecoveryStrategy, WorkflowContext,
};
use wizard_taxonomy::{recovery_plan, Failure, RecoverySuggestion, WorkflowId};

/// Error/recovery state machine for one step instance
///
/// Cheap to clone; clones share state. Dropping clones does not tear the
/// instance down, [`teardown`](Self::teardown) does.
#[derive(Clone)]
pub struct RecoveryController {
    inner: Arc<Inner>,
}

struct Inner {
    step: RwLock<StepContext>,
    machine: Mutex<Machine>,
    progress: Mutex<ProgressSnapshot>,
    store: ProgressStore,
    reporter: Arc<ErrorReporter>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    recovery_delay: Duration,
    safe_location: String,
    alive: AtomicBool,
}

#[derive(Debug, Clone, Default)]
struct Machine {
    error: ErrorState,
    recovery: RecoveryState,
}

impl RecoveryController {
    /// Controller with default collaborators
    #[must_use]
    pub fn new(
        workflow_id: impl Into<WorkflowId>,
        step_number: u32,
        step_name: impl Into<String>,
    ) -> Self {
        Self::builder(workflow_id, step_number, step_name).build()
    }

    /// Builder for a controller
    #[must_use]
    pub fn builder(
        workflow_id: impl Into<WorkflowId>,
        step_number: u32,
        step_name: impl Into<String>,
    ) -> RecoveryControllerBuilder {
        RecoveryControllerBuilder {
            step: StepContext {
                workflow_id: workflow_id.into(),
                step_number,
                step_name: step_name.into(),
            },
            config: RecoveryConfig::default(),
            reporter: None,
            store: None,
            navigator: None,
            notifier: None,
        }
    }

    /// Capture a failure raised by the step.
    ///
    /// Increments the attempt count, classifies the failure, records the
    /// enriched context as the current fault, hands the event to the reporter
    /// and notifies the user. Repeated identical failures are not suppressed.
    pub fn handle_error(&self, failure: Failure, info: ErrorInfo) -> ErrorContext {
        let step = self.inner.step.read().clone();
        let categorization = self.inner.reporter.categorizer().classify(&failure);

        let (event, context) = {
            let mut machine = self.inner.machine.lock();
            machine.error.recovery_attempts += 1;

            let workflow = WorkflowContext::new(
                step.workflow_id.clone(),
                step.step_number,
                step.step_name.clone(),
            )
            .with_attempts(machine.error.recovery_attempts)
            .with_strategy(machine.recovery.recovery_strategy);
            let event = ErrorEvent::new(failure, workflow.clone(), categorization);
            let context = ErrorContext {
                error_id: event.error_id(),
                workflow,
                info: info.clone(),
            };

            machine.error.has_error = true;
            machine.error.current_error = Some(event.clone());
            machine.error.last_error_time = Some(event.timestamp());
            machine.error.last_context = Some(context.clone());
            (event, context)
        };

        tracing::error!(
            workflow_id = %step.workflow_id,
            step = step.step_number,
            error_id = %event.error_id(),
            attempts = context.workflow.recovery_attempts,
            "DealWizard error in step {} ({}): {}",
            step.step_number,
            step.step_name,
            event.failure()
        );

        self.inner.reporter.record_event(event, info);
        self.inner.notifier.notify(Notification::step_failed(&step.step_name));

        context
    }

    /// Try to clear the current fault; resolves `true` on success.
    ///
    /// Refused immediately once `recovery_attempts >= max_retry_attempts`.
    /// Otherwise waits the fixed recovery delay, then clears the fault. A
    /// second call while one is in flight is not rejected here; hosts should
    /// disable their retry control while `is_recovering` is set. Dropping the
    /// future before the delay resolves abandons the attempt: `is_recovering`
    /// is cleared and the fault stays.
    pub async fn attempt_recovery(&self, strategy: RecoveryStrategy) -> bool {
        match self.try_attempt_recovery(strategy).await {
            Ok(()) => true,
            Err(e) => {
                tracing::info!(
                    workflow_id = %self.workflow_id(),
                    reason = %e,
                    "recovery attempt failed"
                );
                false
            }
        }
    }

    /// [`attempt_recovery`](Self::attempt_recovery) with the reason for failure
    ///
    /// # Errors
    /// - `RecoveryError::AttemptsExhausted` if the budget is spent
    /// - `RecoveryError::TornDown` if the step went away during the delay
    pub async fn try_attempt_recovery(
        &self,
        strategy: RecoveryStrategy,
    ) -> Result<(), RecoveryError> {
        {
            let mut machine = self.inner.machine.lock();
            let attempts = machine.error.recovery_attempts;
            let max = machine.recovery.max_retry_attempts;
            if attempts >= max {
                machine.recovery.is_recovering = false;
                return Err(RecoveryError::AttemptsExhausted { attempts, max });
            }
            machine.recovery.is_recovering = true;
            machine.recovery.recovery_strategy = Some(strategy);
        }

        tracing::debug!(workflow_id = %self.workflow_id(), %strategy, "recovery attempt started");
        let mut in_flight = InFlight {
            inner: &self.inner,
            armed: true,
        };
        tokio::time::sleep(self.inner.recovery_delay).await;
        in_flight.armed = false;

        if !self.is_alive() {
            self.inner.reporter.record_recovery_outcome(false);
            return Err(RecoveryError::TornDown);
        }

        {
            let mut machine = self.inner.machine.lock();
            machine.error.clear_fault();
            machine.recovery.is_recovering = false;
        }

        self.inner.reporter.record_recovery_outcome(true);
        self.inner.notifier.notify(Notification::recovered());
        Ok(())
    }

    /// Give up on the fault: back to the initial error state, attempts zeroed
    pub fn reset_error_state(&self) {
        let mut machine = self.inner.machine.lock();
        machine.error = ErrorState::default();
        machine.recovery.is_recovering = false;
        machine.recovery.recovery_strategy = None;
    }

    /// Preserve progress, then leave for `target` (or the configured safe location)
    pub fn navigate_to_safe_location(&self, target: Option<&str>) {
        let target = target.unwrap_or(&self.inner.safe_location).to_string();
        let from = self.inner.navigator.current_path();

        self.inner
            .progress
            .lock()
            .record_navigation(NavigationEntry::now(from, target.clone()));
        self.preserve_progress(FieldMap::new(), FieldMap::new());

        self.inner.navigator.navigate_to(&target);
    }

    /// Merge fields into the snapshot and persist it. Never fails.
    pub fn preserve_progress(&self, form_data: FieldMap, step_data: FieldMap) {
        let snapshot = {
            let mut progress = self.inner.progress.lock();
            progress.merge(form_data, step_data);
            progress.last_saved_state = Some(chrono::Utc::now());
            progress.clone()
        };

        let saved = self.inner.store.save(&self.workflow_id(), &snapshot);
        self.inner.machine.lock().recovery.progress_preserved = saved;
    }

    /// Load the persisted snapshot and fold it into the in-memory one
    ///
    /// Returns what was loaded, or `None` if nothing usable was stored.
    #[must_use]
    pub fn restore_progress(&self) -> Option<ProgressSnapshot> {
        let loaded = self.inner.store.load(&self.workflow_id())?;
        self.inner.progress.lock().absorb(&loaded);
        Some(loaded)
    }

    /// In-memory snapshot
    #[must_use]
    pub fn get_progress(&self) -> ProgressSnapshot {
        self.inner.progress.lock().clone()
    }

    /// Suggestions for the fallback view
    ///
    /// Uses the same categorization-driven text as the reporter, preceded by
    /// a warning once the retry budget is spent.
    #[must_use]
    pub fn get_recovery_suggestions(&self) -> Vec<RecoverySuggestion> {
        let machine = self.inner.machine.lock();
        let exhausted = machine.error.recovery_attempts >= machine.recovery.max_retry_attempts;
        let categorization = machine.error.current_error.as_ref().map(ErrorEvent::categorization);
        recovery_plan(categorization, exhausted)
    }

    /// Whether a retry control should be offered right now
    #[must_use]
    pub fn can_retry(&self) -> bool {
        let machine = self.inner.machine.lock();
        let recoverable = machine
            .error
            .current_error
            .as_ref()
            .map_or(true, |e| e.categorization().recoverable);
        machine.error.has_error
            && recoverable
            && !machine.recovery.is_recovering
            && machine.error.recovery_attempts < machine.recovery.max_retry_attempts
    }

    /// Current error state
    #[must_use]
    pub fn error_state(&self) -> ErrorState {
        self.inner.machine.lock().error.clone()
    }

    /// Current recovery state
    #[must_use]
    pub fn recovery_state(&self) -> RecoveryState {
        self.inner.machine.lock().recovery.clone()
    }

    /// Whether a fault is being shown
    #[inline]
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.inner.machine.lock().error.has_error
    }

    /// Id of the fault being shown
    #[must_use]
    pub fn current_error_id(&self) -> Option<ErrorId> {
        self.inner.machine.lock().error.current_error_id()
    }

    /// Step identity
    #[must_use]
    pub fn error_context(&self) -> StepContext {
        self.inner.step.read().clone()
    }

    /// Follow the wizard to another step
    pub fn update_context(&self, step_number: u32, step_name: impl Into<String>) {
        let mut step = self.inner.step.write();
        step.step_number = step_number;
        step.step_name = step_name.into();
    }

    /// Enable or disable auto-retry
    pub fn set_auto_retry(&self, enabled: bool) {
        self.inner.machine.lock().recovery.auto_retry_enabled = enabled;
    }

    /// Change the retry budget
    pub fn set_max_retry_attempts(&self, max: u32) {
        self.inner.machine.lock().recovery.max_retry_attempts = max;
    }

    /// Mark the step as gone; in-flight attempts will not touch its state
    pub fn teardown(&self) {
        if self.inner.alive.swap(false, Ordering::AcqRel) {
            tracing::debug!(workflow_id = %self.workflow_id(), "recovery controller torn down");
        }
    }

    /// Whether the step is still mounted
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    /// Shared reporter
    #[inline]
    #[must_use]
    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.inner.reporter
    }

    fn workflow_id(&self) -> WorkflowId {
        self.inner.step.read().workflow_id.clone()
    }
}

/// Held across the recovery delay; clears `is_recovering` if the attempt is
/// dropped before the delay resolves on a live controller.
struct InFlight<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && self.inner.alive.load(Ordering::Acquire) {
            self.inner.machine.lock().recovery.is_recovering = false;
            tracing::debug!("recovery attempt abandoned before its delay resolved");
        }
    }
}

impl fmt::Debug for RecoveryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let machine = self.inner.machine.lock();
        f.debug_struct("RecoveryController")
            .field("step", &*self.inner.step.read())
            .field("error", &machine.error)
            .field("recovery", &machine.recovery)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RecoveryController`]
#[must_use]
pub struct RecoveryControllerBuilder {
    step: StepContext,
    config: RecoveryConfig,
    reporter: Option<Arc<ErrorReporter>>,
    store: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl RecoveryControllerBuilder {
    /// With recovery configuration
    pub fn config(mut self, config: RecoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// With shared reporter
    pub fn reporter(mut self, reporter: Arc<ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// With persistence medium
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// With page navigation service
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// With notification surface
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the controller
    #[must_use]
    pub fn build(self) -> RecoveryController {
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        RecoveryController {
            inner: Arc::new(Inner {
                step: RwLock::new(self.step),
                machine: Mutex::new(Machine {
                    error: ErrorState::default(),
                    recovery: RecoveryState::new(
                        self.config.max_retry_attempts,
                        self.config.auto_retry_enabled,
                    ),
                }),
                progress: Mutex::new(ProgressSnapshot::default()),
                store: ProgressStore::new(store),
                reporter: self.reporter.unwrap_or_default(),
                navigator: self
                    .navigator
                    .unwrap_or_else(|| Arc::new(LoggingNavigator::starting_at("/"))),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                recovery_delay: self.config.recovery_delay(),
                safe_location: self.config.safe_location,
                alive: AtomicBool::new(true),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wizard_taxonomy::{ErrorType, SuggestionKind};

    #[derive(Default)]
    struct CountingNotifier(Mutex<Vec<Notification>>);

    impl Notifier for CountingNotifier {
        fn notify(&self, notification: Notification) {
            self.0.lock().push(notification);
        }
    }

    fn controller() -> RecoveryController {
        RecoveryController::builder("deal-1", 2, "Payor Info")
            .config(RecoveryConfig::new().with_recovery_delay(Duration::from_millis(1000)))
            .reporter(Arc::new(ErrorReporter::default()))
            .build()
    }

    fn fields(value: serde_json::Value) -> FieldMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }

    #[test]
    fn starts_idle() {
        let c = controller();
        assert_eq!(c.error_state(), ErrorState::default());
        let recovery = c.recovery_state();
        assert!(!recovery.is_recovering);
        assert_eq!(recovery.max_retry_attempts, 3);
        assert!(recovery.auto_retry_enabled);
    }

    #[test]
    fn handle_error_faults_and_classifies() {
        let c = controller();
        let context =
            c.handle_error(Failure::new("NetworkError", "fetch failed"), ErrorInfo::new());

        let state = c.error_state();
        assert!(state.has_error);
        assert_eq!(state.recovery_attempts, 1);
        assert_eq!(context.workflow.recovery_attempts, 1);
        assert_eq!(context.workflow.step_name, "Payor Info");
        assert_eq!(state.current_error_id(), Some(context.error_id));

        let categorization = *state.current_error.unwrap().categorization();
        assert_eq!(categorization.error_type, ErrorType::Network);
        assert!(categorization.recoverable);
        assert_eq!(c.reporter().queue_len(), 1);
    }

    #[test]
    fn handle_error_notifies() {
        let notifier = Arc::new(CountingNotifier::default());
        let c = RecoveryController::builder("deal-1", 2, "Payor Info")
            .notifier(notifier.clone())
            .build();
        c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());
        let seen = notifier.0.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].description.contains("Payor Info"));
    }

    #[test]
    fn reset_clears_everything() {
        let c = controller();
        c.handle_error(Failure::new("Error", "a"), ErrorInfo::new());
        c.handle_error(Failure::new("Error", "b"), ErrorInfo::new());
        c.reset_error_state();

        let state = c.error_state();
        assert!(!state.has_error);
        assert_eq!(state.recovery_attempts, 0);
        assert!(c.recovery_state().recovery_strategy.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_recovery_clears_fault_after_delay() {
        let c = controller();
        c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());

        assert!(c.attempt_recovery(RecoveryStrategy::Manual).await);
        let state = c.error_state();
        assert!(!state.has_error);
        assert_eq!(state.recovery_attempts, 1);
        assert!(!c.recovery_state().is_recovering);
        assert_eq!(c.recovery_state().recovery_strategy, Some(RecoveryStrategy::Manual));
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_recovery_refused_when_exhausted() {
        let c = controller();
        for _ in 0..3 {
            c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());
        }

        let result = c.try_attempt_recovery(RecoveryStrategy::Manual).await;
        assert_eq!(result, Err(RecoveryError::AttemptsExhausted { attempts: 3, max: 3 }));
        assert!(c.has_error());
        assert!(!c.recovery_state().is_recovering);
    }

    #[tokio::test(start_paused = true)]
    async fn torn_down_controller_is_not_mutated() {
        let c = controller();
        c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());

        let attempt = tokio::spawn({
            let c = c.clone();
            async move { c.try_attempt_recovery(RecoveryStrategy::Auto).await }
        });
        tokio::task::yield_now().await;
        assert!(c.recovery_state().is_recovering);

        c.teardown();
        assert_eq!(attempt.await.unwrap(), Err(RecoveryError::TornDown));
        assert!(c.has_error());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_attempt_releases_retry() {
        let c = controller();
        c.handle_error(Failure::new("NetworkError", "fetch failed"), ErrorInfo::new());

        let attempt = tokio::spawn({
            let c = c.clone();
            async move { c.attempt_recovery(RecoveryStrategy::Manual).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(c.recovery_state().is_recovering);

        attempt.abort();
        assert!(attempt.await.unwrap_err().is_cancelled());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(!c.recovery_state().is_recovering);
        assert!(c.has_error());
        assert_eq!(c.error_state().recovery_attempts, 1);
        assert!(c.can_retry());
        assert!(c.attempt_recovery(RecoveryStrategy::Manual).await);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_releases_retry() {
        let c = controller();
        c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());

        let timed_out = tokio::time::timeout(
            Duration::from_millis(100),
            c.attempt_recovery(RecoveryStrategy::Auto),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(!c.recovery_state().is_recovering);
        assert!(c.can_retry());
    }

    #[test]
    fn preserve_merges_fields() {
        let c = controller();
        c.preserve_progress(fields(json!({"a": 1})), FieldMap::new());
        c.preserve_progress(fields(json!({"b": 2})), fields(json!({"activities": ["social"]})));

        let progress = c.get_progress();
        assert_eq!(progress.form_data, fields(json!({"a": 1, "b": 2})));
        assert_eq!(progress.step_data["activities"], json!(["social"]));
        assert!(progress.last_saved_state.is_some());
        assert!(c.recovery_state().progress_preserved);
    }

    #[test]
    fn suggestions_follow_current_failure() {
        let c = controller();
        assert_eq!(c.get_recovery_suggestions().len(), 1);

        c.handle_error(Failure::new("Error", "permission denied"), ErrorInfo::new());
        let suggestions = c.get_recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.message.contains("log in again")));
        assert!(!c.can_retry());

        c.set_max_retry_attempts(1);
        assert_eq!(c.get_recovery_suggestions()[0].kind, SuggestionKind::Warning);
    }

    #[test]
    fn update_context_moves_step() {
        let c = controller();
        c.update_context(3, "Select Activities");
        let context = c.handle_error(Failure::new("Error", "x"), ErrorInfo::new());
        assert_eq!(context.workflow.step_number, 3);
        assert_eq!(c.error_context().step_name, "Select Activities");
    }
}
