//! Step failure boundary
//!
//! Wraps the rendering of one wizard step. While the step is healthy its
//! content is rendered; a failure (returned error or panic) is captured by
//! the [`RecoveryController`] and the fallback view is rendered instead,
//! until a recovery attempt or a reset clears the fault.

use crate::controller::RecoveryController;
use crate::state::{ErrorState, RecoveryState};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use wizard_reporter::{ErrorContext, ErrorInfo, RecoveryStrategy};
use wizard_taxonomy::{Failure, RecoverySuggestion};

const STEP_MESSAGES: [&str; 12] = [
    "We encountered an issue while setting up your social media information.",
    "We encountered an issue while processing your deal terms.",
    "We encountered an issue while processing payor information.",
    "We encountered an issue while selecting activities.",
    "We encountered an issue while processing activity forms.",
    "We encountered an issue while reviewing compliance information.",
    "We encountered an issue while processing compensation details.",
    "We encountered an issue while uploading your contract.",
    "We encountered an issue while reviewing your deal submission.",
    "We encountered an issue while running the clearinghouse prediction.",
    "We encountered an issue while calculating fair market value.",
    "We encountered an issue while processing your submission success.",
];

const DEFAULT_STEP_MESSAGE: &str = "We encountered an issue while processing your information.";

/// Headline for a failed step
#[must_use]
pub fn step_message(step_number: u32) -> &'static str {
    usize::try_from(step_number)
        .ok()
        .and_then(|i| STEP_MESSAGES.get(i))
        .copied()
        .unwrap_or(DEFAULT_STEP_MESSAGE)
}

/// Affordances offered by the fallback view
#[derive(Debug, Clone)]
pub struct RecoveryActions {
    controller: RecoveryController,
}

impl RecoveryActions {
    /// Manual retry; ignored while an attempt is already in flight
    ///
    /// A successful recovery also resets the error state, so the step gets a
    /// fresh retry budget for its next failure.
    pub async fn retry(&self) -> bool {
        if self.controller.recovery_state().is_recovering {
            return false;
        }
        let recovered = self.controller.attempt_recovery(RecoveryStrategy::Manual).await;
        if recovered {
            self.controller.reset_error_state();
        }
        recovered
    }

    /// Dismiss the fault and start over
    pub fn reset(&self) {
        self.controller.reset_error_state();
    }

    /// Preserve progress and leave
    pub fn navigate(&self, target: Option<&str>) {
        self.controller.navigate_to_safe_location(target);
    }
}

/// Everything a fallback view needs
#[derive(Debug, Clone)]
pub struct FallbackProps {
    /// Fault being shown
    pub error_state: ErrorState,
    /// Recovery progress
    pub recovery_state: RecoveryState,
    /// Ordered advice
    pub suggestions: Vec<RecoverySuggestion>,
    /// Step index
    pub step_number: u32,
    /// Step display name
    pub step_name: String,
    /// Headline for this step
    pub step_message: &'static str,
    /// Retry control should be enabled
    pub can_retry: bool,
    /// Retry, reset and navigate
    pub actions: RecoveryActions,
}

/// Renders the fallback view
pub trait FallbackRenderer<V>: Send + Sync {
    /// Render the view for a faulted step
    fn render(&self, props: FallbackProps) -> V;
}

impl<V, F> FallbackRenderer<V> for F
where
    F: Fn(FallbackProps) -> V + Send + Sync,
{
    fn render(&self, props: FallbackProps) -> V {
        self(props)
    }
}

type ErrorCallback = Box<dyn Fn(&Failure, &ErrorContext, u32) + Send + Sync>;

/// Failure boundary around one step's content
///
/// Dropping the boundary tears its controller down.
pub struct StepBoundary<V> {
    controller: RecoveryController,
    fallback: Box<dyn FallbackRenderer<V>>,
    on_error: Option<ErrorCallback>,
}

impl<V> StepBoundary<V> {
    /// Boundary rendering `fallback` while `controller` is faulted
    pub fn new(
        controller: RecoveryController,
        fallback: impl FallbackRenderer<V> + 'static,
    ) -> Self {
        Self {
            controller,
            fallback: Box::new(fallback),
            on_error: None,
        }
    }

    /// Call `callback` with each captured failure, its enriched context and step
    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl Fn(&Failure, &ErrorContext, u32) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Render the step
    ///
    /// Runs `content` only while healthy. An `Err` or a panic from it is
    /// captured and the fallback is rendered in its place.
    pub fn render<E, F>(&self, content: F) -> V
    where
        E: Into<Failure>,
        F: FnOnce() -> Result<V, E>,
    {
        if self.controller.has_error() {
            return self.render_fallback();
        }

        let failure = match panic::catch_unwind(AssertUnwindSafe(content)) {
            Ok(Ok(view)) => return view,
            Ok(Err(e)) => e.into(),
            Err(payload) => Failure::from_panic(&*payload),
        };

        self.capture(failure);
        self.render_fallback()
    }

    /// Controller backing this boundary
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &RecoveryController {
        &self.controller
    }

    /// Props the fallback would be rendered with right now
    #[must_use]
    pub fn fallback_props(&self) -> FallbackProps {
        let step = self.controller.error_context();
        FallbackProps {
            error_state: self.controller.error_state(),
            recovery_state: self.controller.recovery_state(),
            suggestions: self.controller.get_recovery_suggestions(),
            step_number: step.step_number,
            step_message: step_message(step.step_number),
            step_name: step.step_name,
            can_retry: self.controller.can_retry(),
            actions: RecoveryActions {
                controller: self.controller.clone(),
            },
        }
    }

    fn capture(&self, failure: Failure) {
        let step_number = self.controller.error_context().step_number;
        let info = ErrorInfo::new().with_entry("context", format!("DealWizard-Step{step_number}"));
        let context = self.controller.handle_error(failure.clone(), info);

        if let Some(callback) = &self.on_error {
            callback(&failure, &context, step_number);
        }
    }

    fn render_fallback(&self) -> V {
        self.fallback.render(self.fallback_props())
    }
}

impl<V> Drop for StepBoundary<V> {
    fn drop(&mut self) {
        self.controller.teardown();
    }
}

impl<V> fmt::Debug for StepBoundary<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepBoundary")
            .field("controller", &self.controller)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
