use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use wizard_recovery::{FallbackProps, Navigator, RecoveryController, StepBoundary};
use wizard_reporter::{ErrorInfo, ErrorReporter, ReporterConfig};
use wizard_taxonomy::{Failure, SuggestionKind};
use wizard_test_utils::{ChannelSink, FixedEnvironment, Harness};

mock! {
    Nav {}

    impl Navigator for Nav {
        fn current_path(&self) -> String;
        fn navigate_to(&self, path: &str);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Step(String),
    Fallback {
        message: &'static str,
        can_retry: bool,
        suggestions: usize,
        attempts: u32,
    },
}

fn fallback(props: FallbackProps) -> Screen {
    Screen::Fallback {
        message: props.step_message,
        can_retry: props.can_retry,
        suggestions: props.suggestions.len(),
        attempts: props.error_state.recovery_attempts,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("fetch failed: connection reset")]
struct NetworkError;

#[test]
fn test_error_value_is_contained() {
    let h = Harness::new("deal-7", 2, "Payor Info");
    let boundary = StepBoundary::new(h.controller.clone(), fallback);

    let screen = boundary.render(|| Err::<Screen, _>(NetworkError));

    assert_eq!(
        screen,
        Screen::Fallback {
            message: "We encountered an issue while processing payor information.",
            can_retry: true,
            suggestions: 3,
            attempts: 1,
        }
    );
    let report = &h.reporter.get_recent_errors(1)[0];
    assert_eq!(report.event.failure().name, "NetworkError");
    assert_eq!(report.additional_context.extra["context"], "DealWizard-Step2");
}

#[tokio::test(start_paused = true)]
async fn test_recovered_boundary_renders_content_again() {
    let h = Harness::new("deal-7", 5, "Compliance");
    let boundary = StepBoundary::new(h.controller.clone(), fallback);

    let _ = boundary.render(|| Err::<Screen, _>(Failure::new("TypeError", "x is undefined")));
    assert!(matches!(
        boundary.render(|| Ok::<_, Failure>(Screen::Step("compliance".into()))),
        Screen::Fallback { .. }
    ));

    assert!(boundary.fallback_props().actions.retry().await);

    let screen = boundary.render(|| Ok::<_, Failure>(Screen::Step("compliance".into())));
    assert_eq!(screen, Screen::Step("compliance".into()));
}

#[tokio::test(start_paused = true)]
async fn test_successful_retries_keep_step_retryable() {
    let h = Harness::new("deal-7", 3, "Select Activities");
    let boundary = StepBoundary::new(h.controller.clone(), fallback);

    let mut cycles = Vec::new();
    for _ in 0..5 {
        let screen =
            boundary.render(|| Err::<Screen, _>(Failure::new("NetworkError", "fetch failed")));
        let can_retry = matches!(screen, Screen::Fallback { can_retry: true, attempts: 1, .. });
        let recovered = boundary.fallback_props().actions.retry().await;
        cycles.push((can_retry, recovered));
    }

    assert_eq!(cycles, vec![(true, true); 5]);
    assert_eq!(h.controller.error_state().recovery_attempts, 0);
    assert_eq!(h.reporter.get_error_analytics().total_errors, 5);
}

#[test]
fn test_reset_action_restarts_budget() {
    let h = Harness::new("deal-7", 2, "Payor Info");
    let boundary = StepBoundary::new(h.controller.clone(), fallback);

    let _ = boundary.render(|| Err::<Screen, _>(Failure::new("Error", "first")));
    boundary.fallback_props().actions.reset();

    let screen = boundary.render(|| Err::<Screen, _>(Failure::new("Error", "second")));
    assert!(matches!(screen, Screen::Fallback { attempts: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_disables_retry() {
    let h = Harness::new("deal-7", 2, "Payor Info");
    let boundary = StepBoundary::new(h.controller.clone(), fallback);

    let _ = boundary.render(|| Err::<Screen, _>(Failure::new("Error", "again")));
    for _ in 0..2 {
        h.controller.handle_error(Failure::new("Error", "again"), ErrorInfo::new());
    }

    let props = boundary.fallback_props();
    assert!(!props.can_retry);
    assert_eq!(props.suggestions[0].kind, SuggestionKind::Warning);
    assert!(!props.actions.retry().await);
}

#[test]
fn test_navigate_action_uses_navigator() {
    let mut navigator = MockNav::new();
    navigator
        .expect_current_path()
        .times(1)
        .returning(|| "/deal-wizard/step-4".to_string());
    navigator
        .expect_navigate_to()
        .withf(|path: &str| path == "/dashboard")
        .times(1)
        .return_const(());

    let controller = RecoveryController::builder("deal-7", 4, "Activity Forms")
        .navigator(Arc::new(navigator))
        .build();
    let boundary = StepBoundary::new(controller, fallback);

    let _ = boundary.render(|| Err::<Screen, _>(Failure::new("Error", "boom")));
    boundary.fallback_props().actions.navigate(None);

    let progress = boundary.controller().get_progress();
    assert_eq!(progress.navigation_history[0].from, "/deal-wizard/step-4");
    assert!(progress.last_saved_state.is_some());
}

#[tokio::test]
async fn test_captured_failure_is_forwarded() {
    let (sink, mut rx) = ChannelSink::channel();
    let reporter = Arc::new(
        ErrorReporter::new(ReporterConfig::new().with_reporting_enabled(true))
            .with_sink(Arc::new(sink))
            .with_environment(Arc::new(FixedEnvironment)),
    );
    let controller = RecoveryController::builder("deal-7", 7, "Contract Upload")
        .reporter(reporter)
        .build();
    let boundary = StepBoundary::new(controller, fallback);

    let _ = boundary.render(|| Err::<Screen, _>(Failure::new("Error", "upload failed")));

    let report = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.step_name(), "Contract Upload");
    assert_eq!(report.user_context.user_agent, "test-agent/1.0");
    assert_eq!(report.event.workflow_context().recovery_attempts, 1);
}
