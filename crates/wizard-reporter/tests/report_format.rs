use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wizard_reporter::{
    EnvironmentProvider, EnvironmentSnapshot, ErrorInfo, ErrorReporter, PerformanceSnapshot,
    RecoveryStrategy, ReporterConfig, WorkflowContext,
};
use wizard_taxonomy::{Failure, WorkflowId};

struct StaticEnvironment;

impl EnvironmentProvider for StaticEnvironment {
    fn environment(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            user_agent: "agent/1.0".to_string(),
            viewport: None,
            language: Some("en-US".to_string()),
            url: "/deal-wizard".to_string(),
        }
    }

    fn performance(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            captured_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            uptime_ms: 7,
            memory_usage: None,
        }
    }
}

fn reporter() -> ErrorReporter {
    ErrorReporter::new(ReporterConfig::new().with_mode("production"))
        .with_environment(Arc::new(StaticEnvironment))
}

fn report_json(reporter: &ErrorReporter) -> Value {
    let report = reporter.get_recent_errors(1).remove(0);
    serde_json::to_value(report).unwrap()
}

#[test]
fn test_report_wire_shape() {
    let reporter = reporter();
    let context = WorkflowContext::new(WorkflowId::new("deal-9"), 6, "Compensation")
        .with_attempts(2)
        .with_strategy(Some(RecoveryStrategy::Manual));
    let info = ErrorInfo::new()
        .with_component_stack("at CompensationStep")
        .with_entry("context", "DealWizard-Step6");

    let failure = Failure::new("ValidationError", "amount is required");
    let id = reporter.report_error(failure, context, info);
    let value = report_json(&reporter);

    assert_eq!(value["errorId"], json!(id.to_string()));
    assert!(value["errorId"].as_str().unwrap().starts_with("dealwizard_error_"));
    assert!(value["timestamp"].is_string());
    assert_eq!(value["error"]["name"], "ValidationError");
    assert_eq!(
        value["dealWizardContext"],
        json!({
            "dealId": "deal-9",
            "stepNumber": 6,
            "stepName": "Compensation",
            "recoveryAttempts": 2,
            "recoveryStrategy": "manual",
        })
    );
    assert_eq!(
        value["categorization"],
        json!({
            "type": "validation",
            "severity": "low",
            "recoverable": true,
            "suggestedAction": "fix_input",
        })
    );
    assert_eq!(value["appContext"], json!({"mode": "production", "version": "1.0.0"}));
    assert_eq!(value["userContext"]["userAgent"], "agent/1.0");
    assert_eq!(value["performanceContext"]["uptimeMs"], 7);
    assert_eq!(value["additionalContext"]["componentStack"], "at CompensationStep");
    assert_eq!(value["additionalContext"]["context"], "DealWizard-Step6");
}

#[test]
fn test_queue_keeps_latest_fifty() {
    let reporter = reporter();
    let mut last = None;
    for i in 0..55 {
        let context = WorkflowContext::new(WorkflowId::new("deal-9"), 1, "Deal Terms");
        let failure = Failure::new("Error", format!("failure {i}"));
        last = Some(reporter.report_error(failure, context, ErrorInfo::new()));
    }

    assert_eq!(reporter.get_error_analytics().total_errors, 50);
    let newest = reporter.get_recent_errors(1).remove(0);
    assert_eq!(Some(newest.event.error_id()), last);
    assert_eq!(newest.event.failure().message, "failure 54");

    let oldest = reporter.get_recent_errors(50).pop().unwrap();
    assert_eq!(oldest.event.failure().message, "failure 5");
}

#[test]
fn test_analytics_distributions() {
    let reporter = reporter();
    let failures = [
        ("NetworkError", "fetch failed", "Payor Info"),
        ("Error", "permission denied", "Payor Info"),
        ("TypeError", "x is undefined", "Deal Terms"),
    ];
    for (name, message, step) in failures {
        let context = WorkflowContext::new(WorkflowId::new("deal-9"), 1, step);
        reporter.report_error(Failure::new(name, message), context, ErrorInfo::new());
    }

    let analytics = serde_json::to_value(reporter.get_error_analytics()).unwrap();
    assert_eq!(analytics["totalErrors"], 3);
    assert_eq!(
        analytics["errorTypes"],
        json!({"network": 1, "runtime": 1, "authorization": 1})
    );
    assert_eq!(analytics["stepDistribution"], json!({"Deal Terms": 1, "Payor Info": 2}));
    assert_eq!(analytics["severityDistribution"]["high"], 2);
}
