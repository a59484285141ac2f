//! Testing utilities for the Deal Wizard resilience workspace
//!
//! Recording fakes for every collaborator plus a [`Harness`] that wires them
//! into a [`RecoveryController`].

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use wizard_progress::{FieldMap, KeyValueStore, MemoryStore, StoreError};
use wizard_recovery::{Navigator, Notification, Notifier, RecoveryConfig, RecoveryController};
use wizard_reporter::{
    EnvironmentProvider, EnvironmentSnapshot, ErrorReport, ErrorReporter, ErrorSink,
    PerformanceSnapshot, ReporterConfig, SinkError, Viewport,
};

/// Navigator recording every navigation request
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn starting_at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn navigate_to(&self, path: &str) {
        *self.current.lock() = path.to_string();
        self.visits.lock().push(path.to_string());
    }
}

/// Notifier recording every notification
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

/// Store that is never available
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }
}

/// Sink handing every report to a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ErrorReport>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ErrorReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ErrorSink for ChannelSink {
    async fn send(&self, report: &ErrorReport) -> Result<(), SinkError> {
        self.tx
            .send(report.clone())
            .map_err(|e| SinkError::Transport(e.to_string()))
    }
}

/// Environment with fixed values
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedEnvironment;

impl EnvironmentProvider for FixedEnvironment {
    fn environment(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            user_agent: "test-agent/1.0".to_string(),
            viewport: Some(Viewport {
                width: 1280,
                height: 800,
            }),
            language: Some("en-US".to_string()),
            url: "/deal-wizard".to_string(),
        }
    }

    fn performance(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            captured_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_default(),
            uptime_ms: 42,
            memory_usage: None,
        }
    }
}

/// Object-literal helper: `fields(json!({"a": 1}))`
pub fn fields(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Reporter with fixed environment and no forwarding
pub fn test_reporter() -> Arc<ErrorReporter> {
    Arc::new(
        ErrorReporter::new(ReporterConfig::default()).with_environment(Arc::new(FixedEnvironment)),
    )
}

/// A controller wired to recording fakes
pub struct Harness {
    pub controller: RecoveryController,
    pub reporter: Arc<ErrorReporter>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(workflow_id: &str, step_number: u32, step_name: &str) -> Self {
        Self::with_config(workflow_id, step_number, step_name, RecoveryConfig::default())
    }

    pub fn with_config(
        workflow_id: &str,
        step_number: u32,
        step_name: &str,
        config: RecoveryConfig,
    ) -> Self {
        Self::build(
            workflow_id,
            step_number,
            step_name,
            config,
            test_reporter(),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Another step instance sharing this harness's reporter and store
    pub fn remount(&self, step_number: u32, step_name: &str) -> Self {
        let workflow_id = self.controller.error_context().workflow_id;
        Self::build(
            workflow_id.as_str(),
            step_number,
            step_name,
            RecoveryConfig::default(),
            self.reporter.clone(),
            self.store.clone(),
        )
    }

    fn build(
        workflow_id: &str,
        step_number: u32,
        step_name: &str,
        config: RecoveryConfig,
        reporter: Arc<ErrorReporter>,
        store: Arc<MemoryStore>,
    ) -> Self {
        let navigator = Arc::new(RecordingNavigator::starting_at(&format!(
            "/deal-wizard/step-{step_number}"
        )));
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = RecoveryController::builder(workflow_id, step_number, step_name)
            .config(config)
            .reporter(reporter.clone())
            .store(store.clone())
            .navigator(navigator.clone())
            .notifier(notifier.clone())
            .build();
        Self {
            controller,
            reporter,
            store,
            navigator,
            notifier,
        }
    }
}
