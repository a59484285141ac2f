//! Captured error events and their workflow context

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use wizard_taxonomy::{Categorization, Categorizer, Failure, WorkflowId};

const ERROR_ID_PREFIX: &str = "dealwizard_error_";

/// Unique error identifier (ULID, sortable by capture time)
///
/// Rendered and serialized as `dealwizard_error_<ulid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorId(pub Ulid);

impl ErrorId {
    /// Generate new error ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ErrorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ERROR_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for ErrorId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(ERROR_ID_PREFIX).unwrap_or(s);
        Ulid::from_string(raw).map(Self)
    }
}

impl Serialize for ErrorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// How a recovery attempt was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStrategy {
    /// Started by the wizard itself
    Auto,
    /// Started from the fallback view's retry control
    Manual,
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::Auto => f.write_str("auto"),
            RecoveryStrategy::Manual => f.write_str("manual"),
        }
    }
}

/// Snapshot of the owning workflow step at capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContext {
    /// Workflow (deal) id
    #[serde(rename = "dealId")]
    pub workflow_id: WorkflowId,
    /// Step index
    pub step_number: u32,
    /// Step display name
    pub step_name: String,
    /// Attempt count of the owning error state
    pub recovery_attempts: u32,
    /// Strategy of the last recovery attempt, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_strategy: Option<RecoveryStrategy>,
}

impl WorkflowContext {
    /// Context with no attempts yet
    #[must_use]
    pub fn new(workflow_id: WorkflowId, step_number: u32, step_name: impl Into<String>) -> Self {
        Self {
            workflow_id,
            step_number,
            step_name: step_name.into(),
            recovery_attempts: 0,
            recovery_strategy: None,
        }
    }

    /// With attempt count
    #[inline]
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.recovery_attempts = attempts;
        self
    }

    /// With recovery strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: Option<RecoveryStrategy>) -> Self {
        self.recovery_strategy = strategy;
        self
    }
}

/// Caller-supplied detail about where a failure surfaced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Component stack of the failing view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_stack: Option<String>,
    /// Free-form additional context
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorInfo {
    /// Empty info
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With component stack
    #[inline]
    #[must_use]
    pub fn with_component_stack(mut self, stack: impl Into<String>) -> Self {
        self.component_stack = Some(stack.into());
        self
    }

    /// With an additional entry
    #[inline]
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Caller info merged with the workflow context: the enriched context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    /// Identifier of the captured event
    pub error_id: ErrorId,
    /// Workflow snapshot
    #[serde(flatten)]
    pub workflow: WorkflowContext,
    /// Caller info
    pub info: ErrorInfo,
}

/// One captured failure
///
/// Immutable once built; the categorization is computed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    error_id: ErrorId,
    timestamp: DateTime<Utc>,
    #[serde(rename = "error")]
    failure: Failure,
    #[serde(rename = "dealWizardContext")]
    workflow_context: WorkflowContext,
    categorization: Categorization,
}

impl ErrorEvent {
    /// Event with a precomputed categorization, stamped now
    #[must_use]
    pub fn new(
        failure: Failure,
        workflow_context: WorkflowContext,
        categorization: Categorization,
    ) -> Self {
        Self {
            error_id: ErrorId::new(),
            timestamp: Utc::now(),
            failure,
            workflow_context,
            categorization,
        }
    }

    /// Classify and capture in one step
    #[must_use]
    pub fn capture(
        failure: Failure,
        workflow_context: WorkflowContext,
        categorizer: &Categorizer,
    ) -> Self {
        let categorization = categorizer.classify(&failure);
        Self::new(failure, workflow_context, categorization)
    }

    /// Error id
    #[inline]
    #[must_use]
    pub fn error_id(&self) -> ErrorId {
        self.error_id
    }

    /// Capture time
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Failure fields, as captured
    #[inline]
    #[must_use]
    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    /// Workflow snapshot
    #[inline]
    #[must_use]
    pub fn workflow_context(&self) -> &WorkflowContext {
        &self.workflow_context
    }

    /// Categorization
    #[inline]
    #[must_use]
    pub fn categorization(&self) -> &Categorization {
        &self.categorization
    }
}
