//! Progress store adapter
//!
//! Single-attempt and fail-soft: write failures are logged and reported as
//! `false`, read failures and corrupt entries come back as `None`. No retry
//! logic lives here.

use crate::snapshot::ProgressSnapshot;
use crate::store::KeyValueStore;
use std::fmt;
use std::sync::Arc;
use wizard_taxonomy::WorkflowId;

/// Prefix of every progress key
pub const KEY_PREFIX: &str = "dealwizard_progress_";

/// Storage key for a workflow's snapshot
#[inline]
#[must_use]
pub fn storage_key(workflow_id: &WorkflowId) -> String {
    format!("{KEY_PREFIX}{workflow_id}")
}

/// Keyed snapshot persistence over any [`KeyValueStore`]
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    /// Adapter over a shared store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a snapshot. Returns whether it reached the store.
    pub fn save(&self, workflow_id: &WorkflowId, snapshot: &ProgressSnapshot) -> bool {
        let key = storage_key(workflow_id);

        let encoded = match serde_json::to_string(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(
                    workflow_id = %workflow_id,
                    error = %e,
                    "failed to encode progress snapshot"
                );
                return false;
            }
        };

        match self.store.set(&key, encoded) {
            Ok(()) => {
                tracing::debug!(workflow_id = %workflow_id, "progress preserved");
                true
            }
            Err(e) => {
                tracing::warn!(workflow_id = %workflow_id, error = %e, "failed to save progress");
                false
            }
        }
    }

    /// Load a previously saved snapshot
    #[must_use]
    pub fn load(&self, workflow_id: &WorkflowId) -> Option<ProgressSnapshot> {
        let key = storage_key(workflow_id);

        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(workflow_id = %workflow_id, error = %e, "failed to read progress");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(
                    workflow_id = %workflow_id,
                    error = %e,
                    "discarding corrupt progress entry"
                );
                None
            }
        }
    }

    /// Drop a workflow's snapshot, e.g. once the deal is submitted
    pub fn discard(&self, workflow_id: &WorkflowId) {
        if let Err(e) = self.store.remove(&storage_key(workflow_id)) {
            tracing::warn!(workflow_id = %workflow_id, error = %e, "failed to discard progress");
        }
    }
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore").finish_non_exhaustive()
    }
}
