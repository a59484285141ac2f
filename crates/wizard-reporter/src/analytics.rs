//! Aggregates over the report queue

use crate::report::ErrorReport;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wizard_taxonomy::{ErrorType, Severity};

/// Read-only aggregate snapshot of the queued reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalytics {
    /// Reports currently queued
    pub total_errors: usize,
    /// Count per taxonomy tag
    pub error_types: BTreeMap<ErrorType, usize>,
    /// Count per severity
    pub severity_distribution: BTreeMap<Severity, usize>,
    /// Count per step name
    pub step_distribution: BTreeMap<String, usize>,
    /// Count per UTC hour of day (0-23)
    pub time_distribution: BTreeMap<u32, usize>,
    /// Successful recoveries over recorded recovery outcomes
    pub recovery_success_rate: f64,
}

impl ErrorAnalytics {
    /// Aggregate a sequence of reports
    pub(crate) fn compute<'a>(
        reports: impl IntoIterator<Item = &'a ErrorReport>,
        recovery_success_rate: f64,
    ) -> Self {
        let mut analytics = Self {
            recovery_success_rate,
            ..Self::default()
        };

        for report in reports {
            let categorization = report.event.categorization();
            analytics.total_errors += 1;
            *analytics.error_types.entry(categorization.error_type).or_default() += 1;
            *analytics
                .severity_distribution
                .entry(categorization.severity)
                .or_default() += 1;
            *analytics
                .step_distribution
                .entry(report.step_name().to_string())
                .or_default() += 1;
            *analytics
                .time_distribution
                .entry(report.event.timestamp().hour())
                .or_default() += 1;
        }

        analytics
    }

    /// Count for one taxonomy tag
    #[inline]
    #[must_use]
    pub fn count_of(&self, error_type: ErrorType) -> usize {
        self.error_types.get(&error_type).copied().unwrap_or(0)
    }
}
