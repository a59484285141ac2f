//! External collaborators of the recovery layer
//!
//! Page navigation and transient notifications belong to the host
//! application; the controller only talks to them through these traits.

use std::time::Duration;

/// Page navigation service
pub trait Navigator: Send + Sync {
    /// Location currently shown
    fn current_path(&self) -> String;

    /// Leave for `path`; fire-and-forget
    fn navigate_to(&self, path: &str);
}

/// Tone of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Failure captured
    Error,
    /// Recovery succeeded
    Success,
}

/// A transient user-facing notification (toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Tone
    pub level: NotificationLevel,
    /// Heading
    pub title: String,
    /// Body
    pub description: String,
    /// How long it stays visible
    pub duration: Duration,
}

impl Notification {
    /// Failure captured in `step_name`
    #[must_use]
    pub fn step_failed(step_name: &str) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Something went wrong".to_string(),
            description: format!(
                "We encountered an issue in {step_name}. Your progress has been saved."
            ),
            duration: Duration::from_secs(5),
        }
    }

    /// Recovery attempt cleared the fault
    #[must_use]
    pub fn recovered() -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Recovery successful".to_string(),
            description: "The issue has been resolved and your progress is intact.".to_string(),
            duration: Duration::from_secs(3),
        }
    }
}

/// Notification surface
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, notification: Notification);
}

/// Notifier that renders notifications as log events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::warn!(title = %notification.title, "{}", notification.description);
            }
            NotificationLevel::Success => {
                tracing::info!(title = %notification.title, "{}", notification.description);
            }
        }
    }
}

/// Navigator that only logs; for hosts without routing
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    current: parking_lot::RwLock<String>,
}

impl LoggingNavigator {
    /// Navigator starting at `path`
    #[must_use]
    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            current: parking_lot::RwLock::new(path.into()),
        }
    }
}

impl Navigator for LoggingNavigator {
    fn current_path(&self) -> String {
        self.current.read().clone()
    }

    fn navigate_to(&self, path: &str) {
        tracing::info!(from = %self.current.read(), to = path, "navigating");
        *self.current.write() = path.to_string();
    }
}
